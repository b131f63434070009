//! Skating video analysis with a client-side deadline.
//!
//! Each submission gets a generation number and its own cancellation token.
//! Starting a new submission cancels the previous one, and a result is only
//! handed back if its submission is still the current one, so a late response
//! can never replace a newer result.

use crate::api::AnalysisService;
use crate::error::{ClientError, Result};
use crate::intervals::{intervals_json, JumpInterval};
use crate::models::SkatingReport;
use crate::request::FormPayload;
use crate::source::SourceRef;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct VideoWorkflow<S: AnalysisService> {
    service: Arc<S>,
    timeout: Duration,
    generation: AtomicU64,
    in_flight: Mutex<Option<(u64, CancellationToken)>>,
}

impl<S: AnalysisService> VideoWorkflow<S> {
    pub fn new(service: Arc<S>, timeout: Duration) -> Self {
        Self {
            service,
            timeout,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Analyze `source` (file or YouTube URL) over the given jump intervals.
    ///
    /// Validation failures return before any request is sent.
    pub async fn submit(
        &self,
        source: &SourceRef,
        intervals: &[JumpInterval],
    ) -> Result<SkatingReport> {
        if intervals.is_empty() {
            return Err(ClientError::NoIntervals);
        }
        let form =
            FormPayload::for_video(source)?.with("jump_intervals", intervals_json(intervals));

        let (generation, token) = self.begin();
        info!(
            "submitting video analysis #{} with {} interval(s), timeout {:?}",
            generation,
            intervals.len(),
            self.timeout
        );

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ClientError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.service.analyze_skating(form)) => {
                match result {
                    Ok(response) => response,
                    Err(_) => {
                        warn!("video analysis #{} timed out", generation);
                        Err(ClientError::Timeout(self.timeout))
                    }
                }
            }
        };
        self.finish(generation);

        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(ClientError::Superseded);
        }
        if token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        outcome?.into_result().map_err(ClientError::Server)
    }

    /// Cancel the in-flight submission, if any.
    pub fn cancel(&self) -> bool {
        match self.in_flight.lock().take() {
            Some((generation, token)) => {
                info!("cancelling video analysis #{}", generation);
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let previous = self.in_flight.lock().replace((generation, token.clone()));
        if let Some((old, old_token)) = previous {
            info!("video analysis #{} superseded by #{}", old, generation);
            old_token.cancel();
        }
        (generation, token)
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.in_flight.lock();
        if matches!(*slot, Some((current, _)) if current == generation) {
            *slot = None;
        }
    }
}
