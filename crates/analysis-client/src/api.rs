/// Analysis service API
///
/// One trait method per endpoint. `HttpService` talks to the real server;
/// controllers only see the trait, so tests can swap in an in-memory fake.
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    ColorValue, CoverAnalysis, GenreStats, ImagePayload, PickedColor, SimilarityItem,
    SkatingResponse,
};
use crate::request::FormPayload;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const FILTER_PATH: &str = "/api/filter";
pub const GET_COLOR_PATH: &str = "/api/get_color";
pub const REPLACE_COLOR_PATH: &str = "/api/replace_color";
pub const PICK_COLOR_PATH: &str = "/api/pick_color";
pub const REPLACE_COLOR_ADVANCED_PATH: &str = "/api/replace_color_advanced";
pub const SIMILARITY_PATH: &str = "/api/similarity";
pub const GENRE_STATS_PATH: &str = "/api/genre-stats";
pub const ANALYZE_SKATING_PATH: &str = "/api/analyze-skating";

/// Remote analysis service
#[async_trait::async_trait]
pub trait AnalysisService: Send + Sync {
    /// Cover analysis (`file` or `image_url`)
    async fn analyze(&self, form: FormPayload) -> Result<CoverAnalysis>;

    /// Apply a named filter (`mode`)
    async fn filter(&self, form: FormPayload) -> Result<ImagePayload>;

    /// Raw color at (`x`, `y`)
    async fn get_color(&self, form: FormPayload) -> Result<ColorValue>;

    /// Replace the color found at (`x`, `y`) with `new_color` (`r,g,b`)
    async fn replace_color(&self, form: FormPayload) -> Result<ImagePayload>;

    /// Pick the color at (`x`, `y`)
    async fn pick_color(&self, form: FormPayload) -> Result<PickedColor>;

    /// Replace `target_hex` with `new_hex` within `tolerance`
    async fn replace_color_advanced(&self, form: FormPayload) -> Result<ImagePayload>;

    /// Most similar covers (`top_n`)
    async fn similarity(&self, form: FormPayload) -> Result<Vec<SimilarityItem>>;

    /// Dataset statistics, recomputed when `force_refresh` is set
    async fn genre_stats(&self, force_refresh: bool) -> Result<GenreStats>;

    /// Skating video analysis (`file` or `youtube_url`, `jump_intervals`)
    async fn analyze_skating(&self, form: FormPayload) -> Result<SkatingResponse>;
}

/// HTTP implementation of [`AnalysisService`]
pub struct HttpService {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpService {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: FormPayload) -> Result<T> {
        let url = self.config.endpoint(path);
        debug!("POST {} ({} fields)", url, form.fields().len());
        let response = self
            .client
            .post(&url)
            .multipart(form.into_multipart()?)
            .send()
            .await?;
        read_json(response).await
    }
}

/// Decode a response body, mapping non-2xx statuses and `{"error": ...}` bodies.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        warn!("{} returned {}", response.url(), status);
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let value: serde_json::Value = response.json().await?;
    if let Some(message) = domain_error(&value) {
        return Err(ClientError::Server(message));
    }
    Ok(serde_json::from_value(value)?)
}

/// An object with an `error` string and no `success` flag is a service-side failure.
/// Bodies that carry `success` are left to the caller to interpret.
fn domain_error(value: &serde_json::Value) -> Option<String> {
    let object = value.as_object()?;
    if object.contains_key("success") {
        return None;
    }
    object.get("error")?.as_str().map(str::to_string)
}

#[async_trait::async_trait]
impl AnalysisService for HttpService {
    async fn analyze(&self, form: FormPayload) -> Result<CoverAnalysis> {
        self.post_form(ANALYZE_PATH, form).await
    }

    async fn filter(&self, form: FormPayload) -> Result<ImagePayload> {
        self.post_form(FILTER_PATH, form).await
    }

    async fn get_color(&self, form: FormPayload) -> Result<ColorValue> {
        self.post_form(GET_COLOR_PATH, form).await
    }

    async fn replace_color(&self, form: FormPayload) -> Result<ImagePayload> {
        self.post_form(REPLACE_COLOR_PATH, form).await
    }

    async fn pick_color(&self, form: FormPayload) -> Result<PickedColor> {
        self.post_form(PICK_COLOR_PATH, form).await
    }

    async fn replace_color_advanced(&self, form: FormPayload) -> Result<ImagePayload> {
        self.post_form(REPLACE_COLOR_ADVANCED_PATH, form).await
    }

    async fn similarity(&self, form: FormPayload) -> Result<Vec<SimilarityItem>> {
        self.post_form(SIMILARITY_PATH, form).await
    }

    async fn genre_stats(&self, force_refresh: bool) -> Result<GenreStats> {
        let mut url = self.config.endpoint(GENRE_STATS_PATH);
        if force_refresh {
            url.push_str("?force_refresh=true");
        }
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        read_json(response).await
    }

    async fn analyze_skating(&self, form: FormPayload) -> Result<SkatingResponse> {
        self.post_form(ANALYZE_SKATING_PATH, form).await
    }
}
