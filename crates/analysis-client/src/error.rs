use std::time::Duration;
use thiserror::Error;

/// Error taxonomy shared by every client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no image loaded: upload a file or enter a URL first")]
    NoSource,
    #[error("no video selected: upload a file or enter a YouTube URL")]
    NoVideo,
    #[error("add at least one jump interval (for example 75-78)")]
    NoIntervals,
    #[error("pick both the target and the replacement color first")]
    ColorsNotPicked,
    #[error("invalid click: {0}")]
    InvalidClick(String),
    #[error("invalid picked color `{0}`: expected #rrggbb")]
    InvalidColor(String),
    #[error("invalid image payload: {0}")]
    Payload(String),
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
    #[error("superseded by a newer request")]
    Superseded,
    #[error("server error: {0}")]
    Server(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification used to pick how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any request was sent.
    Validation,
    /// Connection failure or non-2xx status.
    Transport,
    /// Client-side deadline exceeded.
    Timeout,
    /// Well-formed response reporting a failure.
    Domain,
    /// Result discarded because the request was cancelled or replaced.
    Discarded,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSource
            | Self::NoVideo
            | Self::NoIntervals
            | Self::ColorsNotPicked
            | Self::InvalidClick(_)
            | Self::Io(_) => ErrorKind::Validation,
            Self::Status { .. } | Self::Transport(_) => ErrorKind::Transport,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Payload(_) | Self::InvalidColor(_) | Self::Decode(_) | Self::Server(_) => {
                ErrorKind::Domain
            }
            Self::Cancelled | Self::Superseded => ErrorKind::Discarded,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
