//! Client for the cover and skating analysis service
//!
//! Builds multipart requests from an image or video source, talks to the
//! HTTP API, keeps the single-image edit chain and the color picker state,
//! and renders results as HTML fragments.

pub mod api;
pub mod config;
pub mod error;
pub mod intervals;
pub mod models;
pub mod picker;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod source;
pub mod video;

pub use api::{AnalysisService, HttpService};
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, Result};
pub use intervals::{
    collect_intervals, parse_interval, validate_interval, IntervalRows, JumpInterval,
};
pub use models::{CoverAnalysis, GenreStats, PickedColor, SimilarityItem, SkatingReport};
pub use picker::{ColorPicker, ColorSlotKind, DisplayGeometry, PickerState};
pub use pipeline::{EditSession, FilterMode};
pub use request::FormPayload;
pub use source::{ImageBlob, SourceKind, SourceRef};
pub use video::VideoWorkflow;
