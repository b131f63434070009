/// Client configuration
///
/// Where the analysis service lives and how long the client is willing to wait for it.
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the analysis service
    pub server_url: String,

    /// Wall-clock limit for a video analysis request, in seconds
    pub video_timeout_secs: u64,

    /// Number of results requested from the similarity search
    pub similarity_top_n: u32,

    /// Color distance used by advanced replacement when none is given
    pub default_tolerance: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            video_timeout_secs: 1200,
            similarity_top_n: 5,
            default_tolerance: 30,
        }
    }
}

impl ClientConfig {
    /// With server URL
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// With video timeout
    pub fn with_video_timeout(mut self, secs: u64) -> Self {
        self.video_timeout_secs = secs;
        self
    }

    /// With similarity result count
    pub fn with_top_n(mut self, top_n: u32) -> Self {
        self.similarity_top_n = top_n;
        self
    }

    pub fn video_timeout(&self) -> Duration {
        Duration::from_secs(self.video_timeout_secs)
    }

    /// Endpoint URL for an API path such as `/api/filter`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }

    /// Save configuration to JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}
