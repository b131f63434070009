/// Response shapes returned by the analysis service
///
/// These are read once, rendered and dropped; nothing here is mutated.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of `/api/analyze`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAnalysis")]
pub enum CoverAnalysis {
    /// The cover is a "coming soon" placeholder with nothing to extract
    Placeholder { message: String },
    /// Extracted features plus the annotated image
    Full(CoverFeatures),
}

/// Features extracted from a real cover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverFeatures {
    /// Design label (minimalistic / balanced / overloaded)
    pub design: String,
    pub face: bool,
    pub face_position: String,
    pub complexity: f64,
    pub color_contrast: f64,
    pub warm_cold_balance: f64,
    pub text_density: f64,
    pub negative_space: f64,
    pub edge_density: Option<f64>,
    /// Dominant colors as RGB triples
    pub colors: Vec<[u8; 3]>,
    /// Cover with detected faces outlined, base64 PNG
    pub image_base64: String,
}

#[derive(Deserialize)]
struct RawAnalysis {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    design: String,
    #[serde(default)]
    face: bool,
    #[serde(default)]
    face_position: String,
    #[serde(default)]
    complexity: f64,
    #[serde(default)]
    color_contrast: f64,
    #[serde(default)]
    warm_cold_balance: f64,
    #[serde(default)]
    text_density: f64,
    #[serde(default)]
    negative_space: f64,
    #[serde(default)]
    edge_density: Option<f64>,
    #[serde(default)]
    colors: Vec<[u8; 3]>,
    #[serde(default)]
    image_base64: String,
}

impl From<RawAnalysis> for CoverAnalysis {
    fn from(raw: RawAnalysis) -> Self {
        if raw.kind.as_deref() == Some("placeholder") {
            return CoverAnalysis::Placeholder {
                message: raw.message.unwrap_or_default(),
            };
        }
        CoverAnalysis::Full(CoverFeatures {
            design: raw.design,
            face: raw.face,
            face_position: raw.face_position,
            complexity: raw.complexity,
            color_contrast: raw.color_contrast,
            warm_cold_balance: raw.warm_cold_balance,
            text_density: raw.text_density,
            negative_space: raw.negative_space,
            edge_density: raw.edge_density,
            colors: raw.colors,
            image_base64: raw.image_base64,
        })
    }
}

/// A response carrying an edited image
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImagePayload {
    pub image_base64: String,
}

/// Result of `/api/get_color`: channel values as stored by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorValue {
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: u32,
    pub y: u32,
}

/// Result of `/api/pick_color`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PickedColor {
    /// `#rrggbb`
    pub hex: String,
    pub rgb: [u8; 3],
    #[serde(default)]
    pub position: Option<PixelPosition>,
}

/// One ranked entry from `/api/similarity`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimilarityItem {
    pub title: String,
    pub score: f64,
    pub image_base64: String,
}

/// Aggregate dataset statistics from `/api/genre-stats`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreStats {
    #[serde(default)]
    pub total_books: u64,
    #[serde(default)]
    pub placeholders: u64,
    #[serde(default)]
    pub minimalistic: u64,
    #[serde(default)]
    pub overloaded: u64,
    #[serde(default)]
    pub faces: u64,
    #[serde(default)]
    pub avg_color_contrast: Option<f64>,
    #[serde(default)]
    pub avg_warm_cold_balance: Option<f64>,
    #[serde(default)]
    pub monochrome_percentage: Option<f64>,
    #[serde(default)]
    pub cache_info: String,
    /// `cache` or `fresh`
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub plot_base64: Option<String>,
}

impl GenreStats {
    /// Covers that are neither minimalistic nor overloaded
    pub fn balanced(&self) -> u64 {
        self.total_books
            .saturating_sub(self.minimalistic)
            .saturating_sub(self.overloaded)
    }
}

/// Raw body of `/api/analyze-skating`
#[derive(Debug, Clone, Deserialize)]
pub struct SkatingResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub video_info: VideoInfo,
    #[serde(default)]
    pub manual_jump_intervals: Vec<[f64; 2]>,
    #[serde(default)]
    pub jump_analysis: Vec<JumpAnalysis>,
    #[serde(default)]
    pub all_jumps: Vec<DetectedJump>,
    #[serde(default, alias = "shots_timeline")]
    pub shots: Vec<f64>,
    #[serde(default)]
    pub contrastive_analysis: Option<BTreeMap<String, ContrastiveStat>>,
    #[serde(default)]
    pub analysis_method: Option<String>,
    /// Counts some servers report beside `video_info` rather than inside it
    #[serde(default)]
    pub total_jumps: Option<u64>,
    #[serde(default)]
    pub shots_detected: Option<u64>,
}

impl SkatingResponse {
    /// Split into the success report or the server-reported error message.
    pub fn into_result(self) -> Result<SkatingReport, String> {
        if !self.success {
            return Err(self
                .error
                .unwrap_or_else(|| "analysis failed without an error message".to_string()));
        }
        Ok(SkatingReport {
            video_info: self.video_info,
            manual_jump_intervals: self.manual_jump_intervals,
            jump_analysis: self.jump_analysis,
            all_jumps: self.all_jumps,
            shots: self.shots,
            contrastive_analysis: self.contrastive_analysis.unwrap_or_default(),
            analysis_method: self.analysis_method,
            total_jumps: self.total_jumps,
            shots_detected: self.shots_detected,
        })
    }
}

/// Successful video analysis
#[derive(Debug, Clone, PartialEq)]
pub struct SkatingReport {
    pub video_info: VideoInfo,
    pub manual_jump_intervals: Vec<[f64; 2]>,
    pub jump_analysis: Vec<JumpAnalysis>,
    pub all_jumps: Vec<DetectedJump>,
    /// Shot boundaries in seconds
    pub shots: Vec<f64>,
    pub contrastive_analysis: BTreeMap<String, ContrastiveStat>,
    pub analysis_method: Option<String>,
    pub total_jumps: Option<u64>,
    pub shots_detected: Option<u64>,
}

impl SkatingReport {
    /// Jump count from `video_info`, then the top-level field, then the detected list.
    pub fn jump_count(&self) -> u64 {
        self.video_info
            .total_jumps
            .or(self.total_jumps)
            .unwrap_or(self.all_jumps.len() as u64)
    }

    /// Scene count from `video_info`, then the top-level field, then the shot list.
    pub fn shot_count(&self) -> u64 {
        self.video_info
            .shots_detected
            .or(self.shots_detected)
            .unwrap_or(self.shots.len() as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub total_frames: Option<u64>,
    #[serde(default)]
    pub shots_detected: Option<u64>,
    #[serde(default)]
    pub total_jumps: Option<u64>,
}

/// Per-interval analysis: either an error or a three-phase comparison
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JumpAnalysis {
    Failed(JumpFailure),
    Compared(JumpComparison),
}

impl JumpAnalysis {
    pub fn jump_index(&self) -> u32 {
        match self {
            Self::Failed(f) => f.jump_index,
            Self::Compared(c) => c.jump_index,
        }
    }

    pub fn sample_frames(&self) -> &[String] {
        match self {
            Self::Failed(_) => &[],
            Self::Compared(c) => &c.sample_frames,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JumpFailure {
    pub jump_index: u32,
    #[serde(default)]
    pub time_interval: Option<[f64; 2]>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JumpComparison {
    pub jump_index: u32,
    pub time_interval: [f64; 2],
    #[serde(default)]
    pub jump_duration: f64,
    /// Keyed by metric identifier (`brightness`, `height_max`, ...)
    pub comparison: BTreeMap<String, MetricComparison>,
    /// Base64 PNG frames from the jump, possibly empty
    #[serde(default)]
    pub sample_frames: Vec<String>,
    #[serde(default)]
    pub frame_counts: Option<FrameCounts>,
}

/// One metric across the pre-jump, jump and post-jump phases
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricComparison {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub pre: serde_json::Value,
    pub jump: serde_json::Value,
    pub post: serde_json::Value,
    #[serde(default)]
    pub difference: Option<f64>,
    #[serde(default)]
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameCounts {
    pub pre: u32,
    pub jump: u32,
    pub post: u32,
}

/// Jump found by automatic detection
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectedJump {
    pub absolute_time: f64,
    #[serde(default)]
    pub intensity: Option<f64>,
    #[serde(default)]
    pub detection_method: Option<String>,
    #[serde(default)]
    pub height_ratio: Option<f64>,
}

/// Mean of a feature inside jumps versus outside them
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ContrastiveStat {
    pub jump_mean: f64,
    pub non_jump_mean: f64,
    pub difference: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder_analysis() {
        let analysis: CoverAnalysis = serde_json::from_value(json!({
            "type": "placeholder",
            "message": "Cover coming soon",
            "complexity": 0.1
        }))
        .unwrap();
        assert_eq!(
            analysis,
            CoverAnalysis::Placeholder {
                message: "Cover coming soon".to_string()
            }
        );
    }

    #[test]
    fn test_full_analysis() {
        let analysis: CoverAnalysis = serde_json::from_value(json!({
            "type": "normal",
            "design": "balanced",
            "face": true,
            "face_position": "center",
            "complexity": 0.31,
            "color_contrast": 54.2,
            "warm_cold_balance": 1.4,
            "text_density": 0.12,
            "negative_space": 0.8,
            "colors": [[10, 20, 30], [200, 100, 0], [0, 0, 0]],
            "image_base64": "AAAA"
        }))
        .unwrap();

        let CoverAnalysis::Full(features) = analysis else {
            panic!("expected full analysis");
        };
        assert!(features.face);
        assert_eq!(features.colors[1], [200, 100, 0]);
        assert_eq!(features.edge_density, None);
        assert_eq!(features.image_base64, "AAAA");
    }

    #[test]
    fn test_jump_analysis_variants() {
        let entries: Vec<JumpAnalysis> = serde_json::from_value(json!([
            {"jump_index": 1, "time_interval": [80, 82], "error": "too few frames"},
            {
                "jump_index": 2,
                "time_interval": [94.0, 96.5],
                "jump_duration": 2.5,
                "comparison": {
                    "brightness": {"name": "Brightness", "pre": 101.5, "jump": 98.25, "post": 100.0}
                }
            }
        ]))
        .unwrap();

        assert!(matches!(&entries[0], JumpAnalysis::Failed(f) if f.error == "too few frames"));
        let JumpAnalysis::Compared(cmp) = &entries[1] else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.jump_index, 2);
        assert!(cmp.sample_frames.is_empty());
        assert_eq!(cmp.comparison["brightness"].pre.to_string(), "101.5");
    }

    #[test]
    fn test_skating_failure_into_result() {
        let response: SkatingResponse = serde_json::from_value(json!({
            "success": false,
            "error": "could not open video"
        }))
        .unwrap();
        assert_eq!(response.into_result(), Err("could not open video".to_string()));
    }

    #[test]
    fn test_skating_success_into_result() {
        let response: SkatingResponse = serde_json::from_value(json!({
            "success": true,
            "video_info": {"fps": 25.0, "duration": 180.4, "total_frames": 4510},
            "manual_jump_intervals": [[80, 82]],
            "jump_analysis": [],
            "shots_timeline": [],
            "analysis_method": "manual_only"
        }))
        .unwrap();

        let report = response.into_result().unwrap();
        assert_eq!(report.video_info.total_frames, Some(4510));
        assert_eq!(report.jump_count(), 0);
        assert_eq!(report.manual_jump_intervals, vec![[80.0, 82.0]]);
        assert!(report.contrastive_analysis.is_empty());
    }

    #[test]
    fn test_balanced_count() {
        let stats: GenreStats = serde_json::from_value(json!({
            "total_books": 40,
            "minimalistic": 12,
            "overloaded": 8
        }))
        .unwrap();
        assert_eq!(stats.balanced(), 20);
        assert_eq!(stats.plot_base64, None);
    }

    #[test]
    fn test_top_level_counts_fill_in_for_video_info() {
        let response: SkatingResponse = serde_json::from_value(json!({
            "success": true,
            "video_info": {"fps": 30.0},
            "all_jumps": [{"absolute_time": 12.0}],
            "shots_timeline": [4.0, 9.5],
            "total_jumps": 7,
            "shots_detected": 0
        }))
        .unwrap();
        let report = response.into_result().unwrap();
        assert_eq!(report.jump_count(), 7);
        assert_eq!(report.shot_count(), 0);

        let nested: SkatingResponse = serde_json::from_value(json!({
            "success": true,
            "video_info": {"total_jumps": 2},
            "all_jumps": [{"absolute_time": 12.0}],
            "shots_timeline": [4.0, 9.5],
            "total_jumps": 7
        }))
        .unwrap();
        let report = nested.into_result().unwrap();
        assert_eq!(report.jump_count(), 2);
        assert_eq!(report.shot_count(), 2);
    }
}
