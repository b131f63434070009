//! Edit session: the single current image and every operation on it.
//!
//! The service keeps no state between requests. Continuity of an edit chain
//! (filter, then color replacement, then another filter) comes entirely from
//! adopting each returned image as the next request's source.
//!
//! Operations take `&mut self`, so one session runs one edit at a time.

use crate::api::AnalysisService;
use crate::error::{ClientError, Result};
use crate::models::{CoverAnalysis, GenreStats, PickedColor, SimilarityItem};
use crate::picker::{map_click, ColorPicker, ColorSlotKind, DisplayGeometry};
use crate::request::FormPayload;
use crate::source::{decode_image_payload, ImageBlob, SourceRef};
use std::sync::Arc;
use tracing::{debug, info};

/// Filters understood by `/api/filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Grayscale,
    Warm,
    Cold,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "gray" | "grey" => Ok(Self::Grayscale),
            "warm" => Ok(Self::Warm),
            "cold" => Ok(Self::Cold),
            other => Err(format!("unknown filter `{other}` (grayscale, warm, cold)")),
        }
    }
}

pub struct EditSession<S: AnalysisService> {
    service: Arc<S>,
    source: SourceRef,
    preview: Option<ImageBlob>,
    picker: ColorPicker,
}

impl<S: AnalysisService> EditSession<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            source: SourceRef::None,
            preview: None,
            picker: ColorPicker::default(),
        }
    }

    /// Replace the current source. A decodable file also becomes the preview.
    pub fn set_source(&mut self, source: SourceRef) {
        info!("source set to {:?}", source.kind());
        self.preview = match &source {
            SourceRef::File(blob) if blob.dimensions().is_some() => Some(blob.clone()),
            _ => None,
        };
        self.source = source;
    }

    pub fn current_source(&self) -> &SourceRef {
        &self.source
    }

    /// Image currently shown to the user.
    pub fn preview(&self) -> Option<&ImageBlob> {
        self.preview.as_ref()
    }

    pub fn picker(&self) -> &ColorPicker {
        &self.picker
    }

    /// Decode a returned image and make it both the preview and the next source.
    /// Nothing changes if the payload does not decode.
    pub fn adopt_result(&mut self, encoded: &str, file_name: &str) -> Result<()> {
        let blob = decode_image_payload(encoded, file_name)?;
        debug!("adopting {} as current source", file_name);
        self.preview = Some(blob.clone());
        self.source = SourceRef::File(blob);
        Ok(())
    }

    fn form(&self, extra: &[(&str, String)]) -> Result<FormPayload> {
        FormPayload::build(&self.source, extra)
    }

    /// Analyze the current source. The annotated image is shown but not adopted.
    pub async fn analyze(&mut self) -> Result<CoverAnalysis> {
        let form = self.form(&[])?;
        info!("analyzing cover");
        let analysis = self.service.analyze(form).await?;
        match &analysis {
            CoverAnalysis::Placeholder { .. } => self.preview = None,
            CoverAnalysis::Full(features) => {
                self.preview = Some(decode_image_payload(&features.image_base64, "analysis.png")?);
            }
        }
        Ok(analysis)
    }

    pub async fn apply_filter(&mut self, mode: FilterMode) -> Result<()> {
        let form = self.form(&[("mode", mode.to_string())])?;
        info!("applying filter {}", mode);
        let result = self.service.filter(form).await?;
        self.adopt_result(&result.image_base64, "filtered.png")
    }

    /// Raw channel values of one pixel, in the order the service stores them.
    pub async fn get_color(&self, x: u32, y: u32) -> Result<[u8; 3]> {
        let form = self.form(&[("x", x.to_string()), ("y", y.to_string())])?;
        Ok(self.service.get_color(form).await?.color)
    }

    /// Replace the color under one pixel with `rgb`, without the two-slot flow.
    pub async fn replace_color_point(&mut self, x: u32, y: u32, rgb: [u8; 3]) -> Result<()> {
        let [r, g, b] = rgb;
        let form = self.form(&[
            ("x", x.to_string()),
            ("y", y.to_string()),
            ("new_color", format!("{r},{g},{b}")),
        ])?;
        info!("replacing color at ({}, {})", x, y);
        let result = self.service.replace_color(form).await?;
        self.adopt_result(&result.image_base64, "modified.png")
    }

    pub fn enable_picker(&mut self, slot: ColorSlotKind) -> &'static str {
        self.picker.enable(slot)
    }

    pub fn disable_picker(&mut self) {
        self.picker.disarm();
    }

    /// Natural size of the image the user is clicking on.
    fn natural_size(&self) -> Option<(u32, u32)> {
        if let Some(preview) = &self.preview {
            return preview.dimensions();
        }
        match &self.source {
            SourceRef::File(blob) => blob.dimensions(),
            _ => None,
        }
    }

    /// Handle a click on the preview at `(x, y)` in displayed pixels.
    ///
    /// Ignored (`Ok(None)`) when no slot is armed or no source is set.
    /// On success the armed slot is filled and the picker returns to idle.
    pub async fn handle_click(
        &mut self,
        x: f64,
        y: f64,
        displayed_width: f64,
        displayed_height: f64,
    ) -> Result<Option<(ColorSlotKind, PickedColor)>> {
        if self.picker.state().armed_slot().is_none() || self.source.is_none() {
            return Ok(None);
        }
        let (natural_width, natural_height) = self
            .natural_size()
            .ok_or_else(|| ClientError::InvalidClick("preview is not loaded".to_string()))?;
        let geometry = DisplayGeometry {
            displayed_width,
            displayed_height,
            natural_width,
            natural_height,
        };
        let (px, py) = map_click(x, y, &geometry)?;
        debug!("click ({}, {}) maps to pixel ({}, {})", x, y, px, py);

        let form = self.form(&[("x", px.to_string()), ("y", py.to_string())])?;
        let picked = self.service.pick_color(form).await?;
        let slot = self.picker.complete(&picked)?;
        Ok(slot.map(|slot| (slot, picked)))
    }

    /// Replace every pixel within `tolerance` of the target color.
    pub async fn apply_color_replacement(&mut self, tolerance: u32) -> Result<()> {
        if self.source.is_none() {
            return Err(ClientError::NoSource);
        }
        let (target, new) = self
            .picker
            .replacement_pair()
            .ok_or(ClientError::ColorsNotPicked)?;
        let form = self.form(&[
            ("target_hex", target.to_string()),
            ("new_hex", new.to_string()),
            ("tolerance", tolerance.to_string()),
        ])?;
        info!("replacing {} with {} (tolerance {})", target, new, tolerance);
        let result = self.service.replace_color_advanced(form).await?;
        self.adopt_result(&result.image_base64, "modified.png")
    }

    pub async fn find_similar(&self, top_n: u32) -> Result<Vec<SimilarityItem>> {
        let form = self.form(&[("top_n", top_n.to_string())])?;
        self.service.similarity(form).await
    }

    pub async fn genre_stats(&self, force_refresh: bool) -> Result<GenreStats> {
        self.service.genre_stats(force_refresh).await
    }
}
