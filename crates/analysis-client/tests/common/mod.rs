#![allow(dead_code)]

use analysis_client::api::AnalysisService;
use analysis_client::models::{
    ColorValue, CoverAnalysis, GenreStats, ImagePayload, PickedColor, SimilarityItem,
    SkatingResponse,
};
use analysis_client::{ClientError, FormPayload, ImageBlob, Result};
use base64::Engine;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;

/// In-memory service: records every request and replays scripted responses.
#[derive(Default)]
pub struct FakeService {
    calls: Mutex<Vec<(&'static str, FormPayload)>>,
    images: Mutex<VecDeque<String>>,
    picks: Mutex<VecDeque<PickedColor>>,
    analyses: Mutex<VecDeque<serde_json::Value>>,
    skating: Mutex<VecDeque<(Duration, serde_json::Value)>>,
}

impl FakeService {
    pub fn push_image(&self, width: u32, height: u32) {
        self.images.lock().push_back(png_base64(width, height));
    }

    pub fn push_pick(&self, hex: &str, rgb: [u8; 3]) {
        self.picks.lock().push_back(PickedColor {
            hex: hex.to_string(),
            rgb,
            position: None,
        });
    }

    pub fn push_analysis(&self, body: serde_json::Value) {
        self.analyses.lock().push_back(body);
    }

    pub fn push_skating(&self, delay: Duration, body: serde_json::Value) {
        self.skating.lock().push_back((delay, body));
    }

    pub fn calls(&self) -> Vec<(&'static str, FormPayload)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, endpoint: &'static str, form: FormPayload) {
        self.calls.lock().push((endpoint, form));
    }

    fn next_image(&self) -> Result<ImagePayload> {
        let image_base64 = self
            .images
            .lock()
            .pop_front()
            .ok_or_else(|| ClientError::Server("no scripted image".to_string()))?;
        Ok(ImagePayload { image_base64 })
    }
}

#[async_trait::async_trait]
impl AnalysisService for FakeService {
    async fn analyze(&self, form: FormPayload) -> Result<CoverAnalysis> {
        self.record("analyze", form);
        let body = self
            .analyses
            .lock()
            .pop_front()
            .ok_or_else(|| ClientError::Server("no scripted analysis".to_string()))?;
        Ok(serde_json::from_value(body)?)
    }

    async fn filter(&self, form: FormPayload) -> Result<ImagePayload> {
        self.record("filter", form);
        self.next_image()
    }

    async fn get_color(&self, form: FormPayload) -> Result<ColorValue> {
        self.record("get_color", form);
        Ok(ColorValue { color: [30, 20, 10] })
    }

    async fn replace_color(&self, form: FormPayload) -> Result<ImagePayload> {
        self.record("replace_color", form);
        self.next_image()
    }

    async fn pick_color(&self, form: FormPayload) -> Result<PickedColor> {
        self.record("pick_color", form);
        self.picks
            .lock()
            .pop_front()
            .ok_or_else(|| ClientError::Server("no scripted pick".to_string()))
    }

    async fn replace_color_advanced(&self, form: FormPayload) -> Result<ImagePayload> {
        self.record("replace_color_advanced", form);
        self.next_image()
    }

    async fn similarity(&self, form: FormPayload) -> Result<Vec<SimilarityItem>> {
        self.record("similarity", form);
        Ok(vec![SimilarityItem {
            title: "Dune".to_string(),
            score: 0.93,
            image_base64: png_base64(4, 4),
        }])
    }

    async fn genre_stats(&self, _force_refresh: bool) -> Result<GenreStats> {
        Err(ClientError::Server("no scripted stats".to_string()))
    }

    async fn analyze_skating(&self, form: FormPayload) -> Result<SkatingResponse> {
        self.record("analyze_skating", form);
        let (delay, body) = self
            .skating
            .lock()
            .pop_front()
            .ok_or_else(|| ClientError::Server("no scripted skating response".to_string()))?;
        tokio::time::sleep(delay).await;
        Ok(serde_json::from_value(body)?)
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn png_base64(width: u32, height: u32) -> String {
    base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
}

pub fn png_blob(width: u32, height: u32) -> ImageBlob {
    ImageBlob::new(png_bytes(width, height), "image/png", "cover.png")
}

/// Dimensions of the file uploaded with a recorded request.
pub fn uploaded_size(form: &FormPayload) -> Option<(u32, u32)> {
    form.file()?.dimensions()
}

pub fn skating_success() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "video_info": {"fps": 25.0, "duration": 120.0, "total_frames": 3000},
        "manual_jump_intervals": [[80.0, 82.0]],
        "jump_analysis": [],
        "analysis_method": "manual_only"
    })
}
