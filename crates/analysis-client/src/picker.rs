//! Two-slot color selection driven by clicks on the preview.
//!
//! `Idle --enable(slot)--> Arming* --pick--> Idle`. Only one slot is armed at
//! a time and every pick is a one-shot capture.

use crate::error::{ClientError, Result};
use crate::models::PickedColor;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlotKind {
    /// Color to be replaced
    Target,
    /// Color written in its place
    Replacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerState {
    #[default]
    Idle,
    ArmingTarget,
    ArmingReplacement,
}

impl PickerState {
    pub fn armed_slot(self) -> Option<ColorSlotKind> {
        match self {
            Self::Idle => None,
            Self::ArmingTarget => Some(ColorSlotKind::Target),
            Self::ArmingReplacement => Some(ColorSlotKind::Replacement),
        }
    }
}

/// A selected color; empty until a pick completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSlot {
    pub hex: Option<String>,
    pub rgb: Option<[u8; 3]>,
}

impl ColorSlot {
    pub fn is_set(&self) -> bool {
        self.hex.is_some() && self.rgb.is_some()
    }

    /// One-line description such as `#ff8800 (255, 136, 0)`.
    pub fn describe(&self) -> Option<String> {
        let hex = self.hex.as_ref()?;
        let [r, g, b] = self.rgb?;
        Some(format!("{hex} ({r}, {g}, {b})"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColorPicker {
    state: PickerState,
    target: ColorSlot,
    replacement: ColorSlot,
}

impl ColorPicker {
    pub fn state(&self) -> PickerState {
        self.state
    }

    /// Arm a slot and return the prompt to show the user.
    pub fn enable(&mut self, slot: ColorSlotKind) -> &'static str {
        self.state = match slot {
            ColorSlotKind::Target => PickerState::ArmingTarget,
            ColorSlotKind::Replacement => PickerState::ArmingReplacement,
        };
        debug!("color picker armed for {:?}", slot);
        match slot {
            ColorSlotKind::Target => "Pick the color to REPLACE: click on the image",
            ColorSlotKind::Replacement => "Pick the NEW color: click on the image",
        }
    }

    /// Leave picker mode, forgetting both selections.
    pub fn disarm(&mut self) {
        self.state = PickerState::Idle;
        self.target = ColorSlot::default();
        self.replacement = ColorSlot::default();
    }

    /// Store a pick in the armed slot and return to idle.
    ///
    /// Returns the slot that was filled, or `None` if nothing was armed. A pick
    /// whose hex is not `#` plus six hex digits is rejected and the slot stays armed.
    pub fn complete(&mut self, picked: &PickedColor) -> Result<Option<ColorSlotKind>> {
        let Some(slot) = self.state.armed_slot() else {
            return Ok(None);
        };
        if !is_hex_color(&picked.hex) {
            return Err(ClientError::InvalidColor(picked.hex.clone()));
        }
        let filled = ColorSlot {
            hex: Some(picked.hex.clone()),
            rgb: Some(picked.rgb),
        };
        match slot {
            ColorSlotKind::Target => self.target = filled,
            ColorSlotKind::Replacement => self.replacement = filled,
        }
        self.state = PickerState::Idle;
        Ok(Some(slot))
    }

    pub fn slot(&self, slot: ColorSlotKind) -> &ColorSlot {
        match slot {
            ColorSlotKind::Target => &self.target,
            ColorSlotKind::Replacement => &self.replacement,
        }
    }

    /// `(target_hex, new_hex)` once both slots are populated.
    pub fn replacement_pair(&self) -> Option<(&str, &str)> {
        if !self.target.is_set() || !self.replacement.is_set() {
            return None;
        }
        Some((self.target.hex.as_deref()?, self.replacement.hex.as_deref()?))
    }
}

/// `#rrggbb`, either case.
fn is_hex_color(hex: &str) -> bool {
    hex.strip_prefix('#').is_some_and(|digits| {
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
    })
}

/// Size of the preview as drawn and as encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl DisplayGeometry {
    /// Geometry for an image drawn at its natural size.
    pub fn unscaled(width: u32, height: u32) -> Self {
        Self {
            displayed_width: width as f64,
            displayed_height: height as f64,
            natural_width: width,
            natural_height: height,
        }
    }
}

/// Map a click relative to the displayed image's top-left corner to a pixel
/// in the full-resolution image.
pub fn map_click(x: f64, y: f64, geometry: &DisplayGeometry) -> Result<(u32, u32)> {
    if geometry.displayed_width <= 0.0 || geometry.displayed_height <= 0.0 {
        return Err(ClientError::InvalidClick(
            "preview has no displayed size".to_string(),
        ));
    }
    if x < 0.0 || y < 0.0 || x > geometry.displayed_width || y > geometry.displayed_height {
        return Err(ClientError::InvalidClick(format!(
            "({x}, {y}) is outside the preview"
        )));
    }
    let scale_x = geometry.natural_width as f64 / geometry.displayed_width;
    let scale_y = geometry.natural_height as f64 / geometry.displayed_height;
    // A click on the far edge lands one past the last pixel after scaling.
    let px = ((x * scale_x).round() as u32).min(geometry.natural_width.saturating_sub(1));
    let py = ((y * scale_y).round() as u32).min(geometry.natural_height.saturating_sub(1));
    Ok((px, py))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked(hex: &str, rgb: [u8; 3]) -> PickedColor {
        PickedColor {
            hex: hex.to_string(),
            rgb,
            position: None,
        }
    }

    #[test]
    fn test_click_scales_to_natural_resolution() {
        let geometry = DisplayGeometry {
            displayed_width: 300.0,
            displayed_height: 450.0,
            natural_width: 1200,
            natural_height: 1800,
        };
        assert_eq!(map_click(60.0, 100.0, &geometry).unwrap(), (240, 400));
    }

    #[test]
    fn test_click_rounds_and_clamps() {
        let geometry = DisplayGeometry {
            displayed_width: 300.0,
            displayed_height: 300.0,
            natural_width: 1000,
            natural_height: 1000,
        };
        assert_eq!(map_click(0.4, 0.1, &geometry).unwrap(), (1, 0));
        assert_eq!(map_click(300.0, 300.0, &geometry).unwrap(), (999, 999));
    }

    #[test]
    fn test_click_outside_or_unsized_preview() {
        let geometry = DisplayGeometry::unscaled(100, 100);
        assert!(map_click(101.0, 5.0, &geometry).is_err());
        assert!(map_click(-1.0, 5.0, &geometry).is_err());

        let hidden = DisplayGeometry {
            displayed_width: 0.0,
            ..geometry
        };
        assert!(matches!(
            map_click(1.0, 1.0, &hidden),
            Err(ClientError::InvalidClick(_))
        ));
    }

    #[test]
    fn test_pick_is_one_shot() {
        let mut picker = ColorPicker::default();
        assert_eq!(picker.complete(&picked("#000000", [0, 0, 0])).unwrap(), None);

        picker.enable(ColorSlotKind::Target);
        assert_eq!(picker.state(), PickerState::ArmingTarget);
        assert_eq!(
            picker.complete(&picked("#ff8800", [255, 136, 0])).unwrap(),
            Some(ColorSlotKind::Target)
        );
        assert_eq!(picker.state(), PickerState::Idle);
        assert_eq!(
            picker.slot(ColorSlotKind::Target).describe().as_deref(),
            Some("#ff8800 (255, 136, 0)")
        );
        assert!(picker.replacement_pair().is_none());
    }

    #[test]
    fn test_enable_switches_armed_slot() {
        let mut picker = ColorPicker::default();
        picker.enable(ColorSlotKind::Target);
        picker.enable(ColorSlotKind::Replacement);
        picker.complete(&picked("#0000ff", [0, 0, 255])).unwrap();

        assert!(!picker.slot(ColorSlotKind::Target).is_set());
        assert!(picker.slot(ColorSlotKind::Replacement).is_set());
    }

    #[test]
    fn test_disarm_resets_slots() {
        let mut picker = ColorPicker::default();
        picker.enable(ColorSlotKind::Target);
        picker.complete(&picked("#ffffff", [255, 255, 255])).unwrap();
        picker.enable(ColorSlotKind::Replacement);
        picker.complete(&picked("#000000", [0, 0, 0])).unwrap();
        assert_eq!(picker.replacement_pair(), Some(("#ffffff", "#000000")));

        picker.disarm();
        assert_eq!(picker.state(), PickerState::Idle);
        assert_eq!(picker.slot(ColorSlotKind::Target), &ColorSlot::default());
        assert!(picker.replacement_pair().is_none());
    }

    #[test]
    fn test_malformed_hex_keeps_slot_armed() {
        let mut picker = ColorPicker::default();
        picker.enable(ColorSlotKind::Target);

        for bad in ["ff8800", "#ff880", "#ff88000", "#gg8800", ""] {
            assert!(matches!(
                picker.complete(&picked(bad, [255, 136, 0])),
                Err(ClientError::InvalidColor(_))
            ));
            assert_eq!(picker.state(), PickerState::ArmingTarget);
            assert!(!picker.slot(ColorSlotKind::Target).is_set());
        }

        assert_eq!(
            picker.complete(&picked("#FF8800", [255, 136, 0])).unwrap(),
            Some(ColorSlotKind::Target)
        );
        assert_eq!(picker.state(), PickerState::Idle);
    }
}
