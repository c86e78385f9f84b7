//! Color correction filters
//!
//! Two families share one per-color entry point:
//! - [`adaptive`]: parametric HSL correction built from a deficiency profile
//! - [`preset`]: fixed OS-style color matrices
//!
//! [`ActiveFilter`] is what a renderer holds while a task runs.

pub mod adaptive;
pub mod params;
pub mod preset;

pub use adaptive::{apply_filter, apply_filter_hex};
pub use params::{
    build_filter_parameters, build_filter_parameters_with, FilterMetadata, FilterParameters,
    HueShift, Primary, SourceThresholds,
};
pub use preset::{apply_preset, apply_preset_hex, FilterKind, OsPreset};

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Filter currently applied to rendered colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActiveFilter {
    Custom(FilterParameters),
    Preset { preset: OsPreset, intensity: f32 },
}

impl ActiveFilter {
    pub fn kind(&self) -> FilterKind {
        match self {
            ActiveFilter::Custom(_) => FilterKind::Custom,
            ActiveFilter::Preset { preset, .. } => FilterKind::from(*preset),
        }
    }

    pub fn apply(&self, color: Color) -> Color {
        match self {
            ActiveFilter::Custom(params) => apply_filter(color, params),
            ActiveFilter::Preset { preset, intensity } => apply_preset(color, *preset, *intensity),
        }
    }

    /// Hex variant of [`ActiveFilter::apply`]; malformed input is returned as is
    pub fn apply_hex(&self, hex: &str) -> String {
        match Color::from_hex(hex) {
            Ok(color) => self.apply(color).to_hex(),
            Err(_) => hex.to_string(),
        }
    }
}
