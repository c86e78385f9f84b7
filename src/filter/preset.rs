//! OS-style preset filters
//!
//! Fixed 3×3 RGB matrices in the style of the Coblis simulator, blended
//! with the original color by an intensity in [0, 1]. Intensity 0 is the
//! identity and 1 the full matrix, so it doubles as a severity scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::Color;
use crate::profile::VisionType;
use crate::{CvdError, Result};

type Matrix = [[f32; 3]; 3];

const PROTANOPIA: Matrix = [
    [0.567, 0.433, 0.0],
    [0.558, 0.442, 0.0],
    [0.0, 0.242, 0.758],
];

const DEUTERANOPIA: Matrix = [
    [0.625, 0.375, 0.0],
    [0.7, 0.3, 0.0],
    [0.0, 0.3, 0.7],
];

const TRITANOPIA: Matrix = [
    [0.95, 0.05, 0.0],
    [0.0, 0.433, 0.567],
    [0.0, 0.475, 0.525],
];

const GRAYSCALE: Matrix = [
    [0.299, 0.587, 0.114],
    [0.299, 0.587, 0.114],
    [0.299, 0.587, 0.114],
];

/// Built-in color matrix filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsPreset {
    Protanopia,
    Deuteranopia,
    Tritanopia,
    Grayscale,
}

impl OsPreset {
    pub const ALL: [OsPreset; 4] = [
        OsPreset::Protanopia,
        OsPreset::Deuteranopia,
        OsPreset::Tritanopia,
        OsPreset::Grayscale,
    ];

    pub fn matrix(&self) -> &'static Matrix {
        match self {
            OsPreset::Protanopia => &PROTANOPIA,
            OsPreset::Deuteranopia => &DEUTERANOPIA,
            OsPreset::Tritanopia => &TRITANOPIA,
            OsPreset::Grayscale => &GRAYSCALE,
        }
    }

    /// Stable lowercase key used in stored task results
    pub fn key(&self) -> &'static str {
        match self {
            OsPreset::Protanopia => "protanopia",
            OsPreset::Deuteranopia => "deuteranopia",
            OsPreset::Tritanopia => "tritanopia",
            OsPreset::Grayscale => "grayscale",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OsPreset::Protanopia => "Protanopia Preset",
            OsPreset::Deuteranopia => "Deuteranopia Preset",
            OsPreset::Tritanopia => "Tritanopia Preset",
            OsPreset::Grayscale => "Grayscale Preset",
        }
    }

    /// Preset suggested for a measured vision type (grayscale when normal)
    pub fn recommended_for(vision: VisionType) -> Self {
        match vision {
            VisionType::Protan => OsPreset::Protanopia,
            VisionType::Deutan => OsPreset::Deuteranopia,
            VisionType::Tritan => OsPreset::Tritanopia,
            VisionType::Normal => OsPreset::Grayscale,
        }
    }
}

impl fmt::Display for OsPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for OsPreset {
    type Err = CvdError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        OsPreset::ALL
            .into_iter()
            .find(|preset| preset.key() == key)
            .ok_or_else(|| CvdError::invalid_parameter("preset", s))
    }
}

/// Apply a preset matrix at the given intensity
///
/// Intensity is clamped to [0, 1]; a non-finite intensity leaves the color
/// unchanged.
pub fn apply_preset(color: Color, preset: OsPreset, intensity: f32) -> Color {
    if !intensity.is_finite() {
        return color;
    }
    let intensity = intensity.clamp(0.0, 1.0);
    let rgb = [color.r as f32, color.g as f32, color.b as f32];

    let mut out = [0.0f32; 3];
    for (channel, row) in out.iter_mut().zip(preset.matrix()) {
        let filtered = (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 255.0);
        *channel = filtered;
    }

    let blend = |orig: f32, filtered: f32| orig + (filtered - orig) * intensity;
    Color::from_rgb_f32(
        blend(rgb[0], out[0]),
        blend(rgb[1], out[1]),
        blend(rgb[2], out[2]),
    )
}

/// Apply a preset by key to a hex string
///
/// Unknown preset keys and unparsable colors return `hex` unchanged.
pub fn apply_preset_hex(hex: &str, preset: &str, intensity: f32) -> String {
    let (Ok(color), Ok(preset)) = (Color::from_hex(hex), preset.parse::<OsPreset>()) else {
        return hex.to_string();
    };
    apply_preset(color, preset, intensity).to_hex()
}

/// Filter condition a task was run under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Parametric filter built from the participant's profile
    Custom,
    Protanopia,
    Deuteranopia,
    Tritanopia,
    Grayscale,
}

impl FilterKind {
    pub fn preset(&self) -> Option<OsPreset> {
        match self {
            FilterKind::Custom => None,
            FilterKind::Protanopia => Some(OsPreset::Protanopia),
            FilterKind::Deuteranopia => Some(OsPreset::Deuteranopia),
            FilterKind::Tritanopia => Some(OsPreset::Tritanopia),
            FilterKind::Grayscale => Some(OsPreset::Grayscale),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self.preset() {
            Some(preset) => preset.display_name(),
            None => "Custom Adaptive",
        }
    }
}

impl From<OsPreset> for FilterKind {
    fn from(preset: OsPreset) -> Self {
        match preset {
            OsPreset::Protanopia => FilterKind::Protanopia,
            OsPreset::Deuteranopia => FilterKind::Deuteranopia,
            OsPreset::Tritanopia => FilterKind::Tritanopia,
            OsPreset::Grayscale => FilterKind::Grayscale,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.preset() {
            Some(preset) => write!(f, "{}", preset),
            None => write!(f, "custom"),
        }
    }
}
