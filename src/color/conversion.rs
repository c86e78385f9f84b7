//! Color space conversion utilities
//!
//! Provides conversions between the representations the filters work with:
//! - Hex strings (`#rgb`, `#rrggbb`) to RGB and back
//! - RGB to HSL and back, via the palette crate
//!
//! RGB is the color of record. HSL is only a working view for the filter
//! math and is never stored.

use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CvdError, Result};

/// An 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// HSL view of a color
///
/// `h` in [0, 360), `s` and `l` in [0, 1]. Achromatic colors have `s == 0`
/// and `h == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HslColor {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from floating point channels in [0, 255]
    ///
    /// Each channel is rounded, then clamped.
    pub fn from_rgb_f32(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: round_channel(r),
            g: round_channel(g),
            b: round_channel(b),
        }
    }

    /// Parse a hexadecimal color string
    ///
    /// # Arguments
    ///
    /// * `hex` - `#rgb` or `#rrggbb`, case-insensitive, `#` optional
    ///
    /// # Errors
    ///
    /// Returns [`CvdError::FormatError`] if the string has the wrong length
    /// or contains non-hex characters
    pub fn from_hex(hex: &str) -> Result<Self> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CvdError::format(hex, "contains non-hex characters"));
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            n => {
                return Err(CvdError::format(
                    hex,
                    format!("expected 3 or 6 hex digits, got {}", n),
                ))
            }
        };

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&expanded[range], 16)
                .map_err(|e| CvdError::format(hex, e.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Parse a hex string, substituting `fallback` for malformed input
    ///
    /// Render code uses this so a single bad swatch cannot abort a frame.
    pub fn from_hex_or(hex: &str, fallback: Color) -> Self {
        Self::from_hex(hex).unwrap_or(fallback)
    }

    /// Canonical `#rrggbb` lowercase representation
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn is_achromatic(&self) -> bool {
        self.r == self.g && self.g == self.b
    }

    /// Convert to HSL
    pub fn to_hsl(&self) -> HslColor {
        rgb_to_hsl(self.r, self.g, self.b)
    }

    /// Convert from HSL
    pub fn from_hsl(hsl: HslColor) -> Self {
        hsl_to_rgb(hsl.h, hsl.s, hsl.l)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = CvdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<Srgb<u8>> for Color {
    fn from(srgb: Srgb<u8>) -> Self {
        Self::new(srgb.red, srgb.green, srgb.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(color: Color) -> Self {
        Srgb::new(color.r, color.g, color.b)
    }
}

fn round_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Parse a hex color into its RGB channels
pub fn hex_to_rgb(hex: &str) -> Result<Color> {
    Color::from_hex(hex)
}

/// Encode floating point RGB channels as `#rrggbb`
///
/// Channels are rounded and clamped to [0, 255] first.
pub fn rgb_to_hex(r: f32, g: f32, b: f32) -> String {
    Color::from_rgb_f32(r, g, b).to_hex()
}

/// Convert 8-bit RGB to HSL
///
/// # Returns
///
/// Hue in degrees [0, 360), saturation and lightness in [0, 1]
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> HslColor {
    let srgb: Srgb = Srgb::new(r, g, b).into_format();
    let hsl: Hsl = Hsl::from_color(srgb);

    if r == g && g == b {
        return HslColor {
            h: 0.0,
            s: 0.0,
            l: hsl.lightness,
        };
    }

    let mut h = hsl.hue.into_positive_degrees();
    if h >= 360.0 {
        h -= 360.0;
    }

    HslColor {
        h,
        s: hsl.saturation.clamp(0.0, 1.0),
        l: hsl.lightness.clamp(0.0, 1.0),
    }
}

/// Convert HSL to 8-bit RGB
///
/// Hue is wrapped into [0, 360); saturation and lightness are clamped to
/// [0, 1].
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    let h = h.rem_euclid(360.0);
    let hsl: Hsl = Hsl::new(h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
    let srgb: Srgb = Srgb::from_color(hsl);

    Color::from_rgb_f32(srgb.red * 255.0, srgb.green * 255.0, srgb.blue * 255.0)
}
