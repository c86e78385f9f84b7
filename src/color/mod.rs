//! Color representation and color space math
//!
//! This module handles hex/RGB/HSL conversions and the WCAG luminance and
//! contrast measures used by the filters and the task harness.

pub mod conversion;
pub mod contrast;

pub use contrast::{contrast_ratio, contrast_ratio_hex, ensure_min_contrast, relative_luminance};
pub use conversion::{hex_to_rgb, hsl_to_rgb, rgb_to_hex, rgb_to_hsl, Color, HslColor};
