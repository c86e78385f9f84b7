//! Relative luminance and WCAG contrast
//!
//! Uses the WCAG 2.0 definition of relative luminance (linearization
//! breakpoint 0.03928), which the rest of the study reports against.
//! palette's own WCAG helpers use the newer 0.04045 breakpoint, so the
//! transfer function is spelled out here.

use crate::color::Color;
use crate::constants::wcag;
use crate::Result;

fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= wcag::GAMMA_THRESHOLD {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of a color, in [0, 1]
pub fn relative_luminance(color: Color) -> f64 {
    let [wr, wg, wb] = wcag::LUMINANCE_WEIGHTS;
    wr * srgb_to_linear(color.r) + wg * srgb_to_linear(color.g) + wb * srgb_to_linear(color.b)
}

/// WCAG contrast ratio between two colors
///
/// # Returns
///
/// `(L_high + 0.05) / (L_low + 0.05)`, in [1, 21]. Symmetric in its
/// arguments.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (high, low) = if la >= lb { (la, lb) } else { (lb, la) };
    (high + wcag::FLARE) / (low + wcag::FLARE)
}

/// WCAG contrast ratio between two hex colors
///
/// # Errors
///
/// Returns [`crate::CvdError::FormatError`] if either string is not a color
pub fn contrast_ratio_hex(a: &str, b: &str) -> Result<f64> {
    Ok(contrast_ratio(Color::from_hex(a)?, Color::from_hex(b)?))
}

/// Nudge a foreground color until it reaches a minimum contrast ratio
///
/// Every channel moves by the same step per try: darker against a light
/// background, lighter against a dark one. Gives up after a fixed number of
/// steps and returns the best attempt.
///
/// # Arguments
///
/// * `foreground` - Color to adjust
/// * `background` - Color it is drawn on
/// * `target` - Required contrast ratio, e.g. 4.5 for WCAG AA text
pub fn ensure_min_contrast(foreground: Color, background: Color, target: f64) -> Color {
    let step = if relative_luminance(background) > 0.5 {
        -wcag::CONTRAST_STEP
    } else {
        wcag::CONTRAST_STEP
    };

    let nudge = |c: u8| (c as i16 + step).clamp(0, 255) as u8;

    let mut current = foreground;
    let mut tries = 0;
    while contrast_ratio(current, background) < target && tries < wcag::MAX_CONTRAST_STEPS {
        current = Color::new(nudge(current.r), nudge(current.g), nudge(current.b));
        tries += 1;
    }
    current
}
