//! Parametric hue/saturation/luminance correction
//!
//! Per-color transform driven by [`FilterParameters`]:
//! - Achromatic colors (saturation below 0.01) pass through unchanged
//! - Hue is rotated by the shift of the region the color falls into
//! - Saturation and lightness are boosted only inside the deficient region
//!
//! Pure and stateless; safe to call once per rendered color.
//!
//! Algorithm tag: `algo-hsl-region-shift`

use crate::color::{hsl_to_rgb, Color};
use crate::constants::filter::ACHROMATIC_SATURATION;
use crate::filter::params::{FilterParameters, Primary};

/// Apply the parametric correction to one color
pub fn apply_filter(color: Color, params: &FilterParameters) -> Color {
    let hsl = color.to_hsl();
    if hsl.s < ACHROMATIC_SATURATION {
        return color;
    }

    let region = Primary::from_hue(hsl.h);
    let hue = (hsl.h + params.hue_shift.get(region) as f32).rem_euclid(360.0);

    let (mut s, mut l) = (hsl.s, hsl.l);
    if region == params.axis {
        if let Some(boost) = params.saturation_boost_for(region) {
            s = (s * (1.0 + boost as f32)).min(1.0);
        }
        if let Some(gain) = params.luminance_gain_for(region) {
            l = (l * (1.0 + gain as f32)).min(1.0);
        }
    }

    hsl_to_rgb(hue, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0))
}

/// Apply the parametric correction to a hex string
///
/// Returns `hex` unchanged when it does not parse, so a bad value in a
/// render path shows up uncorrected instead of failing.
pub fn apply_filter_hex(hex: &str, params: &FilterParameters) -> String {
    match Color::from_hex(hex) {
        Ok(color) => apply_filter(color, params).to_hex(),
        Err(_) => hex.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::params::HueShift;
    use std::collections::BTreeMap;

    fn protan_params() -> FilterParameters {
        FilterParameters {
            axis: Primary::Red,
            severity: 0.5,
            hue_shift: HueShift {
                red: 12.0,
                green: -7.2,
                blue: 0.0,
            },
            saturation_boost: BTreeMap::from([(Primary::Red, 0.4)]),
            luminance_gain: BTreeMap::from([(Primary::Red, 0.12)]),
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_gray_passes_through() {
        let params = protan_params();
        for v in [0u8, 64, 128, 200, 255] {
            let gray = Color::new(v, v, v);
            assert_eq!(apply_filter(gray, &params), gray);
        }
    }

    #[test]
    fn test_identity_parameters_keep_color() {
        let params = FilterParameters::identity(Primary::Red);
        let color = Color::new(200, 40, 40);
        let out = apply_filter(color, &params);
        assert!((out.r as i16 - color.r as i16).abs() <= 1);
        assert!((out.g as i16 - color.g as i16).abs() <= 1);
        assert!((out.b as i16 - color.b as i16).abs() <= 1);
    }

    #[test]
    fn test_red_rotates_and_brightens() {
        let params = protan_params();
        let red = Color::new(200, 40, 40);
        let before = red.to_hsl();
        let after = apply_filter(red, &params).to_hsl();
        assert!((after.h - 12.0).abs() < 1.5, "hue {}", after.h);
        assert!(after.l > before.l);
    }

    #[test]
    fn test_blue_untouched_by_protan_filter() {
        let params = protan_params();
        let blue = Color::new(40, 40, 200);
        let out = apply_filter(blue, &params);
        assert!((out.b as i16 - 200).abs() <= 1);
        assert!((out.r as i16 - 40).abs() <= 1);
    }

    #[test]
    fn test_green_counter_rotates_without_boost() {
        let params = protan_params();
        let green = Color::new(40, 200, 40);
        let before = green.to_hsl();
        let after = apply_filter(green, &params).to_hsl();
        assert!((after.h - (before.h - 7.2)).abs() < 1.5);
        assert!((after.l - before.l).abs() < 0.01);
    }

    #[test]
    fn test_hex_fail_open() {
        let params = protan_params();
        assert_eq!(apply_filter_hex("not-a-color", &params), "not-a-color");
        assert_eq!(apply_filter_hex("#808080", &params), "#808080");
        assert_eq!(apply_filter_hex("#888", &params), "#888888");
    }

    mod proptests {
        use super::*;
        use crate::filter::params::build_filter_parameters;
        use crate::profile::{AxisScores, DeficiencyAxis, DeficiencyProfile};
        use proptest::prelude::*;

        fn params_for(axis_index: usize, severity: f64) -> FilterParameters {
            let axis = DeficiencyAxis::ALL[axis_index];
            build_filter_parameters(&DeficiencyProfile {
                axis,
                severity,
                declared: None,
                detected: axis,
                scores: AxisScores::default(),
                thresholds: [7.0, 7.0, 7.0],
            })
        }

        proptest! {
            #[test]
            fn prop_filter_is_deterministic(
                r in 0u8..=255, g in 0u8..=255, b in 0u8..=255,
                axis in 0usize..3, severity in 0.0f64..=1.0,
            ) {
                let params = params_for(axis, severity);
                let color = Color::new(r, g, b);
                prop_assert_eq!(apply_filter(color, &params), apply_filter(color, &params));
            }

            #[test]
            fn prop_grays_are_fixed_points(
                v in 0u8..=255, axis in 0usize..3, severity in 0.0f64..=1.0,
            ) {
                let params = params_for(axis, severity);
                let gray = Color::new(v, v, v);
                prop_assert_eq!(apply_filter(gray, &params), gray);
            }
        }
    }
}
