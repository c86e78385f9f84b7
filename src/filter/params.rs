//! Parametric correction filter parameters
//!
//! Maps a deficiency profile to hue rotations per primary plus a saturation
//! boost and luminance gain on the deficient primary. Rotations push the
//! deficient primary away from its confusion line and counter-rotate the
//! primary it is confused with:
//!
//! | axis   | red       | green     | blue  | boosted |
//! |--------|-----------|-----------|-------|---------|
//! | protan | +a        | -0.6a     | 0     | red     |
//! | deutan | -0.6a     | +a        | 0     | green   |
//! | tritan | -0.3a     | -0.3a     | +a    | blue    |
//!
//! where `a = min(25°, 0.6 × deficiency points)`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{ClassificationConfig, FilterConfig, StudyConfig};
use crate::constants::filter::{OPPOSING_SHIFT_RATIO, TRITAN_OPPOSING_SHIFT_RATIO};
use crate::profile::{DeficiencyAxis, DeficiencyProfile};

/// RGB primary, the filter's name for a deficiency axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primary {
    Red,
    Green,
    Blue,
}

impl Primary {
    /// Hue region a color falls into
    ///
    /// Three 120° regions centred on the primaries: red covers
    /// [300°, 360°) and [0°, 60°), green [60°, 180°), blue [180°, 300°).
    pub fn from_hue(hue: f32) -> Self {
        let h = hue.rem_euclid(360.0);
        if (60.0..180.0).contains(&h) {
            Primary::Green
        } else if (180.0..300.0).contains(&h) {
            Primary::Blue
        } else {
            Primary::Red
        }
    }
}

impl From<DeficiencyAxis> for Primary {
    fn from(axis: DeficiencyAxis) -> Self {
        match axis {
            DeficiencyAxis::Protan => Primary::Red,
            DeficiencyAxis::Deutan => Primary::Green,
            DeficiencyAxis::Tritan => Primary::Blue,
        }
    }
}

impl From<Primary> for DeficiencyAxis {
    fn from(primary: Primary) -> Self {
        match primary {
            Primary::Red => DeficiencyAxis::Protan,
            Primary::Green => DeficiencyAxis::Deutan,
            Primary::Blue => DeficiencyAxis::Tritan,
        }
    }
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primary::Red => write!(f, "red"),
            Primary::Green => write!(f, "green"),
            Primary::Blue => write!(f, "blue"),
        }
    }
}

/// Signed hue rotation per primary region (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HueShift {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl HueShift {
    pub fn get(&self, primary: Primary) -> f64 {
        match primary {
            Primary::Red => self.red,
            Primary::Green => self.green,
            Primary::Blue => self.blue,
        }
    }
}

/// Channel thresholds the filter was derived from (percent)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceThresholds {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterMetadata {
    pub thresholds: SourceThresholds,
}

/// Configured parametric correction, read-only once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Deficient primary
    pub axis: Primary,
    /// Normalized severity in [0, 1]
    pub severity: f64,
    pub hue_shift: HueShift,
    /// Saturation multiplier increment, keyed by boosted primary
    pub saturation_boost: BTreeMap<Primary, f64>,
    /// Lightness multiplier increment, keyed by boosted primary
    pub luminance_gain: BTreeMap<Primary, f64>,
    pub metadata: FilterMetadata,
}

impl FilterParameters {
    /// Parameters that leave every color unchanged
    pub fn identity(axis: Primary) -> Self {
        Self {
            axis,
            severity: 0.0,
            hue_shift: HueShift::default(),
            saturation_boost: BTreeMap::new(),
            luminance_gain: BTreeMap::new(),
            metadata: FilterMetadata::default(),
        }
    }

    /// Build parameters from a profile
    ///
    /// # Arguments
    ///
    /// * `profile` - Classified deficiency
    /// * `filter` - Strength limits
    /// * `classification` - Scale used to turn severity back into points
    pub fn from_profile(
        profile: &DeficiencyProfile,
        filter: &FilterConfig,
        classification: &ClassificationConfig,
    ) -> Self {
        let points = profile.deficiency_points(classification);
        let angle = (points * filter.hue_angle_per_point).min(filter.max_hue_angle);
        let sat_boost = (points * filter.saturation_per_point).min(filter.max_saturation_boost);
        let lum_gain = (points * filter.luminance_per_point).min(filter.max_luminance_gain);

        let axis = Primary::from(profile.axis);
        let hue_shift = match axis {
            Primary::Red => HueShift {
                red: angle,
                green: -angle * OPPOSING_SHIFT_RATIO,
                blue: 0.0,
            },
            Primary::Green => HueShift {
                red: -angle * OPPOSING_SHIFT_RATIO,
                green: angle,
                blue: 0.0,
            },
            Primary::Blue => HueShift {
                red: -angle * TRITAN_OPPOSING_SHIFT_RATIO,
                green: -angle * TRITAN_OPPOSING_SHIFT_RATIO,
                blue: angle,
            },
        };

        debug!(
            "filter for {}: {:.2} points, hue {:.2}°, saturation +{:.3}, luminance +{:.3}",
            axis, points, angle, sat_boost, lum_gain
        );

        let [red, green, blue] = profile.thresholds;
        Self {
            axis,
            severity: profile.severity,
            hue_shift: HueShift {
                red: round2(hue_shift.red),
                green: round2(hue_shift.green),
                blue: round2(hue_shift.blue),
            },
            saturation_boost: BTreeMap::from([(axis, sat_boost)]),
            luminance_gain: BTreeMap::from([(axis, lum_gain)]),
            metadata: FilterMetadata {
                thresholds: SourceThresholds { red, green, blue },
            },
        }
    }

    pub fn saturation_boost_for(&self, primary: Primary) -> Option<f64> {
        self.saturation_boost.get(&primary).copied()
    }

    pub fn luminance_gain_for(&self, primary: Primary) -> Option<f64> {
        self.luminance_gain.get(&primary).copied()
    }
}

// Two decimals, without negative zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Build filter parameters with the default study configuration
pub fn build_filter_parameters(profile: &DeficiencyProfile) -> FilterParameters {
    build_filter_parameters_with(profile, &StudyConfig::default())
}

/// Build filter parameters with a specific study configuration
pub fn build_filter_parameters_with(
    profile: &DeficiencyProfile,
    config: &StudyConfig,
) -> FilterParameters {
    FilterParameters::from_profile(profile, &config.filter, &config.classification)
}
