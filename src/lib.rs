//! # Cone Adapt
//!
//! A Rust crate for measuring cone contrast thresholds and building
//! personalised color vision correction filters.
//!
//! This library provides the measurement and transform core of a color
//! vision deficiency study by:
//! - Estimating per-cone (L, M, S) contrast thresholds from forced-choice trials
//! - Scoring and categorizing each cone channel
//! - Classifying the deficiency axis and severity, honoring a self-report
//! - Building a parametric hue/saturation/luminance correction from the profile
//! - Applying either that correction or an OS-style preset matrix to colors
//!
//! ## Example
//!
//! ```rust
//! use cone_adapt::{
//!     apply_filter_hex, build_filter_parameters, classify_deficiency, ChannelMetrics,
//!     ConeTestResult, ScoringConfig,
//! };
//!
//! let scoring = ScoringConfig::default();
//! let metrics = |t| ChannelMetrics::from_threshold(t, 0.0, 20, 1.2, &scoring);
//! let result = ConeTestResult::new(metrics(18.0), metrics(6.0), metrics(5.0));
//!
//! let profile = classify_deficiency(&result, None);
//! let params = build_filter_parameters(&profile);
//! let corrected = apply_filter_hex("#cc3333", &params);
//! assert_ne!(corrected, "#cc3333");
//! ```

pub mod error;
pub mod constants;
pub mod config;
pub mod color;
pub mod trial;
pub mod threshold;
pub mod profile;
pub mod filter;
pub mod session;

pub use error::{CvdError, Result};
pub use config::{ClassificationConfig, FilterConfig, ScoringConfig, StaircaseConfig, StudyConfig};
pub use color::{
    contrast_ratio, contrast_ratio_hex, ensure_min_contrast, hex_to_rgb, hsl_to_rgb,
    relative_luminance, rgb_to_hex, rgb_to_hsl, Color, HslColor,
};
pub use trial::{ConeChannel, Direction, Trial};
pub use threshold::{
    estimate_threshold_from_fixed_levels, estimate_threshold_from_reversals, find_reversals,
    Category, ChannelMetrics, ConeTestResult, ReversalPoint, StaircaseController,
    ThresholdMethod, ThresholdResult,
};
pub use profile::{
    classify_deficiency, AxisComparison, AxisScores, DeficiencyAxis, DeficiencyProfile,
    DeficiencyProfiler, VisionType,
};
pub use filter::{
    apply_filter, apply_filter_hex, apply_preset, apply_preset_hex, build_filter_parameters,
    build_filter_parameters_with, ActiveFilter, FilterKind, FilterParameters, HueShift, OsPreset,
    Primary,
};
pub use session::{ConditionTotals, FilterComparison, SessionContext, TaskPerformance, TaskStats};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serialization() {
        let scoring = ScoringConfig::default();
        let metrics = |t| ChannelMetrics::from_threshold(t, 0.5, 20, 1.0, &scoring);
        let result = ConeTestResult::new(metrics(5.0), metrics(22.0), metrics(6.0));
        let profile = classify_deficiency(&result, None);

        let json = serde_json::to_string(&profile).unwrap();
        let deserialized: DeficiencyProfile = serde_json::from_str(&json).unwrap();

        assert_eq!(profile, deserialized);
        assert_eq!(deserialized.axis, DeficiencyAxis::Deutan);
    }

    #[test]
    fn test_value_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FilterParameters>();
        assert_send_sync::<SessionContext>();
        assert_send_sync::<CvdError>();
    }
}
