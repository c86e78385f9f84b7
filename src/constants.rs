//! Default constants for the cone contrast test and correction filters
//!
//! These are the compile-time defaults behind [`crate::config::StudyConfig`].
//! The scoring and classification cutoffs are empirical choices, not derived
//! psychophysical truths, which is why every one of them can be overridden
//! through configuration.

/// Adaptive staircase procedure
pub mod staircase {
    /// Starting contrast for every cone channel (percent)
    pub const INITIAL_CONTRAST: f64 = 50.0;

    /// Contrast floor (percent)
    pub const MIN_CONTRAST: f64 = 0.01;

    /// Contrast ceiling (percent)
    pub const MAX_CONTRAST: f64 = 100.0;

    /// Multiplier applied after a correct response
    pub const CORRECT_STEP_DOWN: f64 = 0.7;

    /// Multiplier applied after an incorrect response
    pub const INCORRECT_STEP_UP: f64 = 1.5;

    /// Trials presented per cone channel
    pub const TRIALS_PER_CONE: usize = 20;

    /// Number of trailing reversals averaged into the threshold
    pub const LAST_N_REVERSALS: usize = 6;

    /// Number of leading reversals dropped as warm-up
    pub const DISCARD_FIRST_REVERSALS: usize = 1;

    /// Minimum contrast samples needed to look for a reversal
    pub const MIN_SAMPLES: usize = 3;
}

/// Fixed-level procedure
pub mod fixed_level {
    /// Contrast levels sampled once each (percent)
    pub const DEFAULT_LEVELS: [f64; 6] = [1.0, 5.0, 10.0, 25.0, 50.0, 100.0];
}

/// Threshold to score and category mapping
pub mod scoring {
    /// Score = log contrast sensitivity × this factor
    pub const LOG_CS_SCALE: f64 = 75.0;

    /// Upper bound of the normalized score
    pub const MAX_SCORE: f64 = 200.0;

    /// Threshold fraction floor to keep log10 finite
    pub const MIN_THRESHOLD_FRACTION: f64 = 0.0001;

    /// Threshold above which a channel is "Possible" (percent)
    pub const POSSIBLE_THRESHOLD: f64 = 10.0;

    /// Threshold above which a channel is "Deficient" (percent)
    pub const DEFICIENT_THRESHOLD: f64 = 25.0;

    /// Score below which a channel is "Possible"
    pub const POSSIBLE_SCORE: f64 = 80.0;

    /// Score below which a channel is "Deficient"
    pub const DEFICIENT_SCORE: f64 = 50.0;
}

/// Deficiency classification
pub mod classification {
    /// Threshold of a normal cone channel (percent)
    pub const NORMAL_BASELINE_THRESHOLD: f64 = 7.0;

    /// Deficiency value mapped to severity 1.0
    pub const MAX_DEFICIENCY: f64 = 40.0;

    /// Axes closer than this to the primary blend into severity
    pub const CLOSENESS_THRESHOLD: f64 = 4.0;

    /// Weight of a fully-close secondary axis
    pub const BLEND_WEIGHT: f64 = 0.15;
}

/// Parametric correction filter
pub mod filter {
    /// Largest hue rotation applied to the deficient primary (degrees)
    pub const MAX_HUE_ANGLE: f64 = 25.0;

    /// Degrees of rotation per deficiency point
    pub const HUE_ANGLE_PER_POINT: f64 = 0.6;

    /// Largest saturation boost
    pub const MAX_SATURATION_BOOST: f64 = 0.8;

    /// Saturation boost per deficiency point
    pub const SATURATION_PER_POINT: f64 = 0.02;

    /// Largest luminance gain
    pub const MAX_LUMINANCE_GAIN: f64 = 0.25;

    /// Luminance gain per deficiency point
    pub const LUMINANCE_PER_POINT: f64 = 0.006;

    /// Counter-rotation of the confused primary for protan/deutan
    pub const OPPOSING_SHIFT_RATIO: f64 = 0.6;

    /// Counter-rotation of red and green for tritan
    pub const TRITAN_OPPOSING_SHIFT_RATIO: f64 = 0.3;

    /// Saturation below which a color is treated as gray
    pub const ACHROMATIC_SATURATION: f32 = 0.01;

    /// Default strength of OS preset filters
    pub const DEFAULT_PRESET_INTENSITY: f32 = 1.0;
}

/// WCAG 2.x contrast
pub mod wcag {
    /// sRGB linearization breakpoint used by WCAG 2.0
    pub const GAMMA_THRESHOLD: f64 = 0.03928;

    /// Luminance weights (R, G, B)
    pub const LUMINANCE_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

    /// Flare term added to both luminances
    pub const FLARE: f64 = 0.05;

    /// AA body text minimum ratio
    pub const AA_NORMAL_TEXT: f64 = 4.5;

    /// Per-channel step when nudging a color toward more contrast
    pub const CONTRAST_STEP: i16 = 10;

    /// Maximum nudges before giving up
    pub const MAX_CONTRAST_STEPS: usize = 20;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staircase_constants() {
        assert!(staircase::MIN_CONTRAST < staircase::INITIAL_CONTRAST);
        assert!(staircase::INITIAL_CONTRAST < staircase::MAX_CONTRAST);
        assert!(staircase::CORRECT_STEP_DOWN < 1.0);
        assert!(staircase::INCORRECT_STEP_UP > 1.0);
    }

    #[test]
    fn test_category_cutoffs_ordered() {
        assert!(scoring::POSSIBLE_THRESHOLD < scoring::DEFICIENT_THRESHOLD);
        assert!(scoring::DEFICIENT_SCORE < scoring::POSSIBLE_SCORE);
    }

    #[test]
    fn test_luminance_weights_sum_to_one() {
        let sum: f64 = wcag::LUMINANCE_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
