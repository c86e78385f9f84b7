//! Configuration structures for the cone contrast study.
//!
//! This module defines all tunable parameters of the measurement and
//! correction pipeline, organized into logical groups for the staircase,
//! scoring, classification, and filters.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use cone_adapt::StudyConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = StudyConfig::from_json_file(Path::new("study.json"))?;
//!
//! // Or use defaults
//! let config = StudyConfig::default_study();
//! # Ok::<(), cone_adapt::CvdError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`StaircaseConfig`]: Step rule and reversal averaging
//! - [`ScoringConfig`]: Threshold to score and category mapping
//! - [`ClassificationConfig`]: Deficiency baseline and axis blending
//! - [`FilterConfig`]: Correction strength limits and preset defaults

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{classification, filter, scoring, staircase, wcag};
use crate::{CvdError, Result};

/// Complete configuration for one study run.
///
/// Can be serialized to/from JSON for reproducible experiments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Adaptive staircase parameters
    #[serde(default)]
    pub staircase: StaircaseConfig,

    /// Score and category cutoffs
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Deficiency classification parameters
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Correction filter parameters
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Adaptive staircase parameters.
///
/// Contrast is multiplied by `correct_step_down` after a hit and by
/// `incorrect_step_up` after a miss, clamped to `[min_contrast, max_contrast]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaircaseConfig {
    /// Starting contrast (percent)
    pub initial_contrast: f64,

    /// Contrast floor (percent)
    pub min_contrast: f64,

    /// Contrast ceiling (percent)
    pub max_contrast: f64,

    /// Multiplier after a correct response
    pub correct_step_down: f64,

    /// Multiplier after an incorrect response
    pub incorrect_step_up: f64,

    /// Trials per cone channel
    pub trials_per_cone: usize,

    /// Trailing reversals averaged into the threshold
    pub last_n_reversals: usize,

    /// Leading reversals dropped as warm-up
    pub discard_first_reversals: usize,
}

/// Threshold to score and category mapping.
///
/// These cutoffs are empirical; override them here rather than in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Score = log contrast sensitivity × this factor
    pub log_cs_scale: f64,

    /// Score ceiling
    pub max_score: f64,

    /// Threshold above which a channel is Possible (percent)
    pub possible_threshold: f64,

    /// Threshold above which a channel is Deficient (percent)
    pub deficient_threshold: f64,

    /// Score below which a channel is Possible
    pub possible_score: f64,

    /// Score below which a channel is Deficient
    pub deficient_score: f64,
}

/// Deficiency classification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Threshold of a normal cone channel (percent)
    pub baseline_threshold: f64,

    /// Deficiency value that maps to severity 1.0
    pub max_deficiency: f64,

    /// Secondary axes closer than this to the primary blend into severity
    pub closeness_threshold: f64,

    /// Weight of a fully-close secondary axis
    pub blend_weight: f64,
}

/// Correction filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Largest hue rotation (degrees)
    pub max_hue_angle: f64,

    /// Degrees per deficiency point
    pub hue_angle_per_point: f64,

    /// Largest saturation boost
    pub max_saturation_boost: f64,

    /// Saturation boost per deficiency point
    pub saturation_per_point: f64,

    /// Largest luminance gain
    pub max_luminance_gain: f64,

    /// Luminance gain per deficiency point
    pub luminance_per_point: f64,

    /// Default strength of OS preset filters (0.0-1.0)
    pub preset_intensity: f32,

    /// Minimum WCAG contrast for text drawn over filtered colors
    pub min_text_contrast: f64,
}

impl Default for StaircaseConfig {
    fn default() -> Self {
        Self {
            initial_contrast: staircase::INITIAL_CONTRAST,
            min_contrast: staircase::MIN_CONTRAST,
            max_contrast: staircase::MAX_CONTRAST,
            correct_step_down: staircase::CORRECT_STEP_DOWN,
            incorrect_step_up: staircase::INCORRECT_STEP_UP,
            trials_per_cone: staircase::TRIALS_PER_CONE,
            last_n_reversals: staircase::LAST_N_REVERSALS,
            discard_first_reversals: staircase::DISCARD_FIRST_REVERSALS,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            log_cs_scale: scoring::LOG_CS_SCALE,
            max_score: scoring::MAX_SCORE,
            possible_threshold: scoring::POSSIBLE_THRESHOLD,
            deficient_threshold: scoring::DEFICIENT_THRESHOLD,
            possible_score: scoring::POSSIBLE_SCORE,
            deficient_score: scoring::DEFICIENT_SCORE,
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            baseline_threshold: classification::NORMAL_BASELINE_THRESHOLD,
            max_deficiency: classification::MAX_DEFICIENCY,
            closeness_threshold: classification::CLOSENESS_THRESHOLD,
            blend_weight: classification::BLEND_WEIGHT,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_hue_angle: filter::MAX_HUE_ANGLE,
            hue_angle_per_point: filter::HUE_ANGLE_PER_POINT,
            max_saturation_boost: filter::MAX_SATURATION_BOOST,
            saturation_per_point: filter::SATURATION_PER_POINT,
            max_luminance_gain: filter::MAX_LUMINANCE_GAIN,
            luminance_per_point: filter::LUMINANCE_PER_POINT,
            preset_intensity: filter::DEFAULT_PRESET_INTENSITY,
            min_text_contrast: wcag::AA_NORMAL_TEXT,
        }
    }
}

impl StudyConfig {
    /// Create the default study configuration
    pub fn default_study() -> Self {
        Self::default()
    }

    /// Check that every parameter is in a usable range
    ///
    /// # Errors
    ///
    /// Returns [`CvdError::InvalidParameter`] naming the first bad field
    pub fn validate(&self) -> Result<()> {
        let s = &self.staircase;
        if !(s.min_contrast > 0.0 && s.min_contrast < s.max_contrast) {
            return Err(CvdError::invalid_parameter("staircase.min_contrast", s.min_contrast));
        }
        if !(s.min_contrast..=s.max_contrast).contains(&s.initial_contrast) {
            return Err(CvdError::invalid_parameter(
                "staircase.initial_contrast",
                s.initial_contrast,
            ));
        }
        if !(s.correct_step_down > 0.0 && s.correct_step_down < 1.0) {
            return Err(CvdError::invalid_parameter(
                "staircase.correct_step_down",
                s.correct_step_down,
            ));
        }
        if s.incorrect_step_up <= 1.0 {
            return Err(CvdError::invalid_parameter(
                "staircase.incorrect_step_up",
                s.incorrect_step_up,
            ));
        }
        if s.last_n_reversals == 0 {
            return Err(CvdError::invalid_parameter("staircase.last_n_reversals", 0));
        }

        let sc = &self.scoring;
        if sc.possible_threshold > sc.deficient_threshold {
            return Err(CvdError::invalid_parameter(
                "scoring.possible_threshold",
                sc.possible_threshold,
            ));
        }
        if sc.deficient_score > sc.possible_score {
            return Err(CvdError::invalid_parameter("scoring.deficient_score", sc.deficient_score));
        }

        let c = &self.classification;
        if c.max_deficiency <= 0.0 {
            return Err(CvdError::invalid_parameter(
                "classification.max_deficiency",
                c.max_deficiency,
            ));
        }
        if c.closeness_threshold <= 0.0 {
            return Err(CvdError::invalid_parameter(
                "classification.closeness_threshold",
                c.closeness_threshold,
            ));
        }

        if !(0.0..=1.0).contains(&self.filter.preset_intensity) {
            return Err(CvdError::invalid_parameter(
                "filter.preset_intensity",
                self.filter.preset_intensity,
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CvdError::config_io(format!("reading {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| CvdError::config_parse(format!("parsing {}", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CvdError::config_parse("serializing study config", e))?;
        std::fs::write(path, json)
            .map_err(|e| CvdError::config_io(format!("writing {}", path.display()), e))?;
        Ok(())
    }
}
