//! Per-channel metrics derived from a threshold estimate
//!
//! Log contrast sensitivity, normalized score and category are shared by
//! both estimation strategies: they only look at the threshold.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ScoringConfig, StaircaseConfig};
use crate::constants::scoring::MIN_THRESHOLD_FRACTION;
use crate::threshold::{estimate_threshold_from_fixed_levels, estimate_threshold_from_reversals};
use crate::trial::{ConeChannel, Trial};
use crate::{CvdError, Result};

/// Screening category of a cone channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Normal,
    Possible,
    Deficient,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Normal => write!(f, "Normal"),
            Category::Possible => write!(f, "Possible"),
            Category::Deficient => write!(f, "Deficient"),
        }
    }
}

/// How a channel's trials were generated, and therefore how to estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Adaptive staircase, estimated from reversals
    Staircase {
        last_n: usize,
        discard_first: usize,
    },
    /// Each level shown once, estimated by bracketing
    FixedLevels,
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::from(&StaircaseConfig::default())
    }
}

impl From<&StaircaseConfig> for ThresholdMethod {
    fn from(config: &StaircaseConfig) -> Self {
        ThresholdMethod::Staircase {
            last_n: config.last_n_reversals,
            discard_first: config.discard_first_reversals,
        }
    }
}

/// Log10 contrast sensitivity for a threshold given in percent
pub fn log_sensitivity(threshold_percent: f64) -> f64 {
    let fraction = (threshold_percent / 100.0).max(MIN_THRESHOLD_FRACTION);
    (1.0 / fraction).log10()
}

/// Normalized score, rounded and saturated to `[0, max_score]`
pub fn score(log_cs: f64, scoring: &ScoringConfig) -> f64 {
    (log_cs * scoring.log_cs_scale).clamp(0.0, scoring.max_score).round()
}

/// Screening category from threshold and score
pub fn categorize(threshold_percent: f64, score: f64, scoring: &ScoringConfig) -> Category {
    if threshold_percent > scoring.deficient_threshold || score < scoring.deficient_score {
        Category::Deficient
    } else if threshold_percent > scoring.possible_threshold || score < scoring.possible_score {
        Category::Possible
    } else {
        Category::Normal
    }
}

/// Aggregate measurements of one cone channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    /// Estimated minimum detectable contrast (percent)
    pub threshold: f64,
    pub std_error: f64,
    pub trial_count: usize,
    pub avg_response_time_sec: f64,
    pub log_sensitivity: f64,
    /// Normalized score (0-200)
    pub score: f64,
    pub category: Category,
}

impl ChannelMetrics {
    /// Derive metrics from an already-estimated threshold
    pub fn from_threshold(
        threshold: f64,
        std_error: f64,
        trial_count: usize,
        avg_response_time_sec: f64,
        scoring: &ScoringConfig,
    ) -> Self {
        let log_cs = log_sensitivity(threshold);
        let score = score(log_cs, scoring);
        Self {
            threshold,
            std_error,
            trial_count,
            avg_response_time_sec,
            log_sensitivity: log_cs,
            score,
            category: categorize(threshold, score, scoring),
        }
    }

    /// Estimate a channel's threshold and derive its metrics
    ///
    /// # Arguments
    ///
    /// * `trials` - The channel's trials in presentation order
    /// * `method` - Strategy matching how the trials were generated
    /// * `scoring` - Score and category cutoffs
    ///
    /// # Errors
    ///
    /// Propagates the estimator's insufficient-data conditions; returns
    /// [`CvdError::InvalidParameter`] for an empty trial set
    pub fn from_trials(
        trials: &[Trial],
        method: ThresholdMethod,
        scoring: &ScoringConfig,
    ) -> Result<Self> {
        if trials.is_empty() {
            return Err(CvdError::invalid_parameter("trials", "empty"));
        }

        let contrasts: Vec<f64> = trials.iter().map(|t| t.contrast_percent).collect();

        let (threshold, std_error) = match method {
            ThresholdMethod::Staircase {
                last_n,
                discard_first,
            } => {
                let result = estimate_threshold_from_reversals(&contrasts, last_n, discard_first)?;
                (result.threshold_mean, result.standard_error)
            }
            ThresholdMethod::FixedLevels => {
                let responses: Vec<bool> = trials.iter().map(Trial::correct).collect();
                (estimate_threshold_from_fixed_levels(&contrasts, &responses)?, 0.0)
            }
        };

        let avg_response_time_sec = trials.iter().map(|t| t.response_time_ms as f64).sum::<f64>()
            / trials.len() as f64
            / 1000.0;

        Ok(Self::from_threshold(
            threshold,
            std_error,
            trials.len(),
            avg_response_time_sec,
            scoring,
        ))
    }
}

/// Metrics for all three cone channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConeTestResult {
    #[serde(rename = "L")]
    pub l: ChannelMetrics,
    #[serde(rename = "M")]
    pub m: ChannelMetrics,
    #[serde(rename = "S")]
    pub s: ChannelMetrics,
}

impl ConeTestResult {
    pub fn new(l: ChannelMetrics, m: ChannelMetrics, s: ChannelMetrics) -> Self {
        Self { l, m, s }
    }

    /// Split a mixed trial log by channel and estimate each one
    pub fn from_trials(
        trials: &[Trial],
        method: ThresholdMethod,
        scoring: &ScoringConfig,
    ) -> Result<Self> {
        let channel = |c: ConeChannel| {
            let subset = crate::trial::trials_for_channel(trials, c);
            ChannelMetrics::from_trials(&subset, method, scoring)
        };
        Ok(Self {
            l: channel(ConeChannel::L)?,
            m: channel(ConeChannel::M)?,
            s: channel(ConeChannel::S)?,
        })
    }

    pub fn channel(&self, channel: ConeChannel) -> &ChannelMetrics {
        match channel {
            ConeChannel::L => &self.l,
            ConeChannel::M => &self.m,
            ConeChannel::S => &self.s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::Direction;
    use approx::assert_relative_eq;

    fn scoring() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn test_log_sensitivity() {
        assert_relative_eq!(log_sensitivity(1.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(log_sensitivity(10.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(log_sensitivity(100.0), 0.0, epsilon = 1e-12);
        // Floored to keep log10 finite
        assert_relative_eq!(log_sensitivity(0.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_score_saturates() {
        assert_eq!(score(1.0, &scoring()), 75.0);
        assert_eq!(score(4.0, &scoring()), 200.0);
        assert_eq!(score(-1.0, &scoring()), 0.0);
    }

    #[test]
    fn test_categories() {
        let s = scoring();
        // 5%: logCS 1.30, score 98
        let normal = ChannelMetrics::from_threshold(5.0, 0.0, 20, 1.0, &s);
        assert_eq!(normal.score, 98.0);
        assert_eq!(normal.category, Category::Normal);

        // 12%: above the 10% cutoff
        let possible = ChannelMetrics::from_threshold(12.0, 0.0, 20, 1.0, &s);
        assert_eq!(possible.category, Category::Possible);

        // 30%: above the 25% cutoff
        let deficient = ChannelMetrics::from_threshold(30.0, 0.0, 20, 1.0, &s);
        assert_eq!(deficient.category, Category::Deficient);
    }

    #[test]
    fn test_configurable_cutoffs() {
        let mut s = scoring();
        s.possible_threshold = 4.0;
        let m = ChannelMetrics::from_threshold(5.0, 0.0, 20, 1.0, &s);
        assert_eq!(m.category, Category::Possible);
    }

    #[test]
    fn test_lower_threshold_never_scores_lower() {
        let s = scoring();
        let mut previous = f64::INFINITY;
        for i in 1..=1000 {
            let threshold = i as f64 * 0.1;
            let m = ChannelMetrics::from_threshold(threshold, 0.0, 1, 0.0, &s);
            assert!(m.score <= previous);
            previous = m.score;
        }
    }

    fn trial(contrast: f64, correct: bool, rt: u64) -> Trial {
        let chosen = if correct { Direction::Up } else { Direction::Down };
        Trial::new(ConeChannel::L, Direction::Up, chosen, contrast, rt)
    }

    #[test]
    fn test_from_trials_fixed_levels() {
        let trials: Vec<Trial> = [1.0, 5.0, 10.0, 25.0, 50.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| trial(c, i >= 3, 1000))
            .collect();
        let m = ChannelMetrics::from_trials(&trials, ThresholdMethod::FixedLevels, &scoring()).unwrap();
        assert_relative_eq!(m.threshold, 250.0_f64.sqrt());
        assert_eq!(m.trial_count, 6);
        assert_relative_eq!(m.avg_response_time_sec, 1.0);
        assert_eq!(m.category, Category::Possible);
    }

    #[test]
    fn test_from_trials_staircase() {
        let contrasts = [32.0, 16.0, 8.0, 16.0, 8.0, 4.0, 8.0, 4.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0];
        let trials: Vec<Trial> = contrasts.iter().map(|&c| trial(c, true, 500)).collect();
        let m = ChannelMetrics::from_trials(&trials, ThresholdMethod::default(), &scoring()).unwrap();
        assert_relative_eq!(m.threshold, 3.5);
        assert_eq!(m.category, Category::Normal);
        assert!(m.std_error > 0.0);
    }

    #[test]
    fn test_from_trials_insufficient_data() {
        let trials = vec![trial(50.0, true, 500), trial(35.0, true, 500)];
        let err = ChannelMetrics::from_trials(&trials, ThresholdMethod::default(), &scoring()).unwrap_err();
        assert!(err.is_recoverable());

        let err = ChannelMetrics::from_trials(&[], ThresholdMethod::FixedLevels, &scoring()).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_cone_test_result_serializes_with_channel_names() {
        let m = ChannelMetrics::from_threshold(5.0, 0.0, 20, 1.0, &scoring());
        let result = ConeTestResult::new(m.clone(), m.clone(), m);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"L\""));
        assert!(json.contains("\"S\""));
    }
}
