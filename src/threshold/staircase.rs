//! Adaptive staircase procedure and reversal-based threshold estimation
//!
//! The staircase lowers contrast after a correct response and raises it
//! after a miss, so the presented contrast oscillates around the detection
//! threshold. Each change of direction is a reversal; the threshold is the
//! mean contrast at the last few reversals, after dropping the first ones
//! as warm-up.
//!
//! Algorithm tag: `algo-staircase-reversals`

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::StaircaseConfig;
use crate::constants::staircase::MIN_SAMPLES;
use crate::{CvdError, Result};

/// A point where the staircase changed direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReversalPoint {
    /// Index into the contrast sequence
    pub index: usize,
    /// Contrast at the turning point
    pub contrast: f64,
    /// Direction before and after the turn (+1 up, -1 down)
    pub direction_change: (i8, i8),
}

/// Threshold estimate derived from staircase reversals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    /// All reversals found, before any were discarded
    pub total_reversals_found: usize,
    pub reversal_points: Vec<ReversalPoint>,
    /// Reversal contrasts averaged into the threshold
    pub used_for_threshold: Vec<f64>,
    pub threshold_mean: f64,
    /// Sample standard deviation (n - 1), 0 for a single reversal
    pub threshold_std: f64,
    pub standard_error: f64,
}

fn direction(diff: f64) -> i8 {
    if diff > 0.0 {
        1
    } else if diff < 0.0 {
        -1
    } else {
        0
    }
}

/// Locate reversals in a contrast sequence
///
/// Plateaus (zero differences) never start or end a run. A reversal at
/// index `i` means the step from `contrasts[i]` to `contrasts[i + 1]` went
/// the opposite way to the last non-zero step before it.
pub fn find_reversals(contrasts: &[f64]) -> Vec<ReversalPoint> {
    if contrasts.len() < MIN_SAMPLES {
        return Vec::new();
    }

    let dirs: Vec<i8> = contrasts.windows(2).map(|w| direction(w[1] - w[0])).collect();

    let mut prev = dirs.iter().copied().find(|&d| d != 0);
    let mut reversals = Vec::new();

    for (i, &curr) in dirs.iter().enumerate().skip(1) {
        if curr == 0 {
            continue;
        }
        if let Some(p) = prev {
            if curr != p {
                reversals.push(ReversalPoint {
                    index: i,
                    contrast: contrasts[i],
                    direction_change: (p, curr),
                });
            }
        }
        prev = Some(curr);
    }

    reversals
}

/// Estimate a threshold from the reversals of a staircase sequence
///
/// # Arguments
///
/// * `contrasts` - Presented contrasts in trial order
/// * `last_n` - How many trailing reversals to average (typically 6-12)
/// * `discard_first` - How many leading reversals to drop (typically 1 or 2)
///
/// # Errors
///
/// Both errors are recoverable insufficient-data conditions:
/// - [`CvdError::NoReversals`] if the sequence is shorter than three samples
///   or never changes direction
/// - [`CvdError::InsufficientReversals`] if nothing is left after discarding
pub fn estimate_threshold_from_reversals(
    contrasts: &[f64],
    last_n: usize,
    discard_first: usize,
) -> Result<ThresholdResult> {
    let reversals = find_reversals(contrasts);

    if reversals.is_empty() {
        return Err(CvdError::NoReversals {
            samples: contrasts.len(),
        });
    }

    let values: Vec<f64> = reversals.iter().skip(discard_first).map(|r| r.contrast).collect();
    let used: Vec<f64> = values[values.len().saturating_sub(last_n)..].to_vec();

    if used.is_empty() {
        return Err(CvdError::InsufficientReversals {
            found: reversals.len(),
            discarded: discard_first,
        });
    }

    let n = used.len() as f64;
    let mean = used.iter().sum::<f64>() / n;
    let std = if used.len() > 1 {
        let variance = used.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    debug!(
        "staircase: {} samples, {} reversals, {} used, threshold {:.3} ± {:.3}",
        contrasts.len(),
        reversals.len(),
        used.len(),
        mean,
        std
    );

    Ok(ThresholdResult {
        total_reversals_found: reversals.len(),
        reversal_points: reversals,
        used_for_threshold: used,
        threshold_mean: mean,
        threshold_std: std,
        standard_error: std / n.sqrt(),
    })
}

/// Step rule of the adaptive staircase
///
/// Owned by whoever presents the stimuli. It only tracks the next contrast
/// to show and the sequence shown so far; the estimate itself comes from
/// [`estimate_threshold_from_reversals`].
#[derive(Debug, Clone)]
pub struct StaircaseController {
    config: StaircaseConfig,
    current: f64,
    presented: Vec<f64>,
}

impl Default for StaircaseController {
    fn default() -> Self {
        Self::new(StaircaseConfig::default())
    }
}

impl StaircaseController {
    pub fn new(config: StaircaseConfig) -> Self {
        Self {
            current: config.initial_contrast,
            config,
            presented: Vec::new(),
        }
    }

    /// Contrast for the next stimulus
    pub fn current_contrast(&self) -> f64 {
        self.current
    }

    /// Record the response to the current stimulus and step the staircase
    ///
    /// # Returns
    ///
    /// The contrast for the next stimulus
    pub fn record(&mut self, correct: bool) -> f64 {
        self.presented.push(self.current);
        self.current = if correct {
            (self.current * self.config.correct_step_down).max(self.config.min_contrast)
        } else {
            (self.current * self.config.incorrect_step_up).min(self.config.max_contrast)
        };
        self.current
    }

    /// Contrasts presented so far, in order
    pub fn presented(&self) -> &[f64] {
        &self.presented
    }

    pub fn is_complete(&self) -> bool {
        self.presented.len() >= self.config.trials_per_cone
    }

    /// Start over for the next cone channel
    pub fn reset(&mut self) {
        self.current = self.config.initial_contrast;
        self.presented.clear();
    }

    /// Estimate the threshold from the sequence presented so far
    pub fn estimate(&self) -> Result<ThresholdResult> {
        estimate_threshold_from_reversals(
            &self.presented,
            self.config.last_n_reversals,
            self.config.discard_first_reversals,
        )
    }
}
