//! Fixed-level threshold bracketing
//!
//! For procedures that show each of a small set of contrast levels once.
//! The threshold is bracketed between the highest level answered wrong and
//! the lowest level answered right. This is a simplified estimator, not a
//! psychometric-function fit: one lapse at a high level moves the bracket.

use log::debug;

use crate::{CvdError, Result};

/// Estimate a threshold from single responses at fixed contrast levels
///
/// # Arguments
///
/// * `levels` - Contrast levels tested (percent), e.g. `[1, 5, 10, 25, 50, 100]`
/// * `responses` - Whether each level was answered correctly
///
/// # Returns
///
/// - All correct: half the lowest level (threshold is below the range)
/// - All incorrect: the highest level (threshold is at or above the range)
/// - Otherwise: geometric mean of highest incorrect and lowest correct
///
/// # Errors
///
/// Returns [`CvdError::InvalidParameter`] if the slices are empty or differ
/// in length
pub fn estimate_threshold_from_fixed_levels(levels: &[f64], responses: &[bool]) -> Result<f64> {
    if levels.len() != responses.len() {
        return Err(CvdError::invalid_parameter(
            "responses",
            format!("{} responses for {} levels", responses.len(), levels.len()),
        ));
    }
    if levels.is_empty() {
        return Err(CvdError::invalid_parameter("levels", "empty"));
    }

    let mut highest_incorrect: Option<f64> = None;
    let mut lowest_correct: Option<f64> = None;

    for (&level, &correct) in levels.iter().zip(responses) {
        if correct {
            lowest_correct = Some(lowest_correct.map_or(level, |l| l.min(level)));
        } else {
            highest_incorrect = Some(highest_incorrect.map_or(level, |h| h.max(level)));
        }
    }

    let threshold = match (highest_incorrect, lowest_correct) {
        (None, _) => levels.iter().copied().fold(f64::INFINITY, f64::min) / 2.0,
        (Some(_), None) => levels.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        (Some(miss), Some(hit)) => (miss * hit).sqrt(),
    };

    debug!(
        "fixed levels: highest incorrect {:?}, lowest correct {:?}, threshold {:.3}",
        highest_incorrect, lowest_correct, threshold
    );

    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fixed_level::DEFAULT_LEVELS;
    use approx::assert_relative_eq;

    #[test]
    fn test_all_correct_halves_lowest_level() {
        let t = estimate_threshold_from_fixed_levels(&DEFAULT_LEVELS, &[true; 6]).unwrap();
        assert_relative_eq!(t, 0.5);
    }

    #[test]
    fn test_all_correct_unsorted_levels() {
        let t = estimate_threshold_from_fixed_levels(&[25.0, 5.0, 50.0], &[true; 3]).unwrap();
        assert_relative_eq!(t, 2.5);
    }

    #[test]
    fn test_all_incorrect_is_max_level() {
        let t = estimate_threshold_from_fixed_levels(&DEFAULT_LEVELS, &[false; 6]).unwrap();
        assert_relative_eq!(t, 100.0);
    }

    #[test]
    fn test_mixed_is_geometric_mean() {
        let responses = [false, false, false, true, true, true];
        let t = estimate_threshold_from_fixed_levels(&DEFAULT_LEVELS, &responses).unwrap();
        assert_relative_eq!(t, (10.0_f64 * 25.0).sqrt());
        assert!((t - 15.81).abs() < 0.01);
    }

    #[test]
    fn test_correct_only_at_top_level() {
        let responses = [false, false, false, false, false, true];
        let t = estimate_threshold_from_fixed_levels(&DEFAULT_LEVELS, &responses).unwrap();
        assert_relative_eq!(t, (50.0_f64 * 100.0).sqrt());
    }

    #[test]
    fn test_length_mismatch() {
        let err = estimate_threshold_from_fixed_levels(&DEFAULT_LEVELS, &[true; 3]).unwrap_err();
        assert!(matches!(err, CvdError::InvalidParameter { .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(estimate_threshold_from_fixed_levels(&[], &[]).is_err());
    }
}
