//! Error types for the cone_adapt library

use thiserror::Error;

/// Result type alias for cone_adapt operations
pub type Result<T> = std::result::Result<T, CvdError>;

/// Error types for threshold estimation, classification and configuration
///
/// The filter render path never produces these: `apply_*` functions fail open
/// and hand back their input instead.
#[derive(Error, Debug)]
pub enum CvdError {
    /// Hex color string could not be parsed
    #[error("Invalid color '{input}': {reason}")]
    FormatError { input: String, reason: String },

    /// Staircase sequence is too short or monotonic to contain a reversal
    #[error("No reversals detected in {samples} contrast samples")]
    NoReversals { samples: usize },

    /// Reversals exist but none remain after discarding warm-up reversals
    #[error("Not enough reversals to compute threshold: found {found}, discarded {discarded}")]
    InsufficientReversals { found: usize, discarded: usize },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Configuration file could not be read or written
    #[error("Configuration I/O error: {message}")]
    ConfigIo {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be (de)serialized
    #[error("Configuration format error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CvdError {
    /// Create a hex format error
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FormatError {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create a configuration I/O error with context
    pub fn config_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration parse error with context
    pub fn config_parse(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source,
        }
    }

    /// Check if this error indicates a recoverable condition
    ///
    /// Insufficient-data conditions are expected outcomes of a short or
    /// noisy test run; the caller should offer a retest.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CvdError::NoReversals { .. } | CvdError::InsufficientReversals { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            CvdError::NoReversals { .. } | CvdError::InsufficientReversals { .. } => {
                "Not enough responses to estimate your threshold. Please repeat the test.".to_string()
            }
            CvdError::FormatError { input, .. } => {
                format!("'{}' is not a valid color. Use #rgb or #rrggbb.", input)
            }
            CvdError::ConfigIo { .. } | CvdError::ConfigParse { .. } => {
                "Could not read or write the study configuration.".to_string()
            }
            _ => "Analysis failed. Please check the test data and try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_is_recoverable() {
        assert!(CvdError::NoReversals { samples: 2 }.is_recoverable());
        assert!(CvdError::InsufficientReversals { found: 1, discarded: 1 }.is_recoverable());
        assert!(!CvdError::format("#zz", "bad digit").is_recoverable());
        assert!(!CvdError::invalid_parameter("levels", 0).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = CvdError::InsufficientReversals { found: 1, discarded: 1 };
        assert_eq!(
            err.to_string(),
            "Not enough reversals to compute threshold: found 1, discarded 1"
        );

        let err = CvdError::format("#12", "expected 3 or 6 hex digits");
        assert!(err.to_string().contains("#12"));
    }

    #[test]
    fn test_user_message_prompts_retest() {
        let msg = CvdError::NoReversals { samples: 0 }.user_message();
        assert!(msg.contains("repeat"));
    }
}
