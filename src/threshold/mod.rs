//! Cone contrast threshold estimation
//!
//! Two interchangeable strategies turn a channel's trials into a threshold:
//! reversal averaging for adaptive staircases and bracketing for fixed-level
//! runs. Derived statistics (log sensitivity, score, category) are shared.

pub mod staircase;
pub mod fixed_level;
pub mod metrics;

pub use fixed_level::estimate_threshold_from_fixed_levels;
pub use metrics::{
    categorize, log_sensitivity, score, Category, ChannelMetrics, ConeTestResult, ThresholdMethod,
};
pub use staircase::{
    estimate_threshold_from_reversals, find_reversals, ReversalPoint, StaircaseController,
    ThresholdResult,
};
