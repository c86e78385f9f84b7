//! Deficiency classification
//!
//! Turns the three channel thresholds into a single deficiency profile:
//! which confusion axis to correct for, and how strongly.
//!
//! - Each channel's deficiency value is its threshold above the 7% normal
//!   baseline, uncapped so the worst channel always wins.
//! - Severity normalizes that value by 40 points and saturates at 1.
//! - A self-reported axis always wins over the measured one.
//! - Otherwise the largest value wins, ties resolving protan > deutan > tritan.
//! - Secondary axes within the closeness threshold add a small weighted
//!   contribution to severity without changing the axis.
//!
//! Algorithm tag: `algo-axis-blend-classification`

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ClassificationConfig;
use crate::threshold::{Category, ConeTestResult};
use crate::trial::ConeChannel;

/// Confusion axis of a cone deficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeficiencyAxis {
    /// L-cone (red) weakness
    Protan,
    /// M-cone (green) weakness
    Deutan,
    /// S-cone (blue) weakness
    Tritan,
}

impl DeficiencyAxis {
    /// All axes in tie-break priority order
    pub const ALL: [DeficiencyAxis; 3] = [
        DeficiencyAxis::Protan,
        DeficiencyAxis::Deutan,
        DeficiencyAxis::Tritan,
    ];

    pub fn channel(&self) -> ConeChannel {
        match self {
            DeficiencyAxis::Protan => ConeChannel::L,
            DeficiencyAxis::Deutan => ConeChannel::M,
            DeficiencyAxis::Tritan => ConeChannel::S,
        }
    }

    pub fn from_channel(channel: ConeChannel) -> Self {
        match channel {
            ConeChannel::L => DeficiencyAxis::Protan,
            ConeChannel::M => DeficiencyAxis::Deutan,
            ConeChannel::S => DeficiencyAxis::Tritan,
        }
    }

    /// Parse a questionnaire answer
    ///
    /// Accepts the questionnaire's `protanopia`/`deuteranopia`/`tritanopia`
    /// as well as the short axis names and cone colors. `none`, `unknown`
    /// and anything unrecognized mean no declared axis.
    pub fn from_self_report(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "protan" | "protanopia" | "protanomaly" | "red" | "l" => Some(DeficiencyAxis::Protan),
            "deutan" | "deuteranopia" | "deuteranomaly" | "green" | "m" => {
                Some(DeficiencyAxis::Deutan)
            }
            "tritan" | "tritanopia" | "tritanomaly" | "blue" | "s" => Some(DeficiencyAxis::Tritan),
            _ => None,
        }
    }
}

impl fmt::Display for DeficiencyAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeficiencyAxis::Protan => write!(f, "protan"),
            DeficiencyAxis::Deutan => write!(f, "deutan"),
            DeficiencyAxis::Tritan => write!(f, "tritan"),
        }
    }
}

/// Summary of the measured vision type, as shown to the participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionType {
    Normal,
    Protan,
    Deutan,
    Tritan,
}

impl VisionType {
    pub fn axis(&self) -> Option<DeficiencyAxis> {
        match self {
            VisionType::Normal => None,
            VisionType::Protan => Some(DeficiencyAxis::Protan),
            VisionType::Deutan => Some(DeficiencyAxis::Deutan),
            VisionType::Tritan => Some(DeficiencyAxis::Tritan),
        }
    }
}

impl From<DeficiencyAxis> for VisionType {
    fn from(axis: DeficiencyAxis) -> Self {
        match axis {
            DeficiencyAxis::Protan => VisionType::Protan,
            DeficiencyAxis::Deutan => VisionType::Deutan,
            DeficiencyAxis::Tritan => VisionType::Tritan,
        }
    }
}

/// Deficiency values per axis (points above baseline)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisScores {
    pub protan: f64,
    pub deutan: f64,
    pub tritan: f64,
}

impl AxisScores {
    pub fn get(&self, axis: DeficiencyAxis) -> f64 {
        match axis {
            DeficiencyAxis::Protan => self.protan,
            DeficiencyAxis::Deutan => self.deutan,
            DeficiencyAxis::Tritan => self.tritan,
        }
    }

    /// Axis with the largest value; ties go to the earlier axis in
    /// [`DeficiencyAxis::ALL`]
    pub fn worst_axis(&self) -> DeficiencyAxis {
        let mut worst = DeficiencyAxis::Protan;
        for axis in DeficiencyAxis::ALL {
            if self.get(axis) > self.get(worst) {
                worst = axis;
            }
        }
        worst
    }
}

/// Outcome of classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeficiencyProfile {
    /// Axis the correction targets
    pub axis: DeficiencyAxis,
    /// Normalized severity in [0, 1]
    pub severity: f64,
    /// Self-reported axis, if any
    pub declared: Option<DeficiencyAxis>,
    /// Axis with the poorest measured threshold
    pub detected: DeficiencyAxis,
    /// Per-axis deficiency values the profile was built from
    pub scores: AxisScores,
    /// Channel thresholds in percent (L, M, S)
    pub thresholds: [f64; 3],
}

impl DeficiencyProfile {
    /// Severity back on the 0-40 deficiency scale
    pub fn deficiency_points(&self, config: &ClassificationConfig) -> f64 {
        self.severity * config.max_deficiency
    }

    /// Whether the self-report disagrees with the measurement
    pub fn declared_differs(&self) -> bool {
        self.declared.is_some_and(|declared| declared != self.detected)
    }
}

/// Declared versus measured deficiency, for the retest prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisComparison {
    pub declared: Option<DeficiencyAxis>,
    pub detected: VisionType,
    /// Self-report names an axis the measurement does not support
    pub mismatch: bool,
}

/// Classifier from channel thresholds to a deficiency profile
#[derive(Debug, Clone, Default)]
pub struct DeficiencyProfiler {
    config: ClassificationConfig,
}

impl DeficiencyProfiler {
    /// Create a profiler with default classification parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profiler with custom parameters
    pub fn with_config(config: ClassificationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Deficiency value of a threshold: points above baseline, never negative
    pub fn deficiency_value(&self, threshold_percent: f64) -> f64 {
        (threshold_percent - self.config.baseline_threshold).max(0.0)
    }

    /// Deficiency values for all three channels
    pub fn axis_scores(&self, result: &ConeTestResult) -> AxisScores {
        AxisScores {
            protan: self.deficiency_value(result.l.threshold),
            deutan: self.deficiency_value(result.m.threshold),
            tritan: self.deficiency_value(result.s.threshold),
        }
    }

    /// Classify a cone test result
    ///
    /// # Arguments
    ///
    /// * `result` - Metrics for the L, M and S channels
    /// * `declared` - Self-reported axis, which overrides detection
    ///
    /// # Returns
    ///
    /// Profile with severity in [0, 1]
    pub fn classify(
        &self,
        result: &ConeTestResult,
        declared: Option<DeficiencyAxis>,
    ) -> DeficiencyProfile {
        let scores = self.axis_scores(result);
        let detected = scores.worst_axis();
        let axis = declared.unwrap_or(detected);
        let severity = self.severity(&scores, axis);

        if let Some(declared) = declared {
            if declared != detected {
                info!("declared axis {} overrides measured {}", declared, detected);
            }
        }
        debug!(
            "classified {} (protan {:.2}, deutan {:.2}, tritan {:.2}) severity {:.3}",
            axis, scores.protan, scores.deutan, scores.tritan, severity
        );

        DeficiencyProfile {
            axis,
            severity,
            declared,
            detected,
            scores,
            thresholds: [result.l.threshold, result.m.threshold, result.s.threshold],
        }
    }

    /// Severity of `axis`, with close secondary axes blended in
    pub fn severity(&self, scores: &AxisScores, axis: DeficiencyAxis) -> f64 {
        let max = self.config.max_deficiency;
        let closeness = self.config.closeness_threshold;
        let primary = scores.get(axis);

        let blended: f64 = DeficiencyAxis::ALL
            .iter()
            .filter(|&&other| other != axis)
            .map(|&other| {
                let value = scores.get(other);
                let diff = (primary - value).abs();
                if diff < closeness {
                    (value / max).min(1.0) * (1.0 - diff / closeness) * self.config.blend_weight
                } else {
                    0.0
                }
            })
            .sum();

        ((primary / max).min(1.0) + blended).clamp(0.0, 1.0)
    }

    /// Measured vision type as reported to the participant
    ///
    /// A channel is named only when it is outside the Normal category and
    /// its threshold is strictly worse than both others.
    pub fn detect_vision_type(&self, result: &ConeTestResult) -> VisionType {
        let channels = [
            (VisionType::Protan, &result.l, [&result.m, &result.s]),
            (VisionType::Deutan, &result.m, [&result.l, &result.s]),
            (VisionType::Tritan, &result.s, [&result.l, &result.m]),
        ];

        channels
            .iter()
            .find(|(_, own, others)| {
                own.category != Category::Normal
                    && others.iter().all(|o| own.threshold > o.threshold)
            })
            .map(|(vision, _, _)| *vision)
            .unwrap_or(VisionType::Normal)
    }

    /// Compare a self-report against the measurement
    pub fn compare_declared(
        &self,
        declared: Option<DeficiencyAxis>,
        result: &ConeTestResult,
    ) -> AxisComparison {
        let detected = self.detect_vision_type(result);
        let mismatch = match declared {
            Some(axis) => detected.axis() != Some(axis),
            None => false,
        };
        AxisComparison {
            declared,
            detected,
            mismatch,
        }
    }
}

/// Classify with the default classification parameters
pub fn classify_deficiency(
    result: &ConeTestResult,
    declared: Option<DeficiencyAxis>,
) -> DeficiencyProfile {
    DeficiencyProfiler::new().classify(result, declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::threshold::ChannelMetrics;
    use approx::assert_relative_eq;

    fn result(l: f64, m: f64, s: f64) -> ConeTestResult {
        let scoring = ScoringConfig::default();
        let metrics = |t| ChannelMetrics::from_threshold(t, 0.0, 20, 1.0, &scoring);
        ConeTestResult::new(metrics(l), metrics(m), metrics(s))
    }

    #[test]
    fn test_deficiency_value() {
        let p = DeficiencyProfiler::new();
        assert_eq!(p.deficiency_value(3.0), 0.0);
        assert_eq!(p.deficiency_value(17.0), 10.0);
        assert_eq!(p.deficiency_value(100.0), 93.0);
    }

    #[test]
    fn test_worst_channel_wins_beyond_severity_cap() {
        let r = result(50.0, 90.0, 5.0);
        let profile = classify_deficiency(&r, None);
        assert_eq!(profile.axis, DeficiencyAxis::Deutan);
        assert_eq!(profile.detected, DeficiencyAxis::Deutan);
        assert_eq!(profile.severity, 1.0);
        assert_eq!(DeficiencyProfiler::new().detect_vision_type(&r), VisionType::Deutan);
    }

    #[test]
    fn test_high_axes_blend_on_raw_distance() {
        // Declared protan at 38 points, deutan at 43: 5 apart, no blend
        let profile = classify_deficiency(&result(45.0, 50.0, 5.0), Some(DeficiencyAxis::Protan));
        assert_relative_eq!(profile.severity, 38.0 / 40.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_zero_resolves_to_protan() {
        for _ in 0..5 {
            let profile = classify_deficiency(&result(5.0, 5.0, 5.0), None);
            assert_eq!(profile.axis, DeficiencyAxis::Protan);
            assert_eq!(profile.severity, 0.0);
        }
    }

    #[test]
    fn test_tie_prefers_deutan_over_tritan() {
        let profile = classify_deficiency(&result(5.0, 27.0, 27.0), None);
        assert_eq!(profile.axis, DeficiencyAxis::Deutan);
    }

    #[test]
    fn test_worst_channel_wins() {
        let profile = classify_deficiency(&result(8.0, 9.0, 30.0), None);
        assert_eq!(profile.axis, DeficiencyAxis::Tritan);
        assert_relative_eq!(profile.severity, 23.0 / 40.0);
    }

    #[test]
    fn test_declared_axis_overrides_measurement() {
        let profile = classify_deficiency(&result(30.0, 5.0, 12.0), Some(DeficiencyAxis::Tritan));
        assert_eq!(profile.axis, DeficiencyAxis::Tritan);
        assert_eq!(profile.detected, DeficiencyAxis::Protan);
        assert!(profile.declared_differs());
        // Severity from the tritan channel's own value: 12 - 7 = 5
        assert_relative_eq!(profile.severity, 5.0 / 40.0);
    }

    #[test]
    fn test_close_axes_blend_into_severity() {
        // protan 20, deutan 18: diff 2 → weight 0.5
        let profile = classify_deficiency(&result(27.0, 25.0, 5.0), None);
        assert_eq!(profile.axis, DeficiencyAxis::Protan);
        let expected = 20.0 / 40.0 + (18.0 / 40.0) * 0.5 * 0.15;
        assert_relative_eq!(profile.severity, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_distant_axes_do_not_blend() {
        let profile = classify_deficiency(&result(27.0, 20.0, 5.0), None);
        assert_relative_eq!(profile.severity, 0.5);
    }

    #[test]
    fn test_severity_capped_at_one() {
        let profile = classify_deficiency(&result(100.0, 100.0, 100.0), None);
        assert_eq!(profile.axis, DeficiencyAxis::Protan);
        assert_eq!(profile.severity, 1.0);
    }

    #[test]
    fn test_severity_monotonic_in_deficiency() {
        let mut previous = -1.0;
        for t in 0..60 {
            let profile = classify_deficiency(&result(t as f64, 5.0, 5.0), Some(DeficiencyAxis::Protan));
            assert!(profile.severity >= previous);
            assert!((0.0..=1.0).contains(&profile.severity));
            previous = profile.severity;
        }
    }

    #[test]
    fn test_self_report_parsing() {
        assert_eq!(DeficiencyAxis::from_self_report("protanopia"), Some(DeficiencyAxis::Protan));
        assert_eq!(DeficiencyAxis::from_self_report("Deuteranopia"), Some(DeficiencyAxis::Deutan));
        assert_eq!(DeficiencyAxis::from_self_report("tritan"), Some(DeficiencyAxis::Tritan));
        assert_eq!(DeficiencyAxis::from_self_report("unknown"), None);
        assert_eq!(DeficiencyAxis::from_self_report("none"), None);
    }

    #[test]
    fn test_detect_vision_type() {
        let p = DeficiencyProfiler::new();
        assert_eq!(p.detect_vision_type(&result(30.0, 5.0, 5.0)), VisionType::Protan);
        assert_eq!(p.detect_vision_type(&result(5.0, 5.0, 5.0)), VisionType::Normal);
        // Worst channel still Normal category
        assert_eq!(p.detect_vision_type(&result(4.0, 5.0, 3.0)), VisionType::Normal);
        // Tie between two abnormal channels names neither
        assert_eq!(p.detect_vision_type(&result(30.0, 30.0, 5.0)), VisionType::Normal);
    }

    #[test]
    fn test_compare_declared() {
        let p = DeficiencyProfiler::new();
        let measured = result(5.0, 30.0, 5.0);

        let agree = p.compare_declared(Some(DeficiencyAxis::Deutan), &measured);
        assert!(!agree.mismatch);

        let disagree = p.compare_declared(Some(DeficiencyAxis::Protan), &measured);
        assert!(disagree.mismatch);
        assert_eq!(disagree.detected, VisionType::Deutan);

        let undeclared = p.compare_declared(None, &measured);
        assert!(!undeclared.mismatch);
    }
}
