//! One study run as an explicit value
//!
//! [`SessionContext`] carries everything a run produces: the self-reported
//! axis, the cone test metrics, the resulting profile and filter, and the
//! per-task performance log. Callers pass it around instead of sharing
//! global state.
//!
//! Task statistics follow the results screen: per task and filter the mean
//! time, summed swipes and clicks, and accuracy as a percentage.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::color::{ensure_min_contrast, Color};
use crate::config::StudyConfig;
use crate::filter::{build_filter_parameters_with, ActiveFilter, FilterKind, FilterParameters, OsPreset};
use crate::profile::{AxisComparison, DeficiencyAxis, DeficiencyProfile, DeficiencyProfiler};
use crate::threshold::{ConeTestResult, ThresholdMethod};
use crate::trial::Trial;
use crate::Result;

/// Outcome of one task attempt under one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPerformance {
    pub task_id: String,
    pub filter: FilterKind,
    pub time_ms: u64,
    pub swipes: u32,
    pub clicks: u32,
    /// Fraction of the task done right, in [0, 1]
    pub accuracy: f32,
}

impl TaskPerformance {
    /// Create a record; accuracy is clamped to [0, 1] and NaN counts as 0
    pub fn new(
        task_id: impl Into<String>,
        filter: FilterKind,
        time_ms: u64,
        swipes: u32,
        clicks: u32,
        accuracy: f32,
    ) -> Self {
        let accuracy = if accuracy.is_nan() {
            0.0
        } else {
            accuracy.clamp(0.0, 1.0)
        };
        Self {
            task_id: task_id.into(),
            filter,
            time_ms,
            swipes,
            clicks,
            accuracy,
        }
    }

    /// Record for a pass/fail task
    pub fn from_outcome(
        task_id: impl Into<String>,
        filter: FilterKind,
        time_ms: u64,
        swipes: u32,
        clicks: u32,
        correct: bool,
    ) -> Self {
        let accuracy = if correct { 1.0 } else { 0.0 };
        Self::new(task_id, filter, time_ms, swipes, clicks, accuracy)
    }

    pub fn is_correct(&self) -> bool {
        self.accuracy >= 1.0
    }
}

/// Aggregate of all attempts at one task under one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub task_id: String,
    pub filter: FilterKind,
    pub count: usize,
    pub avg_time_ms: f64,
    pub total_swipes: u64,
    pub total_clicks: u64,
    /// Mean accuracy as a percentage
    pub accuracy_percent: f64,
}

impl TaskStats {
    /// Aggregate matching records, `None` when there are none
    pub fn aggregate(
        performances: &[TaskPerformance],
        task_id: &str,
        filter: FilterKind,
    ) -> Option<Self> {
        let matching: Vec<&TaskPerformance> = performances
            .iter()
            .filter(|p| p.task_id == task_id && p.filter == filter)
            .collect();
        if matching.is_empty() {
            return None;
        }

        let count = matching.len();
        let total_time: u64 = matching.iter().map(|p| p.time_ms).sum();
        let accuracy_sum: f64 = matching.iter().map(|p| p.accuracy as f64).sum();

        Some(Self {
            task_id: task_id.to_string(),
            filter,
            count,
            avg_time_ms: total_time as f64 / count as f64,
            total_swipes: matching.iter().map(|p| p.swipes as u64).sum(),
            total_clicks: matching.iter().map(|p| p.clicks as u64).sum(),
            accuracy_percent: accuracy_sum / count as f64 * 100.0,
        })
    }
}

/// Summed effort for one side of the custom-versus-preset comparison
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionTotals {
    /// Sum of the per-task mean times
    pub time_ms: f64,
    pub swipes: u64,
    pub clicks: u64,
}

impl ConditionTotals {
    fn add(&mut self, stats: &TaskStats) {
        self.time_ms += stats.avg_time_ms;
        self.swipes += stats.total_swipes;
        self.clicks += stats.total_clicks;
    }
}

/// Custom filter versus one preset, summed over every task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterComparison {
    pub preset: FilterKind,
    pub custom: ConditionTotals,
    pub baseline: ConditionTotals,
}

impl FilterComparison {
    /// Whether the custom filter took less total time than the preset
    pub fn custom_is_faster(&self) -> bool {
        self.custom.time_ms < self.baseline.time_ms
    }
}

/// State of one study run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionContext {
    config: StudyConfig,
    declared: Option<DeficiencyAxis>,
    cone_result: Option<ConeTestResult>,
    profile: Option<DeficiencyProfile>,
    filter: Option<FilterParameters>,
    tasks: Vec<TaskPerformance>,
}

impl SessionContext {
    /// Create an empty session with the given configuration
    pub fn new(config: StudyConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Store the questionnaire answer
    ///
    /// Unrecognized answers (including "none" and "unknown") clear the
    /// declared axis.
    pub fn declare(&mut self, answer: &str) -> Option<DeficiencyAxis> {
        self.declared = DeficiencyAxis::from_self_report(answer);
        self.declared
    }

    pub fn declared(&self) -> Option<DeficiencyAxis> {
        self.declared
    }

    /// Store cone test metrics, then classify and build the custom filter
    ///
    /// Calling this again is a retest: the new result replaces the previous
    /// metrics, profile and filter together, and a warning is logged. Task
    /// records already collected are kept.
    pub fn record_cone_test(&mut self, result: ConeTestResult) -> &DeficiencyProfile {
        if let Some(previous) = &self.profile {
            warn!(
                "retest replaces profile {} severity {:.3}",
                previous.axis, previous.severity
            );
        }

        let profiler = DeficiencyProfiler::with_config(self.config.classification.clone());
        let profile = profiler.classify(&result, self.declared);

        let comparison = profiler.compare_declared(self.declared, &result);
        if comparison.mismatch {
            warn!(
                "declared {:?} but measured {:?}; a retest may be warranted",
                comparison.declared, comparison.detected
            );
        }
        info!(
            "cone test: L {:.2}% M {:.2}% S {:.2}% -> {} severity {:.3}",
            result.l.threshold, result.m.threshold, result.s.threshold, profile.axis, profile.severity
        );

        self.filter = Some(build_filter_parameters_with(&profile, &self.config));
        self.cone_result = Some(result);
        self.profile.insert(profile)
    }

    /// Estimate metrics from raw trials, then proceed as [`Self::record_cone_test`]
    ///
    /// # Errors
    ///
    /// Propagates estimator errors; the session is unchanged on error
    pub fn record_cone_trials(
        &mut self,
        trials: &[Trial],
        method: ThresholdMethod,
    ) -> Result<&DeficiencyProfile> {
        let result = ConeTestResult::from_trials(trials, method, &self.config.scoring)?;
        Ok(self.record_cone_test(result))
    }

    pub fn cone_result(&self) -> Option<&ConeTestResult> {
        self.cone_result.as_ref()
    }

    pub fn profile(&self) -> Option<&DeficiencyProfile> {
        self.profile.as_ref()
    }

    pub fn filter_parameters(&self) -> Option<&FilterParameters> {
        self.filter.as_ref()
    }

    /// Declared versus measured axis, once a cone test is recorded
    pub fn axis_comparison(&self) -> Option<AxisComparison> {
        let result = self.cone_result.as_ref()?;
        let profiler = DeficiencyProfiler::with_config(self.config.classification.clone());
        Some(profiler.compare_declared(self.declared, result))
    }

    /// Preset matching the measured vision type
    pub fn recommended_preset(&self) -> Option<OsPreset> {
        self.axis_comparison()
            .map(|comparison| OsPreset::recommended_for(comparison.detected))
    }

    /// Filter to render a task with
    ///
    /// `Custom` is only available after a cone test; presets use the
    /// configured default intensity.
    pub fn active_filter(&self, kind: FilterKind) -> Option<ActiveFilter> {
        match kind.preset() {
            Some(preset) => Some(ActiveFilter::Preset {
                preset,
                intensity: self.config.filter.preset_intensity,
            }),
            None => self.filter.clone().map(ActiveFilter::Custom),
        }
    }

    /// Text color adjusted to stay readable over a filtered background
    pub fn readable_text(&self, text: Color, background: Color) -> Color {
        ensure_min_contrast(text, background, self.config.filter.min_text_contrast)
    }

    pub fn record_task(&mut self, performance: TaskPerformance) {
        self.tasks.push(performance);
    }

    pub fn tasks(&self) -> &[TaskPerformance] {
        &self.tasks
    }

    pub fn task_stats(&self, task_id: &str, filter: FilterKind) -> Option<TaskStats> {
        TaskStats::aggregate(&self.tasks, task_id, filter)
    }

    /// Distinct task ids in first-recorded order
    pub fn task_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !ids.contains(&task.task_id.as_str()) {
                ids.push(&task.task_id);
            }
        }
        ids
    }

    /// Sum per-task stats for the custom filter and one preset
    pub fn compare_with(&self, preset: OsPreset) -> FilterComparison {
        let baseline_kind = FilterKind::from(preset);
        let mut comparison = FilterComparison {
            preset: baseline_kind,
            custom: ConditionTotals::default(),
            baseline: ConditionTotals::default(),
        };
        for task_id in self.task_ids() {
            if let Some(stats) = self.task_stats(task_id, FilterKind::Custom) {
                comparison.custom.add(&stats);
            }
            if let Some(stats) = self.task_stats(task_id, baseline_kind) {
                comparison.baseline.add(&stats);
            }
        }
        comparison
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ChannelMetrics;
    use approx::assert_relative_eq;

    fn cone_result(l: f64, m: f64, s: f64) -> ConeTestResult {
        let scoring = crate::config::ScoringConfig::default();
        let metrics = |t| ChannelMetrics::from_threshold(t, 0.0, 20, 1.0, &scoring);
        ConeTestResult::new(metrics(l), metrics(m), metrics(s))
    }

    #[test]
    fn test_accuracy_is_clamped() {
        let p = TaskPerformance::new("tile-1", FilterKind::Custom, 1000, 3, 2, 1.7);
        assert_eq!(p.accuracy, 1.0);
        let p = TaskPerformance::new("tile-1", FilterKind::Custom, 1000, 3, 2, f32::NAN);
        assert_eq!(p.accuracy, 0.0);
        assert!(TaskPerformance::from_outcome("t", FilterKind::Custom, 0, 0, 0, true).is_correct());
    }

    #[test]
    fn test_task_stats_aggregate() {
        let records = vec![
            TaskPerformance::from_outcome("tile-1", FilterKind::Custom, 1000, 4, 2, true),
            TaskPerformance::from_outcome("tile-1", FilterKind::Custom, 3000, 6, 0, false),
            TaskPerformance::new("tile-1", FilterKind::Grayscale, 500, 1, 1, 0.75),
        ];
        let stats = TaskStats::aggregate(&records, "tile-1", FilterKind::Custom).unwrap();
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.avg_time_ms, 2000.0);
        assert_eq!(stats.total_swipes, 10);
        assert_eq!(stats.total_clicks, 2);
        assert_relative_eq!(stats.accuracy_percent, 50.0);

        let gray = TaskStats::aggregate(&records, "tile-1", FilterKind::Grayscale).unwrap();
        assert_relative_eq!(gray.accuracy_percent, 75.0);
        assert!(TaskStats::aggregate(&records, "card-match", FilterKind::Custom).is_none());
    }

    #[test]
    fn test_record_cone_test_builds_filter() {
        let mut session = SessionContext::new(StudyConfig::default());
        assert!(session.active_filter(FilterKind::Custom).is_none());

        let profile = session.record_cone_test(cone_result(27.0, 5.0, 5.0)).clone();
        assert_eq!(profile.axis, DeficiencyAxis::Protan);
        assert_relative_eq!(profile.severity, 0.5);

        let params = session.filter_parameters().unwrap();
        assert_relative_eq!(params.hue_shift.red, 12.0);
        assert_eq!(session.active_filter(FilterKind::Custom).unwrap().kind(), FilterKind::Custom);
        assert_eq!(session.recommended_preset(), Some(OsPreset::Protanopia));
    }

    #[test]
    fn test_retest_replaces_profile_and_filter() {
        let mut session = SessionContext::default();
        session.record_cone_test(cone_result(27.0, 5.0, 5.0));
        session.record_task(TaskPerformance::from_outcome("tile-1", FilterKind::Custom, 900, 1, 1, true));

        let profile = session.record_cone_test(cone_result(5.0, 5.0, 27.0)).clone();
        assert_eq!(profile.axis, DeficiencyAxis::Tritan);
        assert_eq!(session.profile(), Some(&profile));
        assert_eq!(session.filter_parameters().unwrap().axis, crate::filter::Primary::Blue);
        assert_eq!(session.cone_result().unwrap().s.threshold, 27.0);
        assert_eq!(session.tasks().len(), 1);
    }

    #[test]
    fn test_declared_mismatch_reported() {
        let mut session = SessionContext::new(StudyConfig::default());
        assert_eq!(session.declare("Tritanopia"), Some(DeficiencyAxis::Tritan));
        session.record_cone_test(cone_result(30.0, 5.0, 5.0));

        let profile = session.profile().unwrap();
        assert_eq!(profile.axis, DeficiencyAxis::Tritan);
        assert_eq!(profile.detected, DeficiencyAxis::Protan);

        let comparison = session.axis_comparison().unwrap();
        assert!(comparison.mismatch);
    }

    #[test]
    fn test_declare_unknown_clears() {
        let mut session = SessionContext::default();
        session.declare("deutan");
        assert_eq!(session.declare("unknown"), None);
        assert_eq!(session.declared(), None);
    }

    #[test]
    fn test_preset_filter_uses_config_intensity() {
        let mut config = StudyConfig::default();
        config.filter.preset_intensity = 0.5;
        let session = SessionContext::new(config);
        match session.active_filter(FilterKind::Grayscale) {
            Some(ActiveFilter::Preset { preset, intensity }) => {
                assert_eq!(preset, OsPreset::Grayscale);
                assert_eq!(intensity, 0.5);
            }
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn test_readable_text_meets_configured_contrast() {
        let session = SessionContext::default();
        let background = ActiveFilter::Preset {
            preset: OsPreset::Grayscale,
            intensity: 1.0,
        }
        .apply(Color::new(40, 90, 200));
        let text = session.readable_text(Color::new(120, 120, 120), background);
        assert!(crate::color::contrast_ratio(text, background) >= 4.5);
    }

    #[test]
    fn test_compare_with_preset() {
        let mut session = SessionContext::default();
        session.record_task(TaskPerformance::from_outcome("tile-1", FilterKind::Custom, 1000, 2, 1, true));
        session.record_task(TaskPerformance::from_outcome("tile-1", FilterKind::Protanopia, 2000, 5, 3, true));
        session.record_task(TaskPerformance::from_outcome("card-match", FilterKind::Custom, 4000, 0, 8, true));
        session.record_task(TaskPerformance::from_outcome("card-match", FilterKind::Protanopia, 3000, 0, 6, false));

        assert_eq!(session.task_ids(), vec!["tile-1", "card-match"]);

        let comparison = session.compare_with(OsPreset::Protanopia);
        assert_relative_eq!(comparison.custom.time_ms, 5000.0);
        assert_relative_eq!(comparison.baseline.time_ms, 5000.0);
        assert_eq!(comparison.custom.clicks, 9);
        assert_eq!(comparison.baseline.swipes, 5);
        assert!(!comparison.custom_is_faster());
    }

    #[test]
    fn test_session_serializes() {
        let mut session = SessionContext::default();
        session.record_cone_test(cone_result(5.0, 20.0, 5.0));
        let json = serde_json::to_string(&session).unwrap();
        let back: SessionContext = serde_json::from_str(&json).unwrap();
        assert_eq!(session, back);
    }
}
