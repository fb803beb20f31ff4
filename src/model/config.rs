use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::grades::{Grade, GradeStrategy};
use crate::model::metric::DisplayMetric;
use crate::model::profile::AccuracyVariant;
use crate::pipeline::stage6_topk::DEFAULT_TOP_K;
use crate::pipeline::stage7_consistency::DEFAULT_TOLERANCE;

/// When the normalizer may divide by 100 instead of min-max scaling.
///
/// The older reports took the fast path for any series bounded by [0, 100],
/// which scales a per-90 column like Goals per 90 by 1/100 and flattens it.
/// `PercentageMetricsOnly` min-max scales such columns and is the default;
/// `AnyBoundedSeries` is kept only to reproduce the older reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageFastPath {
    /// Only fields whose name marks them as percentages.
    PercentageMetricsOnly,
    /// Any series whose values all lie within [0, 100].
    AnyBoundedSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortlistThresholds {
    pub min_minutes_share: f64,
    pub min_conference_grade: Grade,
    pub min_power_five_grade: Grade,
}

impl Default for ShortlistThresholds {
    fn default() -> Self {
        Self {
            min_minutes_share: 70.0,
            min_conference_grade: Grade::B,
            min_power_five_grade: Grade::B,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub current_year: u32,
    pub historical_years: Vec<u32>,
    pub tracked_conferences: Vec<String>,
    pub top_k: usize,
    pub missing_default: f64,
    pub consistency_tolerance: f64,
    pub min_pool_size: usize,
    pub percentage_fast_path: PercentageFastPath,
    pub score_grade: GradeStrategy,
    pub scope_grade: GradeStrategy,
    pub possession_adjust: bool,
    pub accuracy_variant: Option<AccuracyVariant>,
    pub shortlist: ShortlistThresholds,
    /// Per-profile display metric overrides, keyed by profile id.
    pub display_metrics: BTreeMap<String, Vec<DisplayMetric>>,
}

impl EngineConfig {
    pub fn default_v1() -> Self {
        Self {
            current_year: 2025,
            historical_years: vec![2021, 2022, 2023, 2024, 2025],
            tracked_conferences: ["ACC", "SEC", "BIG10", "BIG12", "IVY"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            top_k: DEFAULT_TOP_K,
            missing_default: 0.1,
            consistency_tolerance: DEFAULT_TOLERANCE,
            min_pool_size: 2,
            percentage_fast_path: PercentageFastPath::PercentageMetricsOnly,
            score_grade: GradeStrategy::DirectScoreGrade,
            scope_grade: GradeStrategy::PercentileGrade,
            possession_adjust: true,
            accuracy_variant: None,
            shortlist: ShortlistThresholds::default(),
            display_metrics: BTreeMap::new(),
        }
    }

    /// Reproduces the older per-position reports: bounded series take the
    /// percentage path and the headline grade reads the 1-10 score.
    pub fn legacy_v1() -> Self {
        let mut base = Self::default_v1();
        base.percentage_fast_path = PercentageFastPath::AnyBoundedSeries;
        base.score_grade = GradeStrategy::DirectScoreGrade;
        base.scope_grade = GradeStrategy::DirectScoreGrade;
        base
    }

    pub fn is_tracked_conference(&self, conference: &str) -> bool {
        self.tracked_conferences
            .iter()
            .any(|c| c.eq_ignore_ascii_case(conference.trim()))
    }

    pub fn is_historical_year(&self, year: u32) -> bool {
        self.historical_years.contains(&year)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::default_v1()
    }
}
