pub mod json;
pub mod text;

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreStats {
    pub median: f64,
    pub p10: f64,
    pub p90: f64,
    pub p99: f64,
}

impl ScoreStats {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            median: median(values),
            p10: p10(values),
            p90: p90(values),
            p99: p99(values),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub profile: String,
    pub display_name: String,
    pub n_players: usize,
    pub coverage: String,
    pub metrics_resolved: usize,
    pub metrics_total: usize,
    pub unresolved_metrics: Vec<String>,
    pub partial_metrics: Vec<String>,
    pub normalization_pool: usize,
    pub power_five_pool: usize,
    pub dropped_position: usize,
    pub dropped_empty: usize,
    pub padj_fields: usize,
    pub rebound_components: usize,
    pub total_score_raw: ScoreStats,
    pub grades: BTreeMap<String, BTreeMap<String, usize>>,
    pub elite_fraction: f64,
    pub shortlisted: usize,
    pub issue_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: String,
    pub tool_version: String,
    pub conference: String,
    pub current_year: u32,
    pub accuracy_variant: Option<String>,
    pub score_grade: String,
    pub scope_grade: String,
    pub possession_adjust: bool,
    pub input_issues: BTreeMap<String, usize>,
    pub config_errors: Vec<String>,
    pub profiles: Vec<ProfileSummary>,
}

pub fn format_f64_3(v: f64) -> String {
    format!("{:.3}", v)
}

pub fn quantile_indexed(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    sorted[idx.min(n - 1)]
}

pub fn median(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.5)
}

pub fn p10(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.10)
}

pub fn p90(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.90)
}

pub fn p99(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.99)
}

pub fn bool_fraction(values: &[bool]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| **v).count() as f64 / values.len() as f64
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
