use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Issue;
use crate::model::grades::Grade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub player: String,
    pub team: String,
    pub conference: String,
    pub year: u32,
    pub core_score_raw: f64,
    pub specific_score_raw: f64,
    pub total_score_raw: f64,
    pub total_percentile: f64,
    pub total_score_1_to_10: f64,
    pub grade: Grade,
}

/// Scoped grades for one player. `None` means the scope's pool was too
/// small to grade against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GradeSet {
    pub team: Option<Grade>,
    pub conference: Option<Grade>,
    pub power_five: Option<Grade>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Above,
    At,
    Below,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConsistencyResult {
    pub above: usize,
    pub below: usize,
    pub at: usize,
    pub total_checked: usize,
    pub consistency_pct: f64,
    pub consistency_score: f64,
    pub below_metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEliteFlag {
    pub metric: String,
    pub value: Option<f64>,
    pub elite: bool,
    pub rank: usize,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TopKResult {
    pub player: String,
    pub flags: Vec<MetricEliteFlag>,
    pub elite_count: usize,
}

impl TopKResult {
    pub fn elite_metrics(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|f| f.elite)
            .map(|f| f.metric.as_str())
    }
}

/// Non-fatal issues of one profile run plus resolution coverage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub issues: Vec<Issue>,
    pub metrics_total: usize,
    pub metrics_resolved: usize,
}

impl Diagnostics {
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend<I: IntoIterator<Item = Issue>>(&mut self, issues: I) {
        self.issues.extend(issues);
    }

    pub fn coverage_label(&self) -> String {
        format!(
            "{}/{} metrics resolved",
            self.metrics_resolved, self.metrics_total
        )
    }

    pub fn issue_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn unresolved_metrics(&self) -> Vec<String> {
        let mut out = Vec::new();
        for issue in &self.issues {
            if let Issue::UnresolvedMetric { metric, component } = issue {
                let label = match component {
                    Some(c) if c != metric => format!("{metric} ({c})"),
                    _ => metric.clone(),
                };
                if !out.contains(&label) {
                    out.push(label);
                }
            }
        }
        out
    }
}
