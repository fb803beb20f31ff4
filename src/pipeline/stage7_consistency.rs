use std::collections::BTreeMap;

use crate::model::metric::DisplayMetric;
use crate::model::record::{FieldCatalog, PlayerRecord, RecordSet};
use crate::model::results::{Classification, ConsistencyResult};
use crate::model::round_to;
use crate::pipeline::stage3_pools::ReferencePool;
use crate::resolve::MetricResolver;

pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Mean value per displayed metric over one pool. Combined metrics average
/// the component sum over rows where every component is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolAverages {
    pub averages: BTreeMap<String, f64>,
}

impl PoolAverages {
    pub fn from_pool(pool: &ReferencePool, metrics: &[DisplayMetric]) -> Self {
        let mut averages = BTreeMap::new();
        for metric in metrics {
            let Some(fields) = resolve_fields(metric, &pool.set.catalog) else {
                continue;
            };
            let values: Vec<f64> = pool
                .records()
                .iter()
                .filter_map(|r| {
                    let parts: Option<Vec<f64>> = fields.iter().map(|f| r.get(f)).collect();
                    parts.map(|p| p.iter().sum())
                })
                .collect();
            if !values.is_empty() {
                averages.insert(
                    metric.name.clone(),
                    values.iter().sum::<f64>() / values.len() as f64,
                );
            }
        }
        Self { averages }
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.averages.get(metric).copied()
    }
}

fn resolve_fields(metric: &DisplayMetric, catalog: &FieldCatalog) -> Option<Vec<String>> {
    let resolver = MetricResolver::new(catalog);
    let fields: Vec<String> = metric
        .fields()
        .into_iter()
        .filter_map(|f| resolver.resolve_name(f).map(|r| r.field))
        .collect();
    if fields.len() == metric.fields().len() {
        Some(fields)
    } else {
        None
    }
}

/// Player value of a displayed metric. Combined metrics sum whichever
/// components are present.
fn player_value(record: &PlayerRecord, fields: &[Option<String>]) -> Option<f64> {
    let present: Vec<f64> = fields
        .iter()
        .flatten()
        .filter_map(|f| record.get(f))
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum())
    }
}

pub fn classify(value: f64, average: f64, tolerance: f64) -> Classification {
    let tol = average.abs() * tolerance;
    if value > average + tol {
        Classification::Above
    } else if value < average - tol {
        Classification::Below
    } else {
        Classification::At
    }
}

/// Counts metrics above, below and at the pool average for every record.
/// Metrics with a missing value or a zero average are not checked.
pub fn compute_consistency(
    records: &RecordSet,
    metrics: &[DisplayMetric],
    averages: &PoolAverages,
    tolerance: f64,
) -> Vec<ConsistencyResult> {
    let resolver = MetricResolver::new(&records.catalog);
    let columns: Vec<(&DisplayMetric, Vec<Option<String>>)> = metrics
        .iter()
        .map(|m| {
            let fields = m
                .fields()
                .into_iter()
                .map(|f| resolver.resolve_name(f).map(|r| r.field))
                .collect();
            (m, fields)
        })
        .collect();

    records
        .records
        .iter()
        .map(|record| {
            let mut result = ConsistencyResult::default();
            for (metric, fields) in &columns {
                let Some(avg) = averages.get(&metric.name).filter(|a| *a != 0.0) else {
                    continue;
                };
                let Some(value) = player_value(record, fields) else {
                    continue;
                };
                result.total_checked += 1;
                match classify(value, avg, tolerance) {
                    Classification::Above => result.above += 1,
                    Classification::At => result.at += 1,
                    Classification::Below => {
                        result.below += 1;
                        result.below_metrics.push(metric.name.clone());
                    }
                }
            }
            if result.total_checked > 0 {
                let total = result.total_checked as f64;
                result.consistency_pct = round_to(result.above as f64 / total * 100.0, 1);
                result.consistency_score =
                    round_to((100.0 - result.below as f64 * (100.0 / total)).max(0.0), 1);
            }
            result
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_consistency.rs"]
mod tests;
