use tracing::debug;

use crate::model::metric::DisplayMetric;
use crate::model::record::RecordSet;
use crate::model::results::{MetricEliteFlag, TopKResult};
use crate::pipeline::stage3_pools::ReferencePool;
use crate::resolve::MetricResolver;

pub const DEFAULT_TOP_K: usize = 15;

/// Rank of `value` in `pool_desc` (sorted descending) and whether it is
/// elite. Values tied with the K-th largest are admitted even when their
/// rank exceeds K.
pub fn elite_status(value: f64, pool_desc: &[f64], k: usize) -> (usize, bool) {
    let rank = pool_desc.iter().filter(|p| **p >= value).count();
    if pool_desc.is_empty() || k == 0 {
        return (rank, false);
    }
    let elite = if pool_desc.len() >= k {
        rank <= k || value >= pool_desc[k - 1]
    } else {
        rank <= k
    };
    (rank, elite)
}

/// Flags every displayed metric of every record as elite or not against the
/// big pool. Combined metrics are judged on their primary component.
pub fn compute_top_k(
    records: &RecordSet,
    metrics: &[DisplayMetric],
    big_pool: &ReferencePool,
    k: usize,
) -> Vec<TopKResult> {
    let record_resolver = MetricResolver::new(&records.catalog);
    let pool_resolver = MetricResolver::new(&big_pool.set.catalog);

    let columns: Vec<(String, Option<String>, Vec<f64>)> = metrics
        .iter()
        .map(|metric| {
            let primary = metric.primary();
            let field = record_resolver.resolve_name(primary).map(|r| r.field);
            let pool_field = pool_resolver
                .resolve_name(primary)
                .map(|r| r.field)
                .or_else(|| field.clone());
            let mut pool: Vec<f64> = match &pool_field {
                Some(f) => big_pool
                    .records()
                    .iter()
                    .filter_map(|r| r.get(f))
                    .filter(|v| v.is_finite())
                    .collect(),
                None => Vec::new(),
            };
            pool.sort_by(|a, b| b.total_cmp(a));
            debug!(
                metric = %metric.name,
                field = field.as_deref().unwrap_or("-"),
                pool = pool.len(),
                "top-k column"
            );
            (metric.name.clone(), field, pool)
        })
        .collect();

    records
        .records
        .iter()
        .map(|record| {
            let flags: Vec<MetricEliteFlag> = columns
                .iter()
                .map(|(name, field, pool)| {
                    let value = field.as_deref().and_then(|f| record.get(f));
                    let (rank, elite) = match value {
                        Some(v) => elite_status(v, pool, k),
                        None => (0, false),
                    };
                    MetricEliteFlag {
                        metric: name.clone(),
                        value,
                        elite,
                        rank,
                        pool_size: pool.len(),
                    }
                })
                .collect();
            let elite_count = flags.iter().filter(|f| f.elite).count();
            TopKResult {
                player: record.player.clone(),
                flags,
                elite_count,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_topk.rs"]
mod tests;
