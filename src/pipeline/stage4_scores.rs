use tracing::debug;

use crate::error::Issue;
use crate::model::config::EngineConfig;
use crate::model::grades::{Grade, score_1_to_10};
use crate::model::metric::MetricCategory;
use crate::model::profile::PositionProfile;
use crate::model::record::{PlayerRecord, RecordSet};
use crate::model::results::ScoreResult;
use crate::pipeline::stage2_normalize::{Normalizer, SeriesScale};
use crate::pipeline::stage3_pools::ReferencePool;
use crate::pipeline::stage5_grades::percentile;
use crate::resolve::{MetricResolver, ResolutionAudit, ResolvedMetric, unresolved_issues};

#[derive(Debug, Clone)]
pub struct ScoreOutput {
    pub results: Vec<ScoreResult>,
    pub resolved: Vec<ResolvedMetric>,
    pub audit: ResolutionAudit,
    pub issues: Vec<Issue>,
}

struct ScaledComponent {
    field: String,
    weight: f64,
    scale: SeriesScale,
}

struct ScaledMetric {
    weight: f64,
    category: MetricCategory,
    components: Vec<ScaledComponent>,
}

/// Scores every record against one normalization pool and ranks the
/// totals within the batch. Metrics are resolved separately against the
/// records and the pool, so tables with drifting field names still line up.
pub fn compute_scores(
    records: &RecordSet,
    profile: &PositionProfile,
    norm_pool: &ReferencePool,
    config: &EngineConfig,
) -> ScoreOutput {
    compute_scores_ranked(records, None, profile, norm_pool, config)
}

/// Like [`compute_scores`], but percentiles, 1-10 scores and grades are
/// taken against `distribution` scored the same way (typically every
/// current-season player of the profile across conferences).
pub fn compute_scores_ranked(
    records: &RecordSet,
    distribution: Option<&RecordSet>,
    profile: &PositionProfile,
    norm_pool: &ReferencePool,
    config: &EngineConfig,
) -> ScoreOutput {
    let normalizer = Normalizer::from_config(config);
    let (mut results, resolved, audit) = raw_scores(records, profile, norm_pool, &normalizer);
    let issues = unresolved_issues(&resolved);

    let totals: Vec<Option<f64>> = match distribution {
        Some(set) => raw_scores(set, profile, norm_pool, &normalizer)
            .0
            .iter()
            .map(|r| Some(r.total_score_raw))
            .collect(),
        None => results.iter().map(|r| Some(r.total_score_raw)).collect(),
    };
    for result in results.iter_mut() {
        let pct = percentile(Some(result.total_score_raw), &totals);
        let score = score_1_to_10(pct);
        result.total_percentile = pct;
        result.total_score_1_to_10 = score;
        result.grade = config.score_grade.grade(pct, score);
    }

    debug!(
        profile = %profile.id,
        pool = %norm_pool.label,
        players = results.len(),
        distribution = totals.len(),
        resolved = audit.metrics_resolved,
        defined = audit.metrics_defined,
        "scored"
    );

    ScoreOutput {
        results,
        resolved,
        audit,
        issues,
    }
}

/// Core, Specific and total raw scores; ranking fields are left at their
/// floor values.
fn raw_scores(
    records: &RecordSet,
    profile: &PositionProfile,
    norm_pool: &ReferencePool,
    normalizer: &Normalizer,
) -> (Vec<ScoreResult>, Vec<ResolvedMetric>, ResolutionAudit) {
    let resolver = MetricResolver::new(&records.catalog);
    let (resolved, audit) = resolver.resolve_profile(profile);
    let scaled = scale_metrics(&resolved, norm_pool, normalizer);

    let mut results = Vec::with_capacity(records.len());
    for record in &records.records {
        let mut core = 0.0;
        let mut specific = 0.0;
        for metric in &scaled {
            let contribution = metric.weight * metric_value(metric, record, normalizer);
            match metric.category {
                MetricCategory::Core => core += contribution,
                MetricCategory::Specific => specific += contribution,
            }
        }
        results.push(ScoreResult {
            player: record.player.clone(),
            team: record.team.clone(),
            conference: record.conference.clone(),
            year: record.year,
            core_score_raw: core,
            specific_score_raw: specific,
            total_score_raw: core + specific,
            total_percentile: 0.0,
            total_score_1_to_10: 1.0,
            grade: Grade::F,
        });
    }
    (results, resolved, audit)
}

/// Normalized value of one metric for one record: the renormalized
/// weighted mean over its resolved components, or the missing default
/// when nothing resolved.
fn metric_value(
    metric: &ScaledMetric,
    record: &PlayerRecord,
    normalizer: &Normalizer,
) -> f64 {
    if metric.components.is_empty() {
        return normalizer.missing_default;
    }
    metric
        .components
        .iter()
        .map(|c| c.weight * normalizer.apply(c.scale, record.get(&c.field)))
        .sum()
}

fn scale_metrics(
    resolved: &[ResolvedMetric],
    norm_pool: &ReferencePool,
    normalizer: &Normalizer,
) -> Vec<ScaledMetric> {
    let pool_resolver = MetricResolver::new(&norm_pool.set.catalog);
    resolved
        .iter()
        .map(|metric| ScaledMetric {
            weight: metric.weight,
            category: metric.category,
            components: metric
                .components
                .iter()
                .map(|comp| {
                    let pool_field = pool_resolver
                        .resolve_name(&comp.configured)
                        .map(|r| r.field)
                        .unwrap_or_else(|| comp.field.clone());
                    let reference: Vec<Option<f64>> = norm_pool
                        .records()
                        .iter()
                        .map(|r| r.get(&pool_field))
                        .collect();
                    ScaledComponent {
                        field: comp.field.clone(),
                        weight: comp.weight,
                        scale: normalizer.fit(&comp.field, &reference),
                    }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_scores.rs"]
mod tests;
