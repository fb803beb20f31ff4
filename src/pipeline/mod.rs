pub mod stage1_possession;
pub mod stage2_normalize;
pub mod stage3_pools;
pub mod stage4_scores;
pub mod stage5_grades;
pub mod stage6_topk;
pub mod stage7_consistency;
pub mod stage8_report;

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::model::config::{EngineConfig, ShortlistThresholds};
use crate::model::profile::PositionProfile;
use crate::model::record::{RecordSet, normalize_name};
use crate::model::round_to;
use crate::model::results::{ConsistencyResult, Diagnostics, GradeSet, ScoreResult, TopKResult};
use crate::resolve::ResolutionAudit;
use crate::pipeline::stage1_possession::{PossessionBaseline, minutes_share, rebind_profile};
use crate::pipeline::stage3_pools::{
    PoolCache, PoolScope, ReferencePool, ReferencePoolBuilder, TableSet,
};
use crate::pipeline::stage4_scores::{compute_scores, compute_scores_ranked};
use crate::pipeline::stage5_grades::{GradePools, compute_grades};
use crate::pipeline::stage6_topk::compute_top_k;
use crate::pipeline::stage7_consistency::{PoolAverages, compute_consistency};

#[derive(Debug, Clone)]
pub struct PlayerReport {
    pub score: ScoreResult,
    pub grades: GradeSet,
    pub top_k: TopKResult,
    pub consistency: ConsistencyResult,
    pub minutes_share: Option<f64>,
    pub shortlisted: bool,
    /// Most recent earlier season found in the Power-Five results.
    pub previous_year: Option<u32>,
    pub previous_score: Option<f64>,
    /// Current minus previous 1-10 score.
    pub change_from_previous: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileReport {
    pub profile_id: String,
    pub display_name: String,
    pub conference: String,
    pub accuracy_variant: Option<String>,
    pub players: Vec<PlayerReport>,
    pub audit: ResolutionAudit,
    pub diagnostics: Diagnostics,
    pub normalization_pool_size: usize,
    pub power_five_pool_size: usize,
    pub dropped_position: usize,
    pub dropped_empty: usize,
    pub padj_fields: usize,
    pub rebound_components: usize,
}

/// Shared state of one run: the conference being reported and the
/// prepared-table cache.
#[derive(Debug, Default)]
pub struct RunContext {
    pub conference: String,
    pub cache: PoolCache,
}

impl RunContext {
    pub fn new(conference: &str) -> Self {
        Self {
            conference: conference.trim().to_ascii_uppercase(),
            cache: PoolCache::new(),
        }
    }
}

/// Earlier-season results indexed by normalised (player, team) and by
/// player name alone. Each key keeps its latest season.
#[derive(Debug, Default)]
pub struct SeasonHistory<'a> {
    by_identity: BTreeMap<(String, String), &'a ScoreResult>,
    by_name: BTreeMap<String, &'a ScoreResult>,
}

impl<'a> SeasonHistory<'a> {
    pub fn new(results: &'a [ScoreResult], current_year: u32) -> Self {
        let mut history = Self::default();
        for result in results.iter().filter(|r| r.year < current_year) {
            let identity = (normalize_name(&result.player), normalize_name(&result.team));
            keep_latest(history.by_identity.entry(identity).or_insert(result), result);
            keep_latest(
                history
                    .by_name
                    .entry(normalize_name(&result.player))
                    .or_insert(result),
                result,
            );
        }
        history
    }

    pub fn previous(&self, current: &ScoreResult) -> Option<&'a ScoreResult> {
        let identity = (normalize_name(&current.player), normalize_name(&current.team));
        self.by_identity
            .get(&identity)
            .or_else(|| self.by_name.get(&normalize_name(&current.player)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}

fn keep_latest<'a>(slot: &mut &'a ScoreResult, candidate: &'a ScoreResult) {
    if candidate.year > slot.year {
        *slot = candidate;
    }
}

pub fn is_shortlisted(
    share: Option<f64>,
    grades: &GradeSet,
    thresholds: &ShortlistThresholds,
) -> bool {
    let minutes_ok = share.is_some_and(|s| s >= thresholds.min_minutes_share);
    let conference_ok = grades
        .conference
        .is_some_and(|g| g.at_least(thresholds.min_conference_grade));
    let power_five_ok = grades
        .power_five
        .is_some_and(|g| g.at_least(thresholds.min_power_five_grade));
    minutes_ok && conference_ok && power_five_ok
}

/// One profile's batch: filter, possession adjustment, rebinding, scoring
/// of the current season and the Power-Five pool, scoped grades, elite
/// flags, consistency and the shortlist.
pub fn run_profile(
    profile: &PositionProfile,
    tables: &TableSet,
    baseline: &PossessionBaseline,
    config: &EngineConfig,
    ctx: &RunContext,
) -> ProfileReport {
    let mut profile = match config.accuracy_variant {
        Some(variant) => profile.with_accuracy_variant(variant),
        None => profile.clone(),
    };
    if let Some(display) = config.display_metrics.get(&profile.id) {
        profile.display_metrics = display.clone();
    }

    let mut report = ProfileReport {
        profile_id: profile.id.clone(),
        display_name: profile.display_name.clone(),
        conference: ctx.conference.clone(),
        accuracy_variant: config.accuracy_variant.map(|v| v.label().to_string()),
        ..ProfileReport::default()
    };

    let builder = ReferencePoolBuilder::new(&profile, tables, baseline, config, &ctx.cache);
    let Some(current) = builder.current(&ctx.conference) else {
        warn!(
            profile = %profile.id,
            conference = %ctx.conference,
            year = config.current_year,
            "no current-season table"
        );
        return report;
    };
    report.dropped_position = current.dropped_position;
    report.dropped_empty = current.dropped_empty;
    report.padj_fields = current.padj_fields;
    report.diagnostics.extend(current.issues.iter().cloned());
    info!(
        profile = %profile.id,
        players = current.set.len(),
        dropped_position = current.dropped_position,
        dropped_empty = current.dropped_empty,
        "current season loaded"
    );

    let norm_pool = builder.normalization_pool(&ctx.conference);
    report.normalization_pool_size = norm_pool.len();

    let scoring_profile = if config.possession_adjust {
        let (rebound, count) = rebind_profile(&profile, &current.set);
        report.rebound_components = count;
        rebound
    } else {
        profile.clone()
    };

    let season = builder.current_season_pool();
    let distribution = if season.is_empty() {
        &current.set
    } else {
        &season.set
    };
    let scored = compute_scores_ranked(
        &current.set,
        Some(distribution),
        &scoring_profile,
        &norm_pool,
        config,
    );
    report.diagnostics.extend(scored.issues.iter().cloned());
    report.diagnostics.metrics_total = scored.audit.metrics_defined;
    report.diagnostics.metrics_resolved = scored.audit.metrics_resolved;
    report.audit = scored.audit.clone();

    let mut power_five_results = Vec::new();
    let mut big_pool = ReferencePool {
        scope: PoolScope::PowerFive,
        label: "power_five".to_string(),
        set: RecordSet::default(),
    };
    for (batch, reference) in builder.power_five_batches() {
        let out = compute_scores(&batch.set, &scoring_profile, &reference, config);
        power_five_results.extend(out.results);
        big_pool.set.extend(batch.set);
    }
    report.power_five_pool_size = big_pool.len();
    info!(
        profile = %profile.id,
        normalization = norm_pool.len(),
        current_season = distribution.len(),
        power_five = big_pool.len(),
        "pools built"
    );

    let pools = GradePools::from_scores(&scored.results, &power_five_results);
    let graded = compute_grades(&scored.results, &pools, config.scope_grade, config.min_pool_size);
    report.diagnostics.extend(graded.issues);

    let elite_pool = if big_pool.is_empty() { &norm_pool } else { &big_pool };
    let display = &scoring_profile.display_metrics;
    let top_k = compute_top_k(&current.set, display, elite_pool, config.top_k);
    let averages = PoolAverages::from_pool(elite_pool, display);
    let consistency = compute_consistency(
        &current.set,
        display,
        &averages,
        config.consistency_tolerance,
    );

    let history = SeasonHistory::new(&power_five_results, config.current_year);
    for (i, score) in scored.results.into_iter().enumerate() {
        let share = minutes_share(&current.set.records[i], baseline);
        let grades = graded.grades[i];
        let shortlisted = is_shortlisted(share, &grades, &config.shortlist);
        let previous = history.previous(&score);
        let previous_score = previous.map(|p| round_to(p.total_score_1_to_10, 2));
        let change_from_previous =
            previous.map(|p| round_to(score.total_score_1_to_10 - p.total_score_1_to_10, 2));
        report.players.push(PlayerReport {
            score,
            grades,
            top_k: top_k[i].clone(),
            consistency: consistency[i].clone(),
            minutes_share: share,
            shortlisted,
            previous_year: previous.map(|p| p.year),
            previous_score,
            change_from_previous,
        });
    }

    info!(
        profile = %profile.id,
        players = report.players.len(),
        coverage = %report.diagnostics.coverage_label(),
        shortlisted = report.players.iter().filter(|p| p.shortlisted).count(),
        with_history = report
            .players
            .iter()
            .filter(|p| p.previous_year.is_some())
            .count(),
        issues = report.diagnostics.issues.len(),
        "profile scored"
    );
    report
}

/// Runs every profile in parallel; reports come back in profile order.
pub fn run_all(
    profiles: &[PositionProfile],
    tables: &BTreeMap<String, TableSet>,
    baseline: &PossessionBaseline,
    config: &EngineConfig,
    ctx: &RunContext,
) -> Vec<ProfileReport> {
    let empty = TableSet::default();
    let mut reports: Vec<ProfileReport> = profiles
        .par_iter()
        .map(|profile| {
            let set = tables.get(&profile.source_key).unwrap_or(&empty);
            run_profile(profile, set, baseline, config, ctx)
        })
        .collect();
    reports.sort_by(|a, b| a.profile_id.cmp(&b.profile_id));
    reports
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
