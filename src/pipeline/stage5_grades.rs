use std::collections::BTreeMap;

use crate::error::Issue;
use crate::model::grades::{Grade, GradeStrategy, score_1_to_10};
use crate::model::record::normalize_name;
use crate::model::results::{GradeSet, ScoreResult};
use crate::pipeline::stage3_pools::PoolScope;

/// Share of non-missing pool values at or below `x`, times 100. Missing
/// `x` (or an empty pool) gives 0.
pub fn percentile(x: Option<f64>, pool: &[Option<f64>]) -> f64 {
    let Some(x) = x.filter(|v| v.is_finite()) else {
        return 0.0;
    };
    let mut n = 0usize;
    let mut below_or_equal = 0usize;
    for p in pool.iter().flatten() {
        if !p.is_finite() {
            continue;
        }
        n += 1;
        if *p <= x {
            below_or_equal += 1;
        }
    }
    if n == 0 {
        return 0.0;
    }
    100.0 * below_or_equal as f64 / n as f64
}

/// Percentile, 1-10 score and letter grade of `x` against `pool`.
pub fn assign_grade(x: Option<f64>, pool: &[Option<f64>], strategy: GradeStrategy) -> (f64, f64, Grade) {
    let pct = percentile(x, pool);
    let score = score_1_to_10(pct);
    (pct, score, strategy.grade(pct, score))
}

/// Total score distributions per grading scope.
#[derive(Debug, Clone, Default)]
pub struct GradePools {
    pub team: BTreeMap<String, Vec<Option<f64>>>,
    pub conference: Vec<Option<f64>>,
    pub power_five: Vec<Option<f64>>,
}

impl GradePools {
    /// Team and conference pools come from the current batch; the
    /// Power-Five pool from the scored historical batches.
    pub fn from_scores(current: &[ScoreResult], power_five: &[ScoreResult]) -> Self {
        let mut team: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        for r in current {
            team.entry(normalize_name(&r.team))
                .or_default()
                .push(Some(r.total_score_raw));
        }
        Self {
            team,
            conference: current.iter().map(|r| Some(r.total_score_raw)).collect(),
            power_five: power_five.iter().map(|r| Some(r.total_score_raw)).collect(),
        }
    }

    pub fn pool(&self, scope: PoolScope, result: &ScoreResult) -> &[Option<f64>] {
        match scope {
            PoolScope::Team => self
                .team
                .get(&normalize_name(&result.team))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            PoolScope::Conference => &self.conference,
            PoolScope::PowerFive => &self.power_five,
            PoolScope::Normalization => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GradeOutput {
    pub grades: Vec<GradeSet>,
    pub issues: Vec<Issue>,
}

/// Grades every result independently against its team, conference and
/// Power-Five pools. A scope whose pool is smaller than `min_pool_size`
/// yields no grade.
pub fn compute_grades(
    results: &[ScoreResult],
    pools: &GradePools,
    strategy: GradeStrategy,
    min_pool_size: usize,
) -> GradeOutput {
    let mut out = GradeOutput {
        grades: Vec::with_capacity(results.len()),
        issues: Vec::new(),
    };
    for result in results {
        let mut set = GradeSet::default();
        for scope in [PoolScope::Team, PoolScope::Conference, PoolScope::PowerFive] {
            let pool = pools.pool(scope, result);
            let size = pool.iter().flatten().count();
            let grade = if size < min_pool_size {
                out.issues.push(Issue::InsufficientPool {
                    player: result.player.clone(),
                    scope: scope.label().to_string(),
                    size,
                    required: min_pool_size,
                });
                None
            } else {
                Some(assign_grade(Some(result.total_score_raw), pool, strategy).2)
            };
            match scope {
                PoolScope::Team => set.team = grade,
                PoolScope::Conference => set.conference = grade,
                PoolScope::PowerFive => set.power_five = grade,
                PoolScope::Normalization => {}
            }
        }
        out.grades.push(set);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_grades.rs"]
mod tests;
