use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::error::Issue;
use crate::model::metric::category_order;
use crate::model::profile::PositionProfile;
use crate::model::record::{FieldCatalog, PlayerRecord, RecordSet, normalize_name};
use crate::model::round_to;
use crate::resolve::MetricResolver;
use crate::resolve::names::{is_padj, is_percentage, padj_name};

pub const MINUTES_FIELD: &str = "Minutes played";

/// Count actions eligible for possession adjustment.
pub const PADJ_BASE_METRICS: &[&str] = &[
    "Interceptions",
    "Sliding tackles",
    "Clearances",
    "Shots blocked",
    "Defensive duels",
    "Aerial duels",
    "Passes",
    "Long passes",
    "Forward passes",
    "Back passes",
    "Lateral passes",
    "Progressive passes",
    "Smart passes",
    "Through passes",
    "Passes to final third",
    "Passes to penalty area",
    "Deep completed passes",
    "Shots",
    "Key passes",
    "Touches in penalty area",
    "Offensive duels",
    "Recoveries",
    "Dribbles",
    "Progressive runs",
    "Received passes",
];

/// One match row of a team's match log.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamMatchTally {
    pub team: String,
    pub passes: Option<f64>,
    pub avg_passes_per_possession: Option<f64>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamBaseline {
    pub team: String,
    pub possessions: Option<f64>,
    pub total_minutes: f64,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PossessionBaseline {
    pub teams: Vec<TeamBaseline>,
    pub league_average: Option<f64>,
}

impl PossessionBaseline {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Exact name, then case-insensitive, then containment when the first
    /// two words agree.
    pub fn find_team(&self, team: &str) -> Option<&TeamBaseline> {
        let wanted = team.trim();
        if wanted.is_empty() {
            return None;
        }
        if let Some(t) = self.teams.iter().find(|t| t.team == wanted) {
            return Some(t);
        }
        let wanted_norm = normalize_name(wanted);
        if let Some(t) = self
            .teams
            .iter()
            .find(|t| normalize_name(&t.team) == wanted_norm)
        {
            return Some(t);
        }
        let wanted_words: Vec<&str> = wanted_norm.split(' ').take(2).collect();
        self.teams.iter().find(|t| {
            let norm = normalize_name(&t.team);
            let contains = norm.contains(&wanted_norm) || wanted_norm.contains(&norm);
            let words: Vec<&str> = norm.split(' ').take(2).collect();
            contains && words.len() == 2 && words == wanted_words
        })
    }

    pub fn possessions(&self, team: &str) -> Option<f64> {
        self.find_team(team).and_then(|t| t.possessions)
    }

    pub fn team_minutes(&self, team: &str) -> Option<f64> {
        self.find_team(team)
            .map(|t| t.total_minutes)
            .filter(|m| *m > 0.0)
    }
}

/// Team possessions per game = mean over matches of passes / passes per
/// possession; league average = mean over teams with an estimate.
pub fn estimate_possessions(tallies: &[TeamMatchTally]) -> PossessionBaseline {
    let mut grouped: BTreeMap<String, (String, Vec<f64>, f64, usize)> = BTreeMap::new();
    for tally in tallies {
        let key = normalize_name(&tally.team);
        if key.is_empty() {
            continue;
        }
        let entry = grouped
            .entry(key)
            .or_insert_with(|| (tally.team.trim().to_string(), Vec::new(), 0.0, 0));
        entry.3 += 1;
        if let Some(d) = tally.duration.filter(|d| *d > 0.0) {
            entry.2 += d;
        }
        if let (Some(passes), Some(per)) = (tally.passes, tally.avg_passes_per_possession) {
            if per > 0.0 {
                entry.1.push(passes / per);
            }
        }
    }

    let teams: Vec<TeamBaseline> = grouped
        .into_values()
        .map(|(team, per_match, total_minutes, matches)| TeamBaseline {
            team,
            possessions: mean(&per_match),
            total_minutes,
            matches,
        })
        .collect();

    let estimates: Vec<f64> = teams.iter().filter_map(|t| t.possessions).collect();
    let league_average = mean(&estimates);
    info!(
        teams = teams.len(),
        with_possessions = estimates.len(),
        league_average = league_average.unwrap_or(0.0),
        "possession baseline"
    );
    PossessionBaseline {
        teams,
        league_average,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `raw * league / team`, rounded to two decimals. `None` when the team
/// has no usable estimate.
pub fn adjust_value(raw: f64, team_possessions: Option<f64>, league: Option<f64>) -> Option<f64> {
    match (team_possessions, league) {
        (Some(team), Some(league)) if team > 0.0 => Some(round_to(raw * league / team, 2)),
        _ => None,
    }
}

pub fn is_padj_candidate(field: &str) -> bool {
    if is_padj(field) || is_percentage(field) {
        return false;
    }
    let lower = field.trim().to_lowercase();
    PADJ_BASE_METRICS.iter().any(|base| {
        let base = base.to_lowercase();
        lower == base
            || lower.contains(&format!("{base} per 90"))
            || lower.contains(&format!("{base}s per 90"))
            || lower.ends_with(&format!(" {base}"))
            || lower.ends_with(&format!(" {base}s"))
    })
}

#[derive(Debug, Clone, Default)]
pub struct PadjOutcome {
    pub added: Vec<String>,
    pub adjusted_values: usize,
    pub issues: Vec<Issue>,
}

/// Adds a `PAdj <field>` column for every candidate field. Players whose
/// team has no baseline keep their raw value and are reported once per team.
pub fn apply_padj(set: &mut RecordSet, baseline: &PossessionBaseline) -> PadjOutcome {
    let candidates: Vec<String> = set
        .catalog
        .names()
        .iter()
        .filter(|f| is_padj_candidate(f))
        .filter(|f| !set.catalog.contains(&padj_name(f)))
        .cloned()
        .collect();

    let mut outcome = PadjOutcome::default();
    if candidates.is_empty() {
        return outcome;
    }

    let mut flagged: BTreeSet<String> = BTreeSet::new();
    for record in set.records.iter_mut() {
        let team_poss = baseline.possessions(&record.team);
        if team_poss.is_none() && flagged.insert(normalize_name(&record.team)) {
            outcome.issues.push(Issue::MissingPossessionData {
                team: record.team.clone(),
                field: candidates.join(", "),
            });
        }
        adjust_record(record, &candidates, team_poss, baseline.league_average, &mut outcome);
    }

    for field in &candidates {
        let name = padj_name(field);
        set.catalog.insert(&name);
        outcome.added.push(name);
    }
    debug!(
        fields = outcome.added.len(),
        adjusted = outcome.adjusted_values,
        unadjusted_teams = flagged.len(),
        "possession adjustment"
    );
    outcome
}

fn adjust_record(
    record: &mut PlayerRecord,
    candidates: &[String],
    team_poss: Option<f64>,
    league: Option<f64>,
    outcome: &mut PadjOutcome,
) {
    for field in candidates {
        let value = record.get(field).map(|raw| {
            match adjust_value(raw, team_poss, league) {
                Some(adj) => {
                    outcome.adjusted_values += 1;
                    adj
                }
                None => raw,
            }
        });
        record.set(&padj_name(field), value);
    }
}

/// `PAdj` counterpart of the field `name` resolves to, when the catalog
/// carries one and the field is not a percentage.
pub fn padj_counterpart(name: &str, catalog: &FieldCatalog) -> Option<String> {
    if is_padj(name) || is_percentage(name) {
        return None;
    }
    let res = MetricResolver::new(catalog).resolve_name(name)?;
    if is_percentage(&res.field) {
        return None;
    }
    let target = padj_name(&res.field);
    catalog.contains(&target).then_some(target)
}

/// Copy of `profile` whose non-percentage components point at their
/// `PAdj` counterpart whenever the catalog carries one.
pub fn rebind_profile(profile: &PositionProfile, set: &RecordSet) -> (PositionProfile, usize) {
    let mut out = profile.clone();
    let mut rebound = 0usize;
    for &category in category_order() {
        for metric in out.category_mut(category).iter_mut() {
            for comp in metric.components.iter_mut() {
                if let Some(target) = padj_counterpart(&comp.name, &set.catalog) {
                    debug!(metric = %metric.name, from = %comp.name, to = %target, "rebound");
                    comp.name = target;
                    rebound += 1;
                }
            }
        }
    }
    for display in out.display_metrics.iter_mut() {
        if display.is_combined() {
            for comp in display.components.iter_mut() {
                if let Some(target) = padj_counterpart(comp, &set.catalog) {
                    *comp = target;
                }
            }
        } else if let Some(target) = padj_counterpart(&display.name, &set.catalog) {
            display.components = vec![target];
        }
    }
    (out, rebound)
}

/// Share of the team's total minutes the player was on the pitch, capped
/// at 100.
pub fn minutes_share(record: &PlayerRecord, baseline: &PossessionBaseline) -> Option<f64> {
    let minutes = record.get(MINUTES_FIELD)?;
    let total = baseline.team_minutes(&record.team)?;
    Some((minutes / total * 100.0).min(100.0))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_possession.rs"]
mod tests;
