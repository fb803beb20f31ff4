use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::error::Issue;
use crate::model::config::EngineConfig;
use crate::model::profile::PositionProfile;
use crate::model::record::{PlayerRecord, RecordSet};
use crate::pipeline::stage1_possession::{PossessionBaseline, apply_padj};
use crate::resolve::names::normalize_metric_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolScope {
    Normalization,
    Team,
    Conference,
    PowerFive,
}

impl PoolScope {
    pub fn label(self) -> &'static str {
        match self {
            PoolScope::Normalization => "normalization",
            PoolScope::Team => "team",
            PoolScope::Conference => "conference",
            PoolScope::PowerFive => "power_five",
        }
    }
}

impl fmt::Display for PoolScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableKey {
    pub conference: String,
    pub year: u32,
}

impl TableKey {
    pub fn new(conference: &str, year: u32) -> Self {
        Self {
            conference: conference.trim().to_ascii_uppercase(),
            year,
        }
    }
}

/// Every raw table loaded for one profile source key.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub tables: BTreeMap<TableKey, RecordSet>,
}

impl TableSet {
    pub fn insert(&mut self, key: TableKey, set: RecordSet) {
        match self.tables.get_mut(&key) {
            Some(existing) => existing.extend(set),
            None => {
                self.tables.insert(key, set);
            }
        }
    }

    pub fn get(&self, key: &TableKey) -> Option<&RecordSet> {
        self.tables.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TableKey> {
        self.tables.keys()
    }
}

/// Comparison population for one scope.
#[derive(Debug, Clone)]
pub struct ReferencePool {
    pub scope: PoolScope,
    pub label: String,
    pub set: RecordSet,
}

impl ReferencePool {
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.set.records
    }
}

/// A table after the profile filter and possession adjustment.
#[derive(Debug, Clone, Default)]
pub struct PreparedTable {
    pub set: RecordSet,
    pub dropped_position: usize,
    pub dropped_empty: usize,
    pub padj_fields: usize,
    pub issues: Vec<Issue>,
}

/// Run-scoped cache of prepared tables keyed by (profile, table).
#[derive(Debug, Default)]
pub struct PoolCache {
    prepared: Mutex<BTreeMap<(String, TableKey), Arc<PreparedTable>>>,
}

impl PoolCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_prepare<F>(&self, profile_id: &str, key: &TableKey, build: F) -> Arc<PreparedTable>
    where
        F: FnOnce() -> PreparedTable,
    {
        let cache_key = (profile_id.to_string(), key.clone());
        if let Ok(guard) = self.prepared.lock() {
            if let Some(hit) = guard.get(&cache_key) {
                return Arc::clone(hit);
            }
        }
        let built = Arc::new(build());
        if let Ok(mut guard) = self.prepared.lock() {
            guard.entry(cache_key).or_insert_with(|| Arc::clone(&built));
        }
        built
    }

    pub fn len(&self) -> usize {
        self.prepared.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drops records outside the profile's position tags and records with no
/// non-zero value in any field the profile references.
pub fn filter_for_profile(profile: &PositionProfile, set: &RecordSet) -> (RecordSet, usize, usize) {
    let relevant: BTreeSet<String> = profile
        .relevant_fields()
        .iter()
        .map(|f| normalize_metric_name(f))
        .collect();
    let mut kept = Vec::with_capacity(set.records.len());
    let mut dropped_position = 0usize;
    let mut dropped_empty = 0usize;
    for record in &set.records {
        if !profile.accepts_positions(&record.positions) {
            dropped_position += 1;
            continue;
        }
        if !has_relevant_data(record, &relevant) {
            dropped_empty += 1;
            continue;
        }
        kept.push(record.clone());
    }
    (
        RecordSet::with_catalog(kept, set.catalog.clone()),
        dropped_position,
        dropped_empty,
    )
}

fn has_relevant_data(record: &PlayerRecord, relevant: &BTreeSet<String>) -> bool {
    let mut checked = 0usize;
    for (name, value) in &record.fields {
        if !relevant.contains(&normalize_metric_name(name)) {
            continue;
        }
        checked += 1;
        if value.is_some_and(|v| v != 0.0) {
            return true;
        }
    }
    // Table carries none of the profile's fields; nothing to judge.
    checked == 0
}

pub struct ReferencePoolBuilder<'a> {
    profile: &'a PositionProfile,
    tables: &'a TableSet,
    baseline: &'a PossessionBaseline,
    config: &'a EngineConfig,
    cache: &'a PoolCache,
}

impl<'a> ReferencePoolBuilder<'a> {
    pub fn new(
        profile: &'a PositionProfile,
        tables: &'a TableSet,
        baseline: &'a PossessionBaseline,
        config: &'a EngineConfig,
        cache: &'a PoolCache,
    ) -> Self {
        Self {
            profile,
            tables,
            baseline,
            config,
            cache,
        }
    }

    pub fn prepared(&self, key: &TableKey) -> Option<Arc<PreparedTable>> {
        let raw = self.tables.get(key)?;
        Some(self.cache.get_or_prepare(&self.profile.id, key, || {
            let (mut set, dropped_position, dropped_empty) = filter_for_profile(self.profile, raw);
            let mut issues = Vec::new();
            let mut padj_fields = 0usize;
            if self.config.possession_adjust && !self.baseline.is_empty() {
                let outcome = apply_padj(&mut set, self.baseline);
                padj_fields = outcome.added.len();
                issues = outcome.issues;
            }
            debug!(
                profile = %self.profile.id,
                conference = %key.conference,
                year = key.year,
                kept = set.len(),
                dropped_position,
                dropped_empty,
                "prepared table"
            );
            PreparedTable {
                set,
                dropped_position,
                dropped_empty,
                padj_fields,
                issues,
            }
        }))
    }

    pub fn current(&self, conference: &str) -> Option<Arc<PreparedTable>> {
        self.prepared(&TableKey::new(conference, self.config.current_year))
    }

    /// The conference's historical tables plus the current season of every
    /// loaded conference, so min-max ranges match across conferences.
    pub fn normalization_pool(&self, conference: &str) -> ReferencePool {
        let conference = conference.trim().to_ascii_uppercase();
        let keys: Vec<TableKey> = self
            .tables
            .keys()
            .filter(|k| {
                k.year == self.config.current_year
                    || (k.conference == conference && self.config.is_historical_year(k.year))
            })
            .cloned()
            .collect();
        let pool = self.concat(PoolScope::Normalization, &conference, &keys);
        info!(
            profile = %self.profile.id,
            conference = %conference,
            tables = keys.len(),
            size = pool.len(),
            "normalization pool"
        );
        pool
    }

    /// Current season of every loaded conference; the distribution headline
    /// percentiles are ranked against.
    pub fn current_season_pool(&self) -> ReferencePool {
        let keys: Vec<TableKey> = self
            .tables
            .keys()
            .filter(|k| k.year == self.config.current_year)
            .cloned()
            .collect();
        self.concat(
            PoolScope::Normalization,
            &format!("current_{}", self.config.current_year),
            &keys,
        )
    }

    /// Tracked conferences grouped per historical year, each paired with the
    /// reference used to normalize it: all earlier tracked years, or the
    /// year itself when nothing precedes it.
    pub fn power_five_batches(&self) -> Vec<(ReferencePool, ReferencePool)> {
        let mut by_year: BTreeMap<u32, Vec<TableKey>> = BTreeMap::new();
        for key in self.tables.keys() {
            if self.config.is_tracked_conference(&key.conference)
                && self.config.is_historical_year(key.year)
            {
                by_year.entry(key.year).or_default().push(key.clone());
            }
        }

        let mut out = Vec::with_capacity(by_year.len());
        let mut earlier: Vec<TableKey> = Vec::new();
        for (year, keys) in &by_year {
            let label = format!("power_five_{year}");
            let batch = self.concat(PoolScope::PowerFive, &label, keys);
            let reference = if earlier.is_empty() {
                batch.clone()
            } else {
                self.concat(PoolScope::Normalization, &format!("before_{year}"), &earlier)
            };
            earlier.extend(keys.iter().cloned());
            if !batch.is_empty() {
                out.push((batch, reference));
            }
        }
        out
    }

    fn concat(&self, scope: PoolScope, label: &str, keys: &[TableKey]) -> ReferencePool {
        let mut set = RecordSet::default();
        for key in keys {
            if let Some(prepared) = self.prepared(key) {
                set.extend(prepared.set.clone());
            }
        }
        ReferencePool {
            scope,
            label: label.to_string(),
            set,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_pools.rs"]
mod tests;
