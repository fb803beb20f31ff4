use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub mod join;
pub mod profiles;
pub mod tables;
pub mod team_stats;

use tracing::{debug, info, warn};

use crate::error::{InputError, Issue};
use crate::pipeline::stage3_pools::{TableKey, TableSet};

use join::join_sources;
use tables::{TableName, parse_table_name, read_player_table};

pub const SUPPLEMENTAL_DIR: &str = "supplemental";

/// Player tables grouped by profile source key.
#[derive(Debug, Default)]
pub struct LoadedTables {
    pub tables: BTreeMap<String, TableSet>,
    pub files: Vec<PathBuf>,
    pub issues: Vec<Issue>,
}

impl LoadedTables {
    pub fn player_count(&self) -> usize {
        self.tables
            .values()
            .flat_map(|set| set.tables.values())
            .map(|t| t.len())
            .sum()
    }
}

/// Loads every `{CONF} {source key} {YEAR}.csv` table in `dir`, then merges
/// same-named tables from `dir/supplemental` into them.
pub fn load_tables(dir: &Path) -> Result<LoadedTables, InputError> {
    if !dir.is_dir() {
        return Err(InputError::MissingInput(format!(
            "input directory {} not found",
            dir.display()
        )));
    }

    let mut loaded = LoadedTables::default();
    for (path, name) in discover_tables(dir)? {
        let (set, issues) = read_player_table(&path, &name.conference, name.year)?;
        debug!(path = %path.display(), players = set.len(), "table read");
        loaded.issues.extend(issues);
        loaded
            .tables
            .entry(name.source_key.clone())
            .or_default()
            .insert(TableKey::new(&name.conference, name.year), set);
        loaded.files.push(path);
    }
    if loaded.files.is_empty() {
        return Err(InputError::MissingInput(format!(
            "no player tables in {}",
            dir.display()
        )));
    }

    let supplemental = dir.join(SUPPLEMENTAL_DIR);
    if supplemental.is_dir() {
        for (path, name) in discover_tables(&supplemental)? {
            let key = TableKey::new(&name.conference, name.year);
            let Some(primary) = loaded
                .tables
                .get_mut(&name.source_key)
                .and_then(|set| set.tables.get_mut(&key))
            else {
                warn!(path = %path.display(), "supplemental table has no primary table; skipped");
                continue;
            };
            let (extra, issues) = read_player_table(&path, &name.conference, name.year)?;
            loaded.issues.extend(issues);
            let stats = join_sources(primary, &extra);
            info!(
                path = %path.display(),
                matched = stats.matched,
                name_only = stats.name_only,
                fields_copied = stats.fields_copied,
                "supplemental table joined"
            );
            loaded.files.push(path);
        }
    }

    info!(
        files = loaded.files.len(),
        source_keys = loaded.tables.len(),
        players = loaded.player_count(),
        invalid_values = loaded.issues.len(),
        "player tables loaded"
    );
    Ok(loaded)
}

fn discover_tables(dir: &Path) -> Result<Vec<(PathBuf, TableName)>, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| InputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !is_csv(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with(team_stats::TEAM_STATS_PREFIX) {
            continue;
        }
        match parse_table_name(stem) {
            Some(name) => found.push((path, name)),
            None => debug!(path = %path.display(), "not a player table name; skipped"),
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

pub(crate) fn is_csv(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/mod.rs"]
mod tests;
