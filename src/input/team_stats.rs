use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{InputError, Issue};
use crate::input::is_csv;
use crate::model::record::{normalize_name, parse_numeric};
use crate::pipeline::stage1_possession::TeamMatchTally;

pub const TEAM_STATS_PREFIX: &str = "Team Stats ";

const TEAM_COLUMN: &str = "Team";
const PASSES_COLUMN: &str = "Passes";
const PASSES_PER_POSSESSION_COLUMN: &str = "Average passes per possession";
const DURATION_COLUMN: &str = "Duration";

/// Match tallies of every team file plus the cells that failed to parse.
#[derive(Debug, Clone, Default)]
pub struct TeamStats {
    pub tallies: Vec<TeamMatchTally>,
    pub issues: Vec<Issue>,
}

/// Reads every `Team Stats {team}.csv` match log in `dir`. Rows naming a
/// different team (the opponent's line of a match) are skipped.
pub fn load_team_stats(dir: &Path) -> Result<TeamStats, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| InputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_team_file = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with(TEAM_STATS_PREFIX));
        if is_csv(&path) && is_team_file {
            paths.push(path);
        }
    }
    paths.sort();

    let mut stats = TeamStats::default();
    for path in &paths {
        let team = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(TEAM_STATS_PREFIX))
            .unwrap_or("")
            .trim()
            .to_string();
        let before = stats.issues.len();
        let rows = read_team_file(path, &team, &mut stats.issues)?;
        debug!(
            path = %path.display(),
            team = %team,
            matches = rows.len(),
            invalid = stats.issues.len() - before,
            "team stats read"
        );
        stats.tallies.extend(rows);
    }
    info!(
        files = paths.len(),
        matches = stats.tallies.len(),
        invalid = stats.issues.len(),
        "team stats loaded"
    );
    Ok(stats)
}

fn read_team_file(
    path: &Path,
    team: &str,
    issues: &mut Vec<Issue>,
) -> Result<Vec<TeamMatchTally>, InputError> {
    let csv_err = |source: csv::Error| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let required = |name: &str| {
        column(name).ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
    };
    let passes_col = required(PASSES_COLUMN)?;
    let per_col = required(PASSES_PER_POSSESSION_COLUMN)?;
    let duration_col = column(DURATION_COLUMN);
    let team_col = column(TEAM_COLUMN);

    let wanted = normalize_name(team);
    let mut out = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let row_team = team_col.and_then(|c| row.get(c)).unwrap_or("");
        if !row_team.is_empty() && normalize_name(row_team) != wanted {
            continue;
        }
        let mut cell = |idx: Option<usize>, field: &str| {
            let raw = idx.and_then(|i| row.get(i))?;
            match parse_numeric(field, raw) {
                Ok(value) => value,
                Err(issue) => {
                    issues.push(issue);
                    None
                }
            }
        };
        let passes = cell(Some(passes_col), PASSES_COLUMN);
        let avg_passes_per_possession = cell(Some(per_col), PASSES_PER_POSSESSION_COLUMN);
        let duration = cell(duration_col, DURATION_COLUMN);
        out.push(TeamMatchTally {
            team: team.to_string(),
            passes,
            avg_passes_per_possession,
            duration,
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/team_stats.rs"]
mod tests;
