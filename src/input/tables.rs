use std::path::Path;

use crate::error::{InputError, Issue};
use crate::model::record::{FieldCatalog, PlayerRecord, RecordSet, parse_numeric};

pub const PLAYER_COLUMN: &str = "Player";
pub const TEAM_COLUMNS: &[&str] = &["Team", "Team within selected timeframe"];
pub const POSITION_COLUMN: &str = "Position";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub conference: String,
    pub source_key: String,
    pub year: u32,
}

/// Splits `ACC All Positions 2025` into conference, source key and year.
pub fn parse_table_name(stem: &str) -> Option<TableName> {
    let tokens: Vec<&str> = stem.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    let year: u32 = tokens[tokens.len() - 1].parse().ok()?;
    if !(1900..=2100).contains(&year) {
        return None;
    }
    Some(TableName {
        conference: tokens[0].to_ascii_uppercase(),
        source_key: tokens[1..tokens.len() - 1].join(" "),
        year,
    })
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Reads one player export. Identity columns are taken as text; every other
/// column becomes a numeric field unless none of its cells parse, in which
/// case it is a text column and skipped.
pub fn read_player_table(
    path: &Path,
    conference: &str,
    year: u32,
) -> Result<(RecordSet, Vec<Issue>), InputError> {
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
    let player_col =
        find_column(&headers, PLAYER_COLUMN).ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column: PLAYER_COLUMN.to_string(),
        })?;
    let team_col = TEAM_COLUMNS
        .iter()
        .find_map(|name| find_column(&headers, name));
    let position_col = find_column(&headers, POSITION_COLUMN);

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(csv_err)?;

    let identity = |idx: usize| {
        idx == player_col || Some(idx) == team_col || Some(idx) == position_col
    };
    let numeric_cols: Vec<usize> = (0..headers.len())
        .filter(|&idx| !identity(idx) && !headers[idx].trim().is_empty())
        .filter(|&idx| is_numeric_column(&rows, idx))
        .collect();
    let catalog = FieldCatalog::from_names(numeric_cols.iter().map(|&idx| headers[idx].trim()));

    let mut issues = Vec::new();
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let player = row.get(player_col).unwrap_or("");
        if player.is_empty() {
            continue;
        }
        let team = team_col.and_then(|c| row.get(c)).unwrap_or("");
        let mut record = PlayerRecord::new(player, team, conference, year);
        if let Some(col) = position_col {
            record.positions = row
                .get(col)
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        for &idx in &numeric_cols {
            let field = headers[idx].trim();
            let value = match parse_numeric(field, row.get(idx).unwrap_or("")) {
                Ok(v) => v,
                Err(issue) => {
                    issues.push(issue);
                    None
                }
            };
            record.set(field, value);
        }
        records.push(record);
    }
    Ok((RecordSet::with_catalog(records, catalog), issues))
}

fn is_numeric_column(rows: &[csv::StringRecord], idx: usize) -> bool {
    let mut any_value = false;
    for row in rows {
        let cell = row.get(idx).unwrap_or("");
        match parse_numeric("", cell) {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(_) => any_value = true,
        }
    }
    !any_value
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tables.rs"]
mod tests;
