use std::collections::{BTreeMap, BTreeSet};

use crate::error::Issue;

/// One player's row: identity, position tags and raw numeric fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerRecord {
    pub player: String,
    pub team: String,
    pub conference: String,
    pub year: u32,
    pub positions: Vec<String>,
    pub fields: BTreeMap<String, Option<f64>>,
}

impl PlayerRecord {
    pub fn new(player: &str, team: &str, conference: &str, year: u32) -> Self {
        Self {
            player: player.to_string(),
            team: team.to_string(),
            conference: conference.to_string(),
            year,
            positions: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: Option<f64>) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn with_positions(mut self, positions: &[&str]) -> Self {
        self.positions = positions.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied().flatten()
    }

    pub fn set(&mut self, field: &str, value: Option<f64>) {
        self.fields.insert(field.to_string(), value);
    }

    /// Stable key used by the team/conference pools and joins.
    pub fn identity_key(&self) -> (String, String) {
        (normalize_name(&self.player), normalize_name(&self.team))
    }
}

/// Case and whitespace insensitive name form used for joins.
pub fn normalize_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Ordered union of the field names seen in one table set. Resolution runs
/// against this catalog, so first-hit order follows column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCatalog {
    names: Vec<String>,
    seen: BTreeSet<String>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for name in names {
            catalog.insert(name.as_ref());
        }
        catalog
    }

    pub fn from_records(records: &[PlayerRecord]) -> Self {
        let mut catalog = Self::new();
        for record in records {
            for name in record.fields.keys() {
                catalog.insert(name);
            }
        }
        catalog
    }

    pub fn insert(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.names.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Records of one (source key, conference, year) table group together with
/// their field catalog.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<PlayerRecord>,
    pub catalog: FieldCatalog,
}

impl RecordSet {
    pub fn new(records: Vec<PlayerRecord>) -> Self {
        let catalog = FieldCatalog::from_records(&records);
        Self { records, catalog }
    }

    pub fn with_catalog(records: Vec<PlayerRecord>, catalog: FieldCatalog) -> Self {
        Self { records, catalog }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extend(&mut self, other: RecordSet) {
        for name in other.catalog.names() {
            self.catalog.insert(name);
        }
        self.records.extend(other.records);
    }
}

/// Parses a raw cell. Blank cells and the usual placeholders are missing;
/// anything else that fails to parse is reported and treated as missing.
pub fn parse_numeric(field: &str, raw: &str) -> Result<Option<f64>, Issue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "-" | "nan" | "n/a" | "na" | "none" | "null" => return Ok(None),
        _ => {}
    }
    let cleaned = trimmed.trim_end_matches('%').replace(',', "");
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(Issue::InvalidNumericValue {
            field: field.to_string(),
            raw: raw.to_string(),
        }),
    }
}
