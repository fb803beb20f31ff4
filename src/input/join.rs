use std::collections::BTreeMap;

use crate::model::record::{PlayerRecord, RecordSet, normalize_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinStats {
    pub matched: usize,
    pub name_only: usize,
    pub unmatched: usize,
    pub fields_copied: usize,
}

/// Merges `extra` into `primary`: rows are matched on normalised
/// (player, team), then on player name alone. Only fields the primary row
/// lacks, or holds as missing, are copied.
pub fn join_sources(primary: &mut RecordSet, extra: &RecordSet) -> JoinStats {
    let mut by_identity: BTreeMap<(String, String), &PlayerRecord> = BTreeMap::new();
    let mut by_name: BTreeMap<String, &PlayerRecord> = BTreeMap::new();
    for record in &extra.records {
        by_identity.entry(record.identity_key()).or_insert(record);
        by_name
            .entry(normalize_name(&record.player))
            .or_insert(record);
    }

    let mut stats = JoinStats::default();
    for record in primary.records.iter_mut() {
        let source = match by_identity.get(&record.identity_key()) {
            Some(found) => {
                stats.matched += 1;
                *found
            }
            None => match by_name.get(&normalize_name(&record.player)) {
                Some(found) => {
                    stats.name_only += 1;
                    *found
                }
                None => {
                    stats.unmatched += 1;
                    continue;
                }
            },
        };
        for (field, value) in &source.fields {
            if record.get(field).is_none() && value.is_some() {
                record.set(field, *value);
                stats.fields_copied += 1;
            }
        }
    }

    for name in extra.catalog.names() {
        primary.catalog.insert(name);
    }
    stats
}
