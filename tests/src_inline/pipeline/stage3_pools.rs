use super::*;
use crate::model::metric::{MetricCategory, MetricDefinition};
use crate::model::record::FieldCatalog;

fn profile() -> PositionProfile {
    PositionProfile {
        id: "Center Back".to_string(),
        display_name: "Center Back".to_string(),
        source_key: "CB".to_string(),
        position_tags: vec!["CB".to_string(), "LCB".to_string(), "RCB".to_string()],
        core: vec![MetricDefinition::simple(
            "Interceptions per 90",
            1.0,
            MetricCategory::Core,
        )],
        specific: Vec::new(),
        display_metrics: Vec::new(),
    }
}

fn table(conference: &str, year: u32, values: &[(&str, &str, Option<f64>)]) -> RecordSet {
    let records = values
        .iter()
        .map(|(name, pos, v)| {
            PlayerRecord::new(name, "Team", conference, year)
                .with_positions(&[pos])
                .with_field("Interceptions per 90", *v)
        })
        .collect();
    RecordSet::with_catalog(records, FieldCatalog::from_names(["Interceptions per 90"]))
}

fn tables() -> TableSet {
    let mut set = TableSet::default();
    set.insert(
        TableKey::new("acc", 2024),
        table("ACC", 2024, &[("a", "CB", Some(1.0)), ("b", "RCB", Some(2.0))]),
    );
    set.insert(
        TableKey::new("ACC", 2025),
        table(
            "ACC",
            2025,
            &[
                ("c", "LCB", Some(3.0)),
                ("d", "CF", Some(9.0)),
                ("e", "CB", Some(0.0)),
                ("f", "CB", None),
            ],
        ),
    );
    set.insert(
        TableKey::new("SEC", 2025),
        table("SEC", 2025, &[("g", "CB", Some(4.0))]),
    );
    set.insert(
        TableKey::new("PAC12", 2025),
        table("PAC12", 2025, &[("h", "CB", Some(5.0))]),
    );
    set
}

#[test]
fn test_filter_drops_other_positions_and_empty_rows() {
    let t = tables();
    let (kept, by_position, empty) = filter_for_profile(&profile(), t.get(&TableKey::new("ACC", 2025)).unwrap());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.records[0].player, "c");
    assert_eq!(by_position, 1);
    assert_eq!(empty, 2);
}

#[test]
fn test_normalization_pool_spans_conference_years() {
    let t = tables();
    let p = profile();
    let cfg = EngineConfig::default_v1();
    let baseline = PossessionBaseline::default();
    let cache = PoolCache::new();
    let builder = ReferencePoolBuilder::new(&p, &t, &baseline, &cfg, &cache);
    let pool = builder.normalization_pool("acc");
    assert_eq!(pool.scope, PoolScope::Normalization);
    let names: Vec<&str> = pool.records().iter().map(|r| r.player.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "h", "g"]);
    assert_eq!(cache.len(), 4);

    let again = builder.normalization_pool("ACC");
    assert_eq!(again.len(), 5);
    assert_eq!(cache.len(), 4);
}

#[test]
fn test_other_conference_current_season_widens_range() {
    let t = tables();
    let p = profile();
    let cfg = EngineConfig::default_v1();
    let baseline = PossessionBaseline::default();
    let cache = PoolCache::new();
    let builder = ReferencePoolBuilder::new(&p, &t, &baseline, &cfg, &cache);

    let pool = builder.normalization_pool("ACC");
    assert!(pool.records().iter().any(|r| r.conference == "SEC" && r.year == 2025));
    assert!(pool.records().iter().all(|r| r.conference == "ACC" || r.year == 2025));
    let max = pool
        .records()
        .iter()
        .filter_map(|r| r.get("Interceptions per 90"))
        .fold(f64::NEG_INFINITY, f64::max);
    // ACC alone tops out at 3.0; SEC and PAC12 current seasons reach 5.0.
    assert_eq!(max, 5.0);
}

#[test]
fn test_current_season_pool_spans_conferences() {
    let t = tables();
    let p = profile();
    let cfg = EngineConfig::default_v1();
    let baseline = PossessionBaseline::default();
    let cache = PoolCache::new();
    let builder = ReferencePoolBuilder::new(&p, &t, &baseline, &cfg, &cache);
    let pool = builder.current_season_pool();
    assert_eq!(pool.label, "current_2025");
    assert_eq!(pool.len(), 3);
    assert!(pool.records().iter().all(|r| r.year == 2025));
}

#[test]
fn test_power_five_batches_skip_untracked_conferences() {
    let t = tables();
    let p = profile();
    let cfg = EngineConfig::default_v1();
    let baseline = PossessionBaseline::default();
    let cache = PoolCache::new();
    let builder = ReferencePoolBuilder::new(&p, &t, &baseline, &cfg, &cache);
    let batches = builder.power_five_batches();
    assert_eq!(batches.len(), 2);

    let (first, first_ref) = &batches[0];
    assert_eq!(first.label, "power_five_2024");
    assert_eq!(first.len(), 2);
    assert_eq!(first_ref.len(), 2);

    let (second, second_ref) = &batches[1];
    assert_eq!(second.len(), 2);
    assert!(second.records().iter().all(|r| r.conference != "PAC12"));
    assert_eq!(second_ref.len(), 2);
    assert!(second_ref.records().iter().all(|r| r.year == 2024));
}
