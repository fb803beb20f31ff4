use super::*;
use crate::pipeline::stage3_pools::PoolScope;

#[test]
fn test_tolerance_band() {
    assert_eq!(classify(10.05, 10.0, DEFAULT_TOLERANCE), Classification::At);
    assert_eq!(classify(10.2, 10.0, DEFAULT_TOLERANCE), Classification::Above);
    assert_eq!(classify(9.8, 10.0, DEFAULT_TOLERANCE), Classification::Below);
    assert_eq!(classify(-1.0, -10.0, DEFAULT_TOLERANCE), Classification::Above);
}

#[test]
fn test_classification_is_monotone() {
    let rank = |c: Classification| match c {
        Classification::Below => 0,
        Classification::At => 1,
        Classification::Above => 2,
    };
    let mut prev = 0;
    for i in 0..=400 {
        let v = 8.0 + i as f64 * 0.01;
        let r = rank(classify(v, 10.0, DEFAULT_TOLERANCE));
        assert!(r >= prev);
        prev = r;
    }
    assert_eq!(prev, 2);
}

fn record(name: &str, values: &[(&str, Option<f64>)]) -> PlayerRecord {
    values
        .iter()
        .fold(PlayerRecord::new(name, "T", "ACC", 2025), |r, (f, v)| r.with_field(f, *v))
}

fn pool() -> ReferencePool {
    let records = vec![
        record("a", &[("Shots per 90", Some(1.0)), ("Interceptions", Some(2.0)), ("Sliding tackles", Some(1.0)), ("Goals per 90", Some(0.0))]),
        record("b", &[("Shots per 90", Some(3.0)), ("Interceptions", Some(4.0)), ("Sliding tackles", None), ("Goals per 90", Some(0.0))]),
        record("c", &[("Shots per 90", None), ("Interceptions", Some(6.0)), ("Sliding tackles", Some(3.0)), ("Goals per 90", Some(0.0))]),
    ];
    ReferencePool {
        scope: PoolScope::PowerFive,
        label: "power_five".to_string(),
        set: RecordSet::with_catalog(
            records,
            FieldCatalog::from_names(["Shots per 90", "Interceptions", "Sliding tackles", "Goals per 90"]),
        ),
    }
}

fn metrics() -> Vec<DisplayMetric> {
    vec![
        DisplayMetric::single("Shots per 90"),
        DisplayMetric::combined("Interceptions + Sliding Tackles", &["Interceptions", "Sliding tackles"]),
        DisplayMetric::single("Goals per 90"),
    ]
}

#[test]
fn test_pool_averages() {
    let avg = PoolAverages::from_pool(&pool(), &metrics());
    assert!((avg.get("Shots per 90").unwrap() - 2.0).abs() < 1e-12);
    assert!((avg.get("Interceptions + Sliding Tackles").unwrap() - 6.0).abs() < 1e-12);
    assert_eq!(avg.get("Goals per 90"), Some(0.0));
}

#[test]
fn test_consistency_counts() {
    let averages = PoolAverages::from_pool(&pool(), &metrics());
    let records = RecordSet::with_catalog(
        vec![
            record("x", &[("Shots per 90", Some(1.0)), ("Interceptions", Some(5.0)), ("Sliding tackles", Some(2.0)), ("Goals per 90", Some(1.0))]),
            record("y", &[("Shots per 90", None), ("Interceptions", Some(6.0)), ("Sliding tackles", None), ("Goals per 90", Some(1.0))]),
            record("z", &[("Shots per 90", None), ("Interceptions", None), ("Sliding tackles", None), ("Goals per 90", None)]),
        ],
        FieldCatalog::from_names(["Shots per 90", "Interceptions", "Sliding tackles", "Goals per 90"]),
    );
    let out = compute_consistency(&records, &metrics(), &averages, DEFAULT_TOLERANCE);

    let x = &out[0];
    assert_eq!(x.total_checked, 2);
    assert_eq!(x.above, 1);
    assert_eq!(x.below, 1);
    assert_eq!(x.below_metrics, vec!["Shots per 90".to_string()]);
    assert!((x.consistency_pct - 50.0).abs() < 1e-9);
    assert!((x.consistency_score - 50.0).abs() < 1e-9);

    let y = &out[1];
    assert_eq!(y.total_checked, 1);
    assert_eq!(y.at, 1);
    assert!((y.consistency_score - 100.0).abs() < 1e-9);
    assert_eq!(y.consistency_pct, 0.0);

    assert_eq!(out[2].total_checked, 0);
    assert_eq!(out[2].consistency_score, 0.0);
}
