use super::*;

fn some(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| Some(*v)).collect()
}

#[test]
fn test_outputs_within_unit_interval() {
    let n = Normalizer::new(PercentageFastPath::PercentageMetricsOnly, 0.1);
    let reference = some(&[-3.0, 0.0, 2.5, 17.0, 250.0]);
    let out = n.normalize("Progressive runs per 90", &reference, &reference);
    for v in &out {
        assert!((0.0..=1.0).contains(v));
    }
    assert_eq!(out[0], 0.0);
    assert_eq!(out[4], 1.0);
}

#[test]
fn test_constant_series_maps_to_half() {
    let n = Normalizer::new(PercentageFastPath::PercentageMetricsOnly, 0.1);
    let reference = some(&[4.0, 4.0, 4.0]);
    let out = n.normalize("Shots per 90", &reference, &reference);
    assert_eq!(out, vec![0.5, 0.5, 0.5]);
}

#[test]
fn test_per90_in_unit_range_uses_min_max() {
    let n = Normalizer::new(PercentageFastPath::PercentageMetricsOnly, 0.1);
    let reference = some(&[0.0, 1.0]);
    let v = n.normalize("Goals per 90", &[Some(0.5)], &reference);
    assert!((v[0] - 0.5).abs() < 1e-12);
}

#[test]
fn test_percentage_fast_path() {
    let n = Normalizer::new(PercentageFastPath::PercentageMetricsOnly, 0.1);
    let reference = some(&[40.0, 60.0, 80.0]);
    let v = n.normalize("Accurate passes, %", &[Some(60.0)], &reference);
    assert!((v[0] - 0.6).abs() < 1e-12);

    let legacy = Normalizer::new(PercentageFastPath::AnyBoundedSeries, 0.1);
    let v = legacy.normalize("Shots per 90", &[Some(2.0)], &some(&[1.0, 2.0, 3.0]));
    assert!((v[0] - 0.02).abs() < 1e-12);
}

#[test]
fn test_missing_gets_low_default() {
    let n = Normalizer::new(PercentageFastPath::PercentageMetricsOnly, 0.1);
    let reference = some(&[1.0, 5.0]);
    let v = n.normalize("Shots per 90", &[None, Some(5.0)], &reference);
    assert_eq!(v, vec![0.1, 1.0]);

    let v = n.normalize("Shots per 90", &[Some(3.0)], &[None, None]);
    assert_eq!(v, vec![0.1]);
}
