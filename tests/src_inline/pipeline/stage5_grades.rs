use super::*;

fn result(player: &str, team: &str, total: f64) -> ScoreResult {
    ScoreResult {
        player: player.to_string(),
        team: team.to_string(),
        conference: "ACC".to_string(),
        year: 2025,
        core_score_raw: total,
        specific_score_raw: 0.0,
        total_score_raw: total,
        total_percentile: 0.0,
        total_score_1_to_10: 1.0,
        grade: Grade::F,
    }
}

fn spaced_pool() -> Vec<Option<f64>> {
    (1..=10).map(|i| Some(i as f64 / 10.0)).collect()
}

#[test]
fn test_percentile_goals_scenario() {
    let (pct, score, grade) = assign_grade(Some(0.5), &spaced_pool(), GradeStrategy::PercentileGrade);
    assert!((pct - 50.0).abs() < 1e-9);
    assert!((score - 5.0).abs() < 1e-9);
    assert_eq!(grade, Grade::F);
}

#[test]
fn test_percentile_missing_and_empty() {
    assert_eq!(percentile(None, &spaced_pool()), 0.0);
    assert_eq!(percentile(Some(1.0), &[None, None]), 0.0);
    assert_eq!(percentile(Some(1.0), &[Some(1.0), None]), 100.0);
}

#[test]
fn test_duplicated_pool_keeps_percentiles() {
    let pool = vec![Some(3.0), Some(1.0), Some(4.0), Some(1.0), Some(5.0), Some(9.0)];
    let mut doubled = pool.clone();
    doubled.extend(pool.iter().copied());
    for x in [0.5, 1.0, 2.0, 4.0, 9.0, 12.0] {
        let a = percentile(Some(x), &pool);
        let b = percentile(Some(x), &doubled);
        assert!((a - b).abs() < 1e-9);
        assert_eq!(
            assign_grade(Some(x), &pool, GradeStrategy::PercentileGrade).2,
            assign_grade(Some(x), &doubled, GradeStrategy::PercentileGrade).2
        );
    }
}

#[test]
fn test_scoped_grades_and_small_pools() {
    let current = vec![
        result("a", "Duke", 0.9),
        result("b", "Duke", 0.3),
        result("c", "Clemson", 0.6),
    ];
    let history: Vec<ScoreResult> = (1..=10)
        .map(|i| result(&format!("h{i}"), "Old", i as f64 / 10.0))
        .collect();
    let pools = GradePools::from_scores(&current, &history);
    let out = compute_grades(&current, &pools, GradeStrategy::PercentileGrade, 2);

    assert_eq!(out.grades[0].team, Some(Grade::A));
    assert_eq!(out.grades[1].team, Some(Grade::F));
    assert_eq!(out.grades[2].team, None);
    assert_eq!(out.grades[0].conference, Some(Grade::A));
    assert_eq!(out.grades[1].conference, Some(Grade::F));
    assert_eq!(out.grades[2].conference, Some(Grade::D));
    assert_eq!(out.grades[0].power_five, Some(Grade::A));
    assert_eq!(out.grades[2].power_five, Some(Grade::D));

    assert_eq!(out.issues.len(), 1);
    match &out.issues[0] {
        Issue::InsufficientPool { player, scope, size, required } => {
            assert_eq!(player, "c");
            assert_eq!(scope, "team");
            assert_eq!(*size, 1);
            assert_eq!(*required, 2);
        }
        other => panic!("unexpected issue {other:?}"),
    }
}

#[test]
fn test_empty_power_five_pool_is_ungraded() {
    let current = vec![result("a", "Duke", 0.9), result("b", "Duke", 0.3)];
    let pools = GradePools::from_scores(&current, &[]);
    let out = compute_grades(&current, &pools, GradeStrategy::DirectScoreGrade, 2);
    assert!(out.grades.iter().all(|g| g.power_five.is_none()));
    assert!(out.grades.iter().all(|g| g.conference.is_some()));
}
