use super::*;
use crate::model::results::{ConsistencyResult, MetricEliteFlag, ScoreResult, TopKResult};
use crate::pipeline::PlayerReport;

fn player(name: &str, total: f64, grade: Grade, elite: bool, shortlisted: bool) -> PlayerReport {
    PlayerReport {
        score: ScoreResult {
            player: name.to_string(),
            team: "Alpha FC".to_string(),
            conference: "ACC".to_string(),
            year: 2025,
            core_score_raw: total / 2.0,
            specific_score_raw: total / 2.0,
            total_score_raw: total,
            total_percentile: 50.0,
            total_score_1_to_10: 5.0,
            grade,
        },
        grades: GradeSet {
            team: Some(grade),
            conference: Some(grade),
            power_five: None,
        },
        top_k: TopKResult {
            player: name.to_string(),
            flags: vec![MetricEliteFlag {
                metric: "Goals per 90".to_string(),
                value: Some(total),
                elite,
                rank: 1,
                pool_size: 2,
            }],
            elite_count: usize::from(elite),
        },
        consistency: ConsistencyResult {
            above: 1,
            below: 1,
            at: 0,
            total_checked: 2,
            consistency_pct: 50.0,
            consistency_score: 5.0,
            below_metrics: vec!["Shots per 90".to_string()],
        },
        minutes_share: Some(82.5),
        shortlisted,
        previous_year: shortlisted.then_some(2024),
        previous_score: shortlisted.then_some(6.5),
        change_from_previous: shortlisted.then_some(-1.5),
    }
}

fn sample_report() -> ProfileReport {
    ProfileReport {
        profile_id: "Striker".to_string(),
        display_name: "Striker".to_string(),
        conference: "ACC".to_string(),
        players: vec![
            player("A", 0.8, Grade::A, true, true),
            player("B", 0.2, Grade::D, false, false),
        ],
        ..ProfileReport::default()
    }
}

#[test]
fn test_build_summary_counts() {
    let reports = vec![sample_report()];
    let config = EngineConfig::default_v1();
    let input = ReportInput {
        reports: &reports,
        config: &config,
        conference: "ACC",
        input_issues: &[],
        config_errors: &[],
    };
    let summary = build_summary(&input);
    assert_eq!(summary.profiles.len(), 1);
    let p = &summary.profiles[0];
    assert_eq!(p.n_players, 2);
    assert_eq!(p.shortlisted, 1);
    assert_eq!(p.elite_fraction, 0.5);
    assert_eq!(p.grades["total"]["A"], 1);
    assert_eq!(p.grades["total"]["D"], 1);
    assert_eq!(p.grades["power_five"]["ungraded"], 2);
}

#[test]
fn test_write_reports_files() {
    let dir = tempfile::tempdir().unwrap();
    let reports = vec![sample_report()];
    let config = EngineConfig::default_v1();
    let input = ReportInput {
        reports: &reports,
        config: &config,
        conference: "ACC",
        input_issues: &[],
        config_errors: &[],
    };
    write_reports(&input, dir.path()).unwrap();

    let tsv = std::fs::read_to_string(dir.path().join("scores.tsv")).unwrap();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("profile\tplayer\tteam"));
    let first: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(first.len(), SCORE_HEADER.len());
    assert_eq!(first[1], "A");
    assert_eq!(first[15], "Goals per 90");
    assert_eq!(first[first.len() - 1], "yes");
    let column = |name: &str| SCORE_HEADER.iter().position(|h| *h == name).unwrap();
    assert_eq!(first[column("previous_year")], "2024");
    assert_eq!(first[column("previous_score")], "6.50");
    assert_eq!(first[column("change_from_previous")], "-1.50");
    let second: Vec<&str> = lines[2].split('\t').collect();
    assert_eq!(second[column("previous_year")], "");
    assert_eq!(second[column("change_from_previous")], "");

    let json = std::fs::read_to_string(dir.path().join("summary.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["profiles"][0]["profile"], "Striker");

    let text = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(text.contains("1. Striker"));
}
