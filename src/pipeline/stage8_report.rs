use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Issue, RunError};
use crate::model::config::EngineConfig;
use crate::model::grades::{Grade, grade_order};
use crate::model::results::GradeSet;
use crate::pipeline::ProfileReport;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{ProfileSummary, ScoreStats, SummaryData, bool_fraction};

pub struct ReportInput<'a> {
    pub reports: &'a [ProfileReport],
    pub config: &'a EngineConfig,
    pub conference: &'a str,
    pub input_issues: &'a [Issue],
    pub config_errors: &'a [ConfigError],
}

pub fn write_reports(input: &ReportInput<'_>, out_dir: &Path) -> Result<(), RunError> {
    fs::create_dir_all(out_dir).map_err(|source| RunError::Output {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let scores_path = out_dir.join("scores.tsv");
    write_scores_tsv(input.reports, &scores_path)?;

    let summary = build_summary(input);
    let summary_path = out_dir.join("summary.json");
    let json = render_summary_json(&summary).map_err(|e| RunError::Encode {
        path: summary_path.clone(),
        message: e.to_string(),
    })?;
    write_text(&summary_path, &json)?;

    let report_path = out_dir.join("report.txt");
    write_text(&report_path, &render_report_text(&summary))?;
    Ok(())
}

const SCORE_HEADER: &[&str] = &[
    "profile",
    "player",
    "team",
    "conference",
    "year",
    "core_score_raw",
    "specific_score_raw",
    "total_score_raw",
    "total_percentile",
    "total_score_1_10",
    "grade",
    "team_grade",
    "conference_grade",
    "power_five_grade",
    "elite_count",
    "elite_metrics",
    "consistency_score",
    "consistency_pct",
    "metrics_above",
    "metrics_below",
    "metrics_at",
    "below_metrics",
    "previous_year",
    "previous_score",
    "change_from_previous",
    "minutes_share",
    "shortlisted",
];

fn write_scores_tsv(reports: &[ProfileReport], path: &Path) -> Result<(), RunError> {
    let encode = |e: csv::Error| RunError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut w = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(encode)?;
    w.write_record(SCORE_HEADER).map_err(encode)?;
    for report in reports {
        for p in &report.players {
            let s = &p.score;
            let elite: Vec<&str> = p.top_k.elite_metrics().collect();
            let row = vec![
                report.profile_id.clone(),
                s.player.clone(),
                s.team.clone(),
                s.conference.clone(),
                s.year.to_string(),
                format!("{:.6}", s.core_score_raw),
                format!("{:.6}", s.specific_score_raw),
                format!("{:.6}", s.total_score_raw),
                format!("{:.2}", s.total_percentile),
                format!("{:.2}", s.total_score_1_to_10),
                s.grade.label().to_string(),
                grade_cell(p.grades.team),
                grade_cell(p.grades.conference),
                grade_cell(p.grades.power_five),
                p.top_k.elite_count.to_string(),
                elite.join("; "),
                format!("{:.1}", p.consistency.consistency_score),
                format!("{:.1}", p.consistency.consistency_pct),
                p.consistency.above.to_string(),
                p.consistency.below.to_string(),
                p.consistency.at.to_string(),
                p.consistency.below_metrics.join("; "),
                p.previous_year.map(|y| y.to_string()).unwrap_or_default(),
                p.previous_score
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_default(),
                p.change_from_previous
                    .map(|v| format!("{v:+.2}"))
                    .unwrap_or_default(),
                p.minutes_share
                    .map(|m| format!("{m:.1}"))
                    .unwrap_or_default(),
                if p.shortlisted { "yes" } else { "no" }.to_string(),
            ];
            w.write_record(&row).map_err(encode)?;
        }
    }
    w.flush().map_err(|source| RunError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn grade_cell(grade: Option<Grade>) -> String {
    grade.map(|g| g.label().to_string()).unwrap_or_default()
}

pub fn build_summary(input: &ReportInput<'_>) -> SummaryData {
    let profiles = input.reports.iter().map(profile_summary).collect();
    let mut input_issues = BTreeMap::new();
    for issue in input.input_issues {
        *input_issues.entry(issue.kind().to_string()).or_insert(0) += 1;
    }
    SummaryData {
        tool: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        conference: input.conference.to_string(),
        current_year: input.config.current_year,
        accuracy_variant: input.config.accuracy_variant.map(|v| v.label().to_string()),
        score_grade: input.config.score_grade.label().to_string(),
        scope_grade: input.config.scope_grade.label().to_string(),
        possession_adjust: input.config.possession_adjust,
        input_issues,
        config_errors: input.config_errors.iter().map(|e| e.to_string()).collect(),
        profiles,
    }
}

fn profile_summary(report: &ProfileReport) -> ProfileSummary {
    let totals: Vec<f64> = report
        .players
        .iter()
        .map(|p| p.score.total_score_raw)
        .collect();
    let has_elite: Vec<bool> = report
        .players
        .iter()
        .map(|p| p.top_k.elite_count > 0)
        .collect();

    let mut grades = BTreeMap::new();
    grades.insert(
        "total".to_string(),
        grade_counts(report.players.iter().map(|p| Some(p.score.grade))),
    );
    let scoped: [(&str, fn(&GradeSet) -> Option<Grade>); 3] = [
        ("team", |g| g.team),
        ("conference", |g| g.conference),
        ("power_five", |g| g.power_five),
    ];
    for (name, pick) in scoped {
        grades.insert(
            name.to_string(),
            grade_counts(report.players.iter().map(|p| pick(&p.grades))),
        );
    }

    ProfileSummary {
        profile: report.profile_id.clone(),
        display_name: report.display_name.clone(),
        n_players: report.players.len(),
        coverage: report.diagnostics.coverage_label(),
        metrics_resolved: report.diagnostics.metrics_resolved,
        metrics_total: report.diagnostics.metrics_total,
        unresolved_metrics: report.diagnostics.unresolved_metrics(),
        partial_metrics: report.audit.partial_metrics.clone(),
        normalization_pool: report.normalization_pool_size,
        power_five_pool: report.power_five_pool_size,
        dropped_position: report.dropped_position,
        dropped_empty: report.dropped_empty,
        padj_fields: report.padj_fields,
        rebound_components: report.rebound_components,
        total_score_raw: ScoreStats::from_values(&totals),
        grades,
        elite_fraction: bool_fraction(&has_elite),
        shortlisted: report.players.iter().filter(|p| p.shortlisted).count(),
        issue_counts: report
            .diagnostics
            .issue_counts()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    }
}

fn grade_counts<I: Iterator<Item = Option<Grade>>>(grades: I) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = grade_order()
        .iter()
        .map(|g| (g.label().to_string(), 0))
        .collect();
    for grade in grades {
        let key = grade.map(|g| g.label()).unwrap_or("ungraded");
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

fn write_text(path: &Path, contents: &str) -> Result<(), RunError> {
    fs::write(path, contents).map_err(|source| RunError::Output {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage8_report.rs"]
mod tests;
