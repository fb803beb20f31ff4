use crate::report::{ProfileSummary, SummaryData, format_f64_3};

pub fn render_report_text(data: &SummaryData) -> String {
    let mut out = String::new();

    out.push_str("Player Scoring & Grading Report\n");
    out.push_str("===============================\n\n");

    out.push_str(&format!(
        "Conference: {}\nSeason: {}\n",
        data.conference, data.current_year
    ));
    out.push_str(&format!(
        "Grade strategies: score={}, scopes={}\n",
        data.score_grade, data.scope_grade
    ));
    out.push_str(&format!(
        "Possession adjustment: {}\n",
        if data.possession_adjust { "on" } else { "off" }
    ));
    if let Some(variant) = &data.accuracy_variant {
        out.push_str(&format!("Accuracy weighting: {variant}\n"));
    }
    out.push('\n');

    for (i, profile) in data.profiles.iter().enumerate() {
        render_profile(&mut out, i + 1, profile);
    }

    if !data.config_errors.is_empty() || !data.input_issues.is_empty() {
        out.push_str("Input and configuration problems\n");
        for err in &data.config_errors {
            out.push_str(&format!("- {err}\n"));
        }
        for (kind, count) in &data.input_issues {
            out.push_str(&format!("- {kind}: {count}\n"));
        }
    }

    out
}

fn render_profile(out: &mut String, index: usize, p: &ProfileSummary) {
    out.push_str(&format!("{index}. {}\n", p.display_name));
    out.push_str(&format!("Players scored: {}\n", p.n_players));
    out.push_str(&format!("Coverage: {}\n", p.coverage));
    if !p.unresolved_metrics.is_empty() {
        out.push_str(&format!(
            "Unresolved metrics: {}\n",
            p.unresolved_metrics.join(", ")
        ));
    }
    if !p.partial_metrics.is_empty() {
        out.push_str(&format!(
            "Partially resolved composites: {}\n",
            p.partial_metrics.join(", ")
        ));
    }
    out.push_str(&format!(
        "Pools: normalization={}, power_five={}\n",
        p.normalization_pool, p.power_five_pool
    ));
    out.push_str(&format!(
        "TotalScoreRaw median: {} (p10 {}, p90 {})\n",
        format_f64_3(p.total_score_raw.median),
        format_f64_3(p.total_score_raw.p10),
        format_f64_3(p.total_score_raw.p90)
    ));
    for (scope, counts) in &p.grades {
        let line: Vec<String> = counts.iter().map(|(g, n)| format!("{g}={n}")).collect();
        out.push_str(&format!("{scope} grades: {}\n", line.join(" ")));
    }
    out.push_str(&format!(
        "Players with an elite metric: {}\n",
        format_f64_3(p.elite_fraction)
    ));
    out.push_str(&format!("Shortlisted: {}\n", p.shortlisted));
    out.push_str(&format!("{}\n\n", coverage_statement(p)));
}

fn coverage_statement(p: &ProfileSummary) -> &'static str {
    if p.metrics_total == 0 || p.n_players == 0 {
        return "Nothing to grade for this profile.";
    }
    let ratio = p.metrics_resolved as f64 / p.metrics_total as f64;
    if ratio >= 1.0 {
        "All configured metrics resolved."
    } else if ratio >= 0.75 {
        "Most metrics resolved; unresolved ones carry the low default."
    } else {
        "Low metric coverage; treat grades with caution."
    }
}
