use std::collections::BTreeSet;

const PADJ_PREFIX: &str = "padj ";

/// Coarse unit of a raw field, read from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Per90,
    Percentage,
    /// "% better than position" style fields; only ever matched exactly.
    Relative,
    Plain,
}

pub fn metric_kind(name: &str) -> MetricKind {
    let lower = name.to_lowercase();
    if lower.contains("better than") {
        return MetricKind::Relative;
    }
    if lower.contains('%') || lower.contains("percent") {
        return MetricKind::Percentage;
    }
    if lower.contains("per 90") || lower.contains("per90") {
        return MetricKind::Per90;
    }
    if lower.contains("won") || lower.contains("accurate") {
        return MetricKind::Percentage;
    }
    MetricKind::Plain
}

pub fn is_percentage(name: &str) -> bool {
    matches!(metric_kind(name), MetricKind::Percentage | MetricKind::Relative)
}

pub fn is_padj(name: &str) -> bool {
    name.trim().to_lowercase().starts_with(PADJ_PREFIX)
}

pub fn padj_name(field: &str) -> String {
    format!("PAdj {field}")
}

/// Lowercase and strip unit suffixes and the possession prefix.
pub fn normalize_metric_name(name: &str) -> String {
    let mut s = name.to_lowercase();
    for pat in [
        " per 90",
        " per90",
        " won, %",
        " won %",
        " won",
        "accurate, %",
        "accurate %",
        " accurate",
        ", %",
        " %",
    ] {
        s = s.replace(pat, "");
    }
    let s = s.trim_start();
    let s = s.strip_prefix(PADJ_PREFIX).unwrap_or(s);
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized name with each token singularised, so "shot blocked" and
/// "shots blocked" share a base.
pub fn base_metric_name(name: &str) -> String {
    normalize_metric_name(name)
        .split_whitespace()
        .map(singular)
        .collect::<Vec<_>>()
        .join(" ")
}

fn singular(token: &str) -> &str {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        &token[..token.len() - 1]
    } else {
        token
    }
}

pub fn name_tokens(name: &str) -> BTreeSet<String> {
    normalize_metric_name(name)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
