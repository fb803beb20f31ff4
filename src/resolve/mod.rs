pub mod names;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::Issue;
use crate::model::metric::{MetricCategory, MetricDefinition};
use crate::model::profile::PositionProfile;
use crate::model::record::FieldCatalog;
use crate::resolve::names::{
    MetricKind, base_metric_name, is_padj, metric_kind, name_tokens, normalize_metric_name,
};

/// Matching strategies in the order they are tried; the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Exact,
    Normalized,
    BaseName,
    TokenSubset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub field: String,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent {
    pub configured: String,
    pub field: String,
    /// Weight after renormalising over the resolved components.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMetric {
    pub name: String,
    pub weight: f64,
    pub category: MetricCategory,
    pub components: Vec<ResolvedComponent>,
    pub unresolved: Vec<String>,
}

impl ResolvedMetric {
    pub fn is_resolved(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        self.is_resolved() && !self.unresolved.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResolutionAudit {
    pub profile_id: String,
    pub metrics_defined: usize,
    pub metrics_resolved: usize,
    pub partial_metrics: Vec<String>,
    pub unresolved_metrics: Vec<String>,
}

/// Maps configured metric names onto the fields of one catalog.
pub struct MetricResolver<'a> {
    catalog: &'a FieldCatalog,
}

impl<'a> MetricResolver<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve_name(&self, name: &str) -> Option<Resolution> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return None;
        }
        if let Some(field) = self.exact(wanted) {
            return Some(Resolution {
                field,
                strategy: Strategy::Exact,
            });
        }
        let kind = metric_kind(wanted);
        if kind == MetricKind::Relative {
            return None;
        }
        let padj = is_padj(wanted);
        let fields = self.candidates();

        let normalized = normalize_metric_name(wanted);
        let hits: Vec<&str> = fields
            .iter()
            .copied()
            .filter(|f| normalize_metric_name(f) == normalized && loose_kind_match(kind, f))
            .collect();
        if let Some(field) = prefer_padj(&hits, padj) {
            return Some(Resolution {
                field: field.to_string(),
                strategy: Strategy::Normalized,
            });
        }

        let base = base_metric_name(wanted);
        if let Some(field) = fields.iter().copied().find(|f| {
            base_metric_name(f) == base && strict_kind_match(kind, f) && is_padj(f) == padj
        }) {
            return Some(Resolution {
                field: field.to_string(),
                strategy: Strategy::BaseName,
            });
        }

        let tokens = name_tokens(wanted);
        if tokens.is_empty() {
            return None;
        }
        fields
            .iter()
            .copied()
            .find(|f| {
                let col = name_tokens(f);
                tokens_match(&tokens, &col) && strict_kind_match(kind, f) && is_padj(f) == padj
            })
            .map(|field| Resolution {
                field: field.to_string(),
                strategy: Strategy::TokenSubset,
            })
    }

    /// Resolves every component of a metric. Components that do not resolve
    /// are dropped and the remaining weights are renormalised to sum to 1.0.
    pub fn resolve_metric(&self, metric: &MetricDefinition) -> ResolvedMetric {
        let mut components = Vec::with_capacity(metric.components.len());
        let mut unresolved = Vec::new();
        for comp in &metric.components {
            match self.resolve_name(&comp.name) {
                Some(res) => components.push(ResolvedComponent {
                    configured: comp.name.clone(),
                    field: res.field,
                    weight: comp.weight,
                }),
                None => unresolved.push(comp.name.clone()),
            }
        }
        let total: f64 = components.iter().map(|c| c.weight).sum();
        if total > 0.0 {
            for comp in components.iter_mut() {
                comp.weight /= total;
            }
        } else if !components.is_empty() {
            let even = 1.0 / components.len() as f64;
            for comp in components.iter_mut() {
                comp.weight = even;
            }
        }
        ResolvedMetric {
            name: metric.name.clone(),
            weight: metric.weight,
            category: metric.category,
            components,
            unresolved,
        }
    }

    pub fn resolve_profile(
        &self,
        profile: &PositionProfile,
    ) -> (Vec<ResolvedMetric>, ResolutionAudit) {
        let resolved: Vec<ResolvedMetric> =
            profile.metrics().map(|m| self.resolve_metric(m)).collect();

        let mut audit = ResolutionAudit {
            profile_id: profile.id.clone(),
            metrics_defined: resolved.len(),
            ..ResolutionAudit::default()
        };
        for metric in &resolved {
            if metric.is_resolved() {
                audit.metrics_resolved += 1;
            } else {
                audit.unresolved_metrics.push(metric.name.clone());
            }
            if metric.is_partial() {
                audit.partial_metrics.push(metric.name.clone());
            }
            for comp in &metric.components {
                debug!(
                    metric = %metric.name,
                    component = %comp.configured,
                    field = %comp.field,
                    "resolved"
                );
            }
        }
        (resolved, audit)
    }

    fn exact(&self, wanted: &str) -> Option<String> {
        if self.catalog.contains(wanted) {
            return Some(wanted.to_string());
        }
        self.catalog
            .names()
            .iter()
            .find(|f| f.trim().eq_ignore_ascii_case(wanted))
            .cloned()
    }

    fn candidates(&self) -> Vec<&'a str> {
        self.catalog
            .names()
            .iter()
            .map(String::as_str)
            .filter(|f| metric_kind(f) != MetricKind::Relative)
            .collect()
    }
}

/// Issues for every metric (or composite component) left unresolved.
pub fn unresolved_issues(resolved: &[ResolvedMetric]) -> Vec<Issue> {
    let mut issues = Vec::new();
    for metric in resolved {
        for comp in &metric.unresolved {
            issues.push(Issue::UnresolvedMetric {
                metric: metric.name.clone(),
                component: Some(comp.clone()),
            });
        }
    }
    issues
}

fn loose_kind_match(kind: MetricKind, field: &str) -> bool {
    match kind {
        MetricKind::Plain => true,
        other => metric_kind(field) == other,
    }
}

fn strict_kind_match(kind: MetricKind, field: &str) -> bool {
    metric_kind(field) == kind
}

fn prefer_padj<'f>(hits: &[&'f str], padj: bool) -> Option<&'f str> {
    hits.iter()
        .copied()
        .find(|f| is_padj(f) == padj)
        .or_else(|| hits.first().copied())
}

fn tokens_match(wanted: &BTreeSet<String>, col: &BTreeSet<String>) -> bool {
    if col.is_empty() {
        return false;
    }
    if wanted.len() == 1 || col.len() == 1 {
        return wanted == col;
    }
    wanted.is_subset(col) || col.is_subset(wanted)
}

#[cfg(test)]
#[path = "../../tests/src_inline/resolve/mod.rs"]
mod tests;
