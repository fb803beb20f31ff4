use super::*;
use crate::model::metric::{MetricCategory, MetricDefinition};

fn catalog(names: &[&str]) -> FieldCatalog {
    FieldCatalog::from_names(names.iter().copied())
}

#[test]
fn test_exact_case_insensitive_first() {
    let cat = catalog(&["Player", "INTERCEPTIONS", "Interceptions per 90"]);
    let resolver = MetricResolver::new(&cat);
    let res = resolver.resolve_name("interceptions").unwrap();
    assert_eq!(res.field, "INTERCEPTIONS");
    assert_eq!(res.strategy, Strategy::Exact);
}

#[test]
fn test_suffix_normalized_match() {
    let cat = catalog(&["Player", "Interceptions per 90", "Duels won, %"]);
    let resolver = MetricResolver::new(&cat);
    let res = resolver.resolve_name("Interceptions").unwrap();
    assert_eq!(res.field, "Interceptions per 90");
    assert_eq!(res.strategy, Strategy::Normalized);
}

#[test]
fn test_single_token_does_not_match_longer_name() {
    let cat = catalog(&["Shots blocked per 90", "Sliding tackles per 90"]);
    let resolver = MetricResolver::new(&cat);
    assert!(resolver.resolve_name("Shots").is_none());
}

#[test]
fn test_per90_never_matches_percentage() {
    let cat = catalog(&["Aerial duels won, %"]);
    let resolver = MetricResolver::new(&cat);
    assert!(resolver.resolve_name("Aerial duels per 90").is_none());

    let cat = catalog(&["Aerial duels won, %", "Aerial duels per 90"]);
    let resolver = MetricResolver::new(&cat);
    let res = resolver.resolve_name("Aerial duels per 90").unwrap();
    assert_eq!(res.field, "Aerial duels per 90");
    let res = resolver.resolve_name("Aerial duels won, %").unwrap();
    assert_eq!(res.field, "Aerial duels won, %");
}

#[test]
fn test_base_name_singular_plural() {
    let cat = catalog(&["Shot blocked per 90"]);
    let resolver = MetricResolver::new(&cat);
    let res = resolver.resolve_name("Shots blocked per 90").unwrap();
    assert_eq!(res.field, "Shot blocked per 90");
    assert_eq!(res.strategy, Strategy::BaseName);
}

#[test]
fn test_token_subset_multi_word() {
    let cat = catalog(&["Passes to final third per 90"]);
    let resolver = MetricResolver::new(&cat);
    let res = resolver
        .resolve_name("Accurate passes to final third per 90")
        .map(|r| r.strategy);
    assert_eq!(res, Some(Strategy::TokenSubset));

    let cat = catalog(&["Progressive passes successful per 90"]);
    let resolver = MetricResolver::new(&cat);
    let res = resolver.resolve_name("Progressive passes per 90").unwrap();
    assert_eq!(res.strategy, Strategy::TokenSubset);
}

#[test]
fn test_padj_preferred_when_configured() {
    let cat = catalog(&["Interceptions per 90", "PAdj Interceptions per 90"]);
    let resolver = MetricResolver::new(&cat);
    let res = resolver.resolve_name("PAdj Interceptions").unwrap();
    assert_eq!(res.field, "PAdj Interceptions per 90");
    let res = resolver.resolve_name("Interceptions").unwrap();
    assert_eq!(res.field, "Interceptions per 90");
}

#[test]
fn test_relative_fields_only_match_exactly() {
    let cat = catalog(&["Progressive passes % better than position"]);
    let resolver = MetricResolver::new(&cat);
    assert!(resolver.resolve_name("Progressive passes").is_none());
    assert!(
        resolver
            .resolve_name("progressive passes % better than position")
            .is_some()
    );
}

#[test]
fn test_partial_composite_renormalizes() {
    let cat = catalog(&["A"]);
    let resolver = MetricResolver::new(&cat);
    let metric =
        MetricDefinition::composite("AB", 1.0, MetricCategory::Core, &[("A", 0.6), ("B", 0.4)]);
    let resolved = resolver.resolve_metric(&metric);
    assert!(resolved.is_partial());
    assert_eq!(resolved.components.len(), 1);
    assert!((resolved.components[0].weight - 1.0).abs() < 1e-12);
    assert_eq!(resolved.unresolved, vec!["B".to_string()]);

    let issues = unresolved_issues(&[resolved]);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind(), "unresolved_metric");
}
