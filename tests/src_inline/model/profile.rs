use serde_json::json;

use super::*;

fn center_back() -> Value {
    json!({
        "display_name": "Center Back",
        "source_key": "All Positions",
        "position_tags": ["CB", "LCB", "RCB"],
        "metrics": {
            "Core": {
                "Defensive duels won, %": 0.5,
                "Interceptions per 90": 0.5
            },
            "Specific": {
                "Passing": {
                    "weight": 0.6,
                    "components": {"Passes per 90": 0.5, "Accurate passes, %": 0.5}
                },
                "Aerial duels won, %": 0.4
            }
        }
    })
}

#[test]
fn test_parse_profile_valid() {
    let profile = parse_profile("CB", &center_back()).unwrap();
    assert_eq!(profile.id, "CB");
    assert_eq!(profile.display_name, "Center Back");
    assert_eq!(profile.source_key, "All Positions");
    assert_eq!(profile.core.len(), 2);
    assert_eq!(profile.specific.len(), 2);

    let passing = profile.specific.iter().find(|m| m.name == "Passing").unwrap();
    assert!(passing.composite);
    assert_eq!(passing.weight, 0.6);
    assert_eq!(passing.components.len(), 2);

    let relevant = profile.relevant_fields();
    assert_eq!(relevant.len(), 5);
    assert!(relevant.contains(&"Accurate passes, %".to_string()));
    assert_eq!(profile.display_metrics.len(), 5);
}

#[test]
fn test_parse_profile_defaults_to_name() {
    let value = json!({"metrics": {"Core": {"Goals per 90": 1.0}, "Specific": {}}});
    let profile = parse_profile("Striker", &value).unwrap();
    assert_eq!(profile.display_name, "Striker");
    assert_eq!(profile.source_key, "Striker");
    assert!(profile.position_tags.is_empty());
    assert!(profile.accepts_positions(&["GK".to_string()]));
}

#[test]
fn test_parse_profile_rejects_malformed() {
    let missing = json!({"metrics": {"Core": {"Goals per 90": 1.0}}});
    assert!(matches!(
        parse_profile("X", &missing),
        Err(ConfigError::MissingCategory { .. })
    ));

    let unknown = json!({"metrics": {"Core": {}, "Specific": {}, "Style": {}}});
    assert!(matches!(
        parse_profile("X", &unknown),
        Err(ConfigError::UnknownCategory { .. })
    ));

    let non_numeric = json!({"metrics": {"Core": {"Goals per 90": "high"}, "Specific": {}}});
    assert!(matches!(
        parse_profile("X", &non_numeric),
        Err(ConfigError::NonNumericWeight { .. })
    ));

    let negative = json!({"metrics": {"Core": {"Goals per 90": -0.5}, "Specific": {}}});
    assert!(matches!(
        parse_profile("X", &negative),
        Err(ConfigError::NegativeWeight { .. })
    ));

    let empty = json!({"metrics": {"Core": {}, "Specific": {
        "Passing": {"weight": 1.0, "components": {}}
    }}});
    assert!(matches!(
        parse_profile("X", &empty),
        Err(ConfigError::EmptyComposite { .. })
    ));

    let no_weight = json!({"metrics": {"Core": {"Passing": {"components": {"Passes": 1.0}}}, "Specific": {}}});
    assert!(matches!(
        parse_profile("X", &no_weight),
        Err(ConfigError::MissingWeight { .. })
    ));

    let bad_component = json!({"metrics": {"Core": {}, "Specific": {
        "Passing": {"weight": 1.0, "components": {"Passes per 90": "a lot"}}
    }}});
    assert!(matches!(
        parse_profile("X", &bad_component),
        Err(ConfigError::NonNumericWeight { .. })
    ));

    assert!(matches!(
        parse_profile("X", &json!([1, 2])),
        Err(ConfigError::NotAnObject { .. })
    ));
    assert!(matches!(
        parse_profile("X", &json!({})),
        Err(ConfigError::MissingMetrics { .. })
    ));
}

#[test]
fn test_position_tags_match_by_containment() {
    let profile = parse_profile("CB", &center_back()).unwrap();
    assert!(profile.accepts_positions(&["LCB".to_string()]));
    assert!(profile.accepts_positions(&["dmf".to_string(), "rcb3".to_string()]));
    assert!(!profile.accepts_positions(&["CF".to_string(), "LW".to_string()]));
    assert!(!profile.accepts_positions(&[]));
}

#[test]
fn test_accuracy_variant_reweights_pass_composites() {
    let profile = parse_profile("CB", &center_back()).unwrap();
    let intent = profile.with_accuracy_variant(AccuracyVariant::IntentFocused);
    let passing = intent.specific.iter().find(|m| m.name == "Passing").unwrap();
    let weight = |name: &str| {
        passing
            .components
            .iter()
            .find(|c| c.name == name)
            .unwrap()
            .weight
    };
    assert!((weight("Passes per 90") - 0.8).abs() < 1e-12);
    assert!((weight("Accurate passes, %") - 0.2).abs() < 1e-12);

    let balanced = profile.with_accuracy_variant(AccuracyVariant::Balanced);
    let passing = balanced.specific.iter().find(|m| m.name == "Passing").unwrap();
    assert!((passing.components[0].weight + passing.components[1].weight - 1.0).abs() < 1e-12);

    // Authored profile is untouched.
    let original = profile.specific.iter().find(|m| m.name == "Passing").unwrap();
    assert_eq!(original.components[0].weight, 0.5);
}

#[test]
fn test_accuracy_variant_parse() {
    assert_eq!(
        AccuracyVariant::parse("Intent-Focused").unwrap(),
        AccuracyVariant::IntentFocused
    );
    assert_eq!(AccuracyVariant::parse("balanced").unwrap(), AccuracyVariant::Balanced);
    assert!(matches!(
        AccuracyVariant::parse("70_30"),
        Err(ConfigError::UnknownVariant(_))
    ));
}

#[test]
fn test_malformed_display_metrics_keeps_decoder_message() {
    let mut value = center_back();
    value["display_metrics"] = json!([{"label": 7}]);
    let err = parse_profile("CB", &value).unwrap_err();
    match &err {
        ConfigError::InvalidDisplayMetrics { profile, message } => {
            assert_eq!(profile, "CB");
            assert!(!message.is_empty());
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().starts_with("profile CB: invalid display_metrics: "));
}
