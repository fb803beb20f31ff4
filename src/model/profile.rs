use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ConfigError;
use crate::model::metric::{
    Component, DisplayMetric, MetricCategory, MetricDefinition, category_order,
};

const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionProfile {
    pub id: String,
    pub display_name: String,
    pub source_key: String,
    pub position_tags: Vec<String>,
    pub core: Vec<MetricDefinition>,
    pub specific: Vec<MetricDefinition>,
    pub display_metrics: Vec<DisplayMetric>,
}

impl PositionProfile {
    pub fn metrics(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.core.iter().chain(self.specific.iter())
    }

    pub fn category(&self, category: MetricCategory) -> &[MetricDefinition] {
        match category {
            MetricCategory::Core => &self.core,
            MetricCategory::Specific => &self.specific,
        }
    }

    pub fn category_mut(&mut self, category: MetricCategory) -> &mut Vec<MetricDefinition> {
        match category {
            MetricCategory::Core => &mut self.core,
            MetricCategory::Specific => &mut self.specific,
        }
    }

    /// Every configured raw name the profile reads, in configuration order.
    pub fn relevant_fields(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for metric in self.metrics() {
            for name in metric.component_names() {
                if seen.insert(name.to_string()) {
                    out.push(name.to_string());
                }
            }
        }
        out
    }

    /// True when any of the record's position tags contains one of the
    /// profile's tags. Profiles without tags accept everything.
    pub fn accepts_positions(&self, positions: &[String]) -> bool {
        if self.position_tags.is_empty() {
            return true;
        }
        positions.iter().any(|pos| {
            let pos = pos.trim().to_ascii_uppercase();
            self.position_tags
                .iter()
                .any(|tag| pos.contains(&tag.trim().to_ascii_uppercase()))
        })
    }

    /// Run-scoped copy with Specific pass composites reweighted for the
    /// given attempt/accuracy split.
    pub fn with_accuracy_variant(&self, variant: AccuracyVariant) -> PositionProfile {
        let mut out = self.clone();
        let (attempt, accuracy) = variant.weights();
        for metric in out.specific.iter_mut() {
            if !metric.composite || !is_pass_accuracy_composite(&metric.components) {
                continue;
            }
            for comp in metric.components.iter_mut() {
                comp.weight = if comp.name.to_ascii_lowercase().contains("accurate") {
                    accuracy
                } else {
                    attempt
                };
            }
            let total: f64 = metric.components.iter().map(|c| c.weight).sum();
            if total > 0.0 {
                for comp in metric.components.iter_mut() {
                    comp.weight /= total;
                }
            }
        }
        out
    }
}

fn is_pass_accuracy_composite(components: &[Component]) -> bool {
    components.iter().any(|c| {
        let lower = c.name.to_ascii_lowercase();
        lower.contains("pass") && lower.contains("accurate")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyVariant {
    IntentFocused,
    Balanced,
}

impl AccuracyVariant {
    pub fn weights(self) -> (f64, f64) {
        match self {
            AccuracyVariant::IntentFocused => (0.80, 0.20),
            AccuracyVariant::Balanced => (0.60, 0.40),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccuracyVariant::IntentFocused => "Intent_Focused",
            AccuracyVariant::Balanced => "Balanced",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "intent_focused" => Ok(AccuracyVariant::IntentFocused),
            "balanced" => Ok(AccuracyVariant::Balanced),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }
}

/// Parses one profile entry of the configuration file.
///
/// Any structural problem is fatal for this profile: a missing category, a
/// weight that is absent or not a number, a negative weight, or a composite
/// without components.
pub fn parse_profile(name: &str, value: &Value) -> Result<PositionProfile, ConfigError> {
    let obj = value.as_object().ok_or_else(|| ConfigError::NotAnObject {
        profile: name.to_string(),
    })?;
    let metrics = obj
        .get("metrics")
        .and_then(Value::as_object)
        .ok_or_else(|| ConfigError::MissingMetrics {
            profile: name.to_string(),
        })?;

    for key in metrics.keys() {
        if MetricCategory::parse(key).is_none() {
            return Err(ConfigError::UnknownCategory {
                profile: name.to_string(),
                category: key.clone(),
            });
        }
    }

    let mut core = Vec::new();
    let mut specific = Vec::new();
    for &category in category_order() {
        let section = metrics
            .iter()
            .find(|(k, _)| MetricCategory::parse(k) == Some(category))
            .map(|(_, v)| v)
            .and_then(Value::as_object)
            .ok_or_else(|| ConfigError::MissingCategory {
                profile: name.to_string(),
                category: category.label().to_string(),
            })?;

        let target = match category {
            MetricCategory::Core => &mut core,
            MetricCategory::Specific => &mut specific,
        };
        for (metric_name, entry) in section {
            target.push(parse_metric(name, metric_name, entry, category)?);
        }
        check_weight_sum(name, category, target);
    }

    let display_name = obj
        .get("display_name")
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string();
    let source_key = obj
        .get("source_key")
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string();
    let position_tags = obj
        .get("position_tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut profile = PositionProfile {
        id: name.to_string(),
        display_name,
        source_key,
        position_tags,
        core,
        specific,
        display_metrics: Vec::new(),
    };

    profile.display_metrics = match obj.get("display_metrics") {
        Some(v) => serde_json::from_value::<Vec<DisplayMetric>>(v.clone()).map_err(|err| {
            ConfigError::InvalidDisplayMetrics {
                profile: name.to_string(),
                message: err.to_string(),
            }
        })?,
        None => default_display_metrics(&profile),
    };

    Ok(profile)
}

fn parse_metric(
    profile: &str,
    metric: &str,
    entry: &Value,
    category: MetricCategory,
) -> Result<MetricDefinition, ConfigError> {
    match entry {
        Value::Number(_) => {
            let weight = parse_weight(profile, metric, entry)?;
            Ok(MetricDefinition::simple(metric, weight, category))
        }
        Value::Object(obj) => {
            let weight_value = obj.get("weight").ok_or_else(|| ConfigError::MissingWeight {
                profile: profile.to_string(),
                metric: metric.to_string(),
            })?;
            let weight = parse_weight(profile, metric, weight_value)?;
            let Some(components) = obj.get("components") else {
                return Ok(MetricDefinition::simple(metric, weight, category));
            };
            let components = components.as_object().ok_or_else(|| {
                ConfigError::EmptyComposite {
                    profile: profile.to_string(),
                    metric: metric.to_string(),
                }
            })?;
            if components.is_empty() {
                return Err(ConfigError::EmptyComposite {
                    profile: profile.to_string(),
                    metric: metric.to_string(),
                });
            }
            let mut parsed = Vec::with_capacity(components.len());
            for (comp_name, comp_weight) in components {
                let label = format!("{metric}.{comp_name}");
                parsed.push(Component {
                    name: comp_name.clone(),
                    weight: parse_weight(profile, &label, comp_weight)?,
                });
            }
            Ok(MetricDefinition {
                name: metric.to_string(),
                weight,
                category,
                components: parsed,
                composite: true,
            })
        }
        other => Err(ConfigError::NonNumericWeight {
            profile: profile.to_string(),
            metric: metric.to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_weight(profile: &str, metric: &str, value: &Value) -> Result<f64, ConfigError> {
    let weight = value
        .as_f64()
        .filter(|w| w.is_finite())
        .ok_or_else(|| ConfigError::NonNumericWeight {
            profile: profile.to_string(),
            metric: metric.to_string(),
            value: value.to_string(),
        })?;
    if weight < 0.0 {
        return Err(ConfigError::NegativeWeight {
            profile: profile.to_string(),
            metric: metric.to_string(),
            weight,
        });
    }
    Ok(weight)
}

fn check_weight_sum(profile: &str, category: MetricCategory, metrics: &[MetricDefinition]) {
    if metrics.is_empty() {
        return;
    }
    let sum: f64 = metrics.iter().map(|m| m.weight).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        warn!(
            profile,
            category = category.label(),
            sum,
            "category weights do not sum to 1.0"
        );
    }
}

fn default_display_metrics(profile: &PositionProfile) -> Vec<DisplayMetric> {
    profile
        .relevant_fields()
        .iter()
        .map(|name| DisplayMetric::single(name))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/profile.rs"]
mod tests;
