use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetricCategory {
    Core,
    Specific,
}

impl MetricCategory {
    pub fn label(self) -> &'static str {
        match self {
            MetricCategory::Core => "Core",
            MetricCategory::Specific => "Specific",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Some(MetricCategory::Core),
            "specific" => Some(MetricCategory::Specific),
            _ => None,
        }
    }
}

pub fn category_order() -> &'static [MetricCategory] {
    &[MetricCategory::Core, MetricCategory::Specific]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    pub weight: f64,
}

/// One weighted entry of a profile category. A simple metric is stored as a
/// single component named after the metric with weight 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDefinition {
    pub name: String,
    pub weight: f64,
    pub category: MetricCategory,
    pub components: Vec<Component>,
    pub composite: bool,
}

impl MetricDefinition {
    pub fn simple(name: &str, weight: f64, category: MetricCategory) -> Self {
        Self {
            name: name.to_string(),
            weight,
            category,
            components: vec![Component {
                name: name.to_string(),
                weight: 1.0,
            }],
            composite: false,
        }
    }

    pub fn composite(
        name: &str,
        weight: f64,
        category: MetricCategory,
        components: &[(&str, f64)],
    ) -> Self {
        Self {
            name: name.to_string(),
            weight,
            category,
            components: components
                .iter()
                .map(|(n, w)| Component {
                    name: n.to_string(),
                    weight: *w,
                })
                .collect(),
            composite: true,
        }
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name.as_str())
    }
}

/// A metric shown to scouts and evaluated for elite status / consistency.
/// For combined metrics the first component is the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct DisplayMetric {
    pub name: String,
    #[serde(default)]
    pub components: Vec<String>,
}

impl DisplayMetric {
    pub fn single(name: &str) -> Self {
        Self {
            name: name.to_string(),
            components: Vec::new(),
        }
    }

    pub fn combined(name: &str, components: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            components: components.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn is_combined(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn primary(&self) -> &str {
        self.components
            .first()
            .map(String::as_str)
            .unwrap_or(self.name.as_str())
    }

    pub fn fields(&self) -> Vec<&str> {
        if self.components.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.components.iter().map(String::as_str).collect()
        }
    }
}
