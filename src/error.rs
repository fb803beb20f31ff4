use std::path::PathBuf;

use thiserror::Error;

/// Malformed position profile configuration. Aborts scoring of the affected
/// profile; other profiles in the same run still proceed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("profile {profile}: configuration is not an object")]
    NotAnObject { profile: String },

    #[error("profile {profile}: missing \"metrics\" section")]
    MissingMetrics { profile: String },

    #[error("profile {profile}: missing metric category {category}")]
    MissingCategory { profile: String, category: String },

    #[error("profile {profile}: unknown metric category {category}")]
    UnknownCategory { profile: String, category: String },

    #[error("profile {profile}: metric {metric} has no weight")]
    MissingWeight { profile: String, metric: String },

    #[error("profile {profile}: metric {metric} has non-numeric weight {value}")]
    NonNumericWeight {
        profile: String,
        metric: String,
        value: String,
    },

    #[error("profile {profile}: metric {metric} has negative weight {weight}")]
    NegativeWeight {
        profile: String,
        metric: String,
        weight: f64,
    },

    #[error("profile {profile}: composite metric {metric} declares no components")]
    EmptyComposite { profile: String, metric: String },

    #[error("profile {profile}: invalid display_metrics: {message}")]
    InvalidDisplayMetrics { profile: String, message: String },

    #[error("unknown position profile: {0}")]
    UnknownProfile(String),

    #[error("unknown accuracy variant: {0} (use intent_focused|balanced)")]
    UnknownVariant(String),
}

/// Non-fatal conditions raised while scoring. The engine degrades gracefully
/// and records every occurrence so callers can surface coverage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Issue {
    #[error("metric {metric} could not be resolved to a raw field")]
    UnresolvedMetric {
        metric: String,
        component: Option<String>,
    },

    #[error("{scope} pool for {player} has {size} member(s); at least {required} required")]
    InsufficientPool {
        player: String,
        scope: String,
        size: usize,
        required: usize,
    },

    #[error("no possession baseline for team {team}; {field} left unadjusted")]
    MissingPossessionData { team: String, field: String },

    #[error("field {field} has unparseable value {raw:?}")]
    InvalidNumericValue { field: String, raw: String },
}

impl Issue {
    pub fn kind(&self) -> &'static str {
        match self {
            Issue::UnresolvedMetric { .. } => "unresolved_metric",
            Issue::InsufficientPool { .. } => "insufficient_pool",
            Issue::MissingPossessionData { .. } => "missing_possession_data",
            Issue::InvalidNumericValue { .. } => "invalid_numeric_value",
        }
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("{path}: missing required column {column}")]
    MissingColumn { path: PathBuf, column: String },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
}
