pub mod error;
pub mod input;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod resolve;

pub use error::{ConfigError, InputError, Issue, RunError};
pub use model::config::EngineConfig;
pub use model::profile::PositionProfile;
pub use model::record::{PlayerRecord, RecordSet};
pub use pipeline::stage4_scores::compute_scores;
pub use pipeline::stage5_grades::compute_grades;
pub use pipeline::stage6_topk::compute_top_k;
pub use pipeline::stage7_consistency::compute_consistency;
pub use pipeline::{ProfileReport, RunContext, run_all, run_profile};
