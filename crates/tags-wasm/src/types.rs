//! JavaScript-facing values.

use serde::Serialize;
use tags_engine::NormalizeStats;
use thiserror::Error;

/// Normalization counters, with times in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsJs {
    pub parse_ms: f64,
    pub work_ms: f64,
    pub parsed_documents: u64,
    pub created_tags: u64,
}

impl From<NormalizeStats> for StatsJs {
    fn from(stats: NormalizeStats) -> Self {
        Self {
            parse_ms: stats.parse_time.as_secs_f64() * 1000.0,
            work_ms: stats.work_time.as_secs_f64() * 1000.0,
            parsed_documents: stats.parsed_documents,
            created_tags: stats.created_tags,
        }
    }
}

/// Failures of the runtime facade itself.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No document available")]
    NoDocument,

    #[error("No element with id '{0}' to mount after")]
    MissingAnchor(String),
}
