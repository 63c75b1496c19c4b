use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = TrackError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("no speed model configured for class id {class_id}")]
    MissingSpeedModel { class_id: u32 },
    #[error("color histogram has {found} bins, expected {expected}")]
    HistogramShape { expected: usize, found: usize },
    #[error("invalid value for `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no speed model configured for class id {class_id}")]
    MissingSpeedModel { class_id: u32 },
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
