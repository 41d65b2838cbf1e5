use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. Nothing falls back when these happen.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read model artifact {path}: {source}")]
    ModelUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact {path} is not valid JSON: {source}")]
    ModelCorrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("model artifact is invalid: {0}")]
    ModelInvalid(String),
    #[error("failed to load dataset {path}: {source}")]
    Dataset { path: PathBuf, source: csv::Error },
    #[error("invalid log filter {0:?}")]
    LogFilter(String),
}

/// Raised while turning form input into a typed customer record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("invalid category for {field}: {value:?} (expected one of: {expected})")]
    InvalidCategory {
        field: &'static str,
        value: String,
        expected: String,
    },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    #[error("feature vector has {actual} values but the model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("model returned class {0}, expected 0 or 1")]
    InvalidClass(u8),
    #[error("model failed: {0}")]
    Model(String),
}
