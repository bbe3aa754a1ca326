//! Error types for configuration and generation.

use std::path::PathBuf;

use idbrand_schema::SchemaError;
use thiserror::Error;

/// Invalid generator configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid brand mode '{0}': expected \"lenient\" or \"strict\"")]
    InvalidMode(String),

    #[error("Invalid coverage '{0}': expected \"standard\" or \"extended\"")]
    InvalidCoverage(String),
}

/// Errors that abort a generation run.
///
/// Missing declarations inside the file are not errors; they are reported in
/// the [`BrandReport`](crate::BrandReport) instead.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Failed to read declarations {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write declarations {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read generator options {}: {}", .path.display(), .source)]
    Options {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid generator options: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
