//! Error types for loading schema descriptions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a [`SchemaDescription`](crate::SchemaDescription).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema description file could not be read.
    #[error("Failed to read schema description {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema description is not valid JSON or has an unexpected shape.
    #[error("Invalid schema description: {0}")]
    Json(#[from] serde_json::Error),
}
