//! Error types for the loading paths.
//!
//! The synchronization core itself never fails: missing routes, unknown
//! segments and unresolved layer actions degrade to no-ops.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to parse story config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("story has no chapters")]
    Empty,

    #[error("duplicate chapter id '{0}'")]
    DuplicateChapter(String),

    #[error("route '{0}' does not belong to any chapter")]
    OrphanRoute(String),
}

/// Failure to load one of the visualization datasets.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
