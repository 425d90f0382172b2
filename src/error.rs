// src/error.rs
use jpq_jpath::JPathError;
use std::fmt;
use thiserror::Error;

/// Everything that can stop a `jpq` run.
#[derive(Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Path(#[from] JPathError),
}

// `main` returns this type, and the process prints the Debug form on failure.
impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
