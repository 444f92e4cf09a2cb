//! Error type for fatal diagnostic failures.
//!
//! Per-file read problems are not errors: scanners skip those files and keep
//! going. Only conditions that stop a whole run surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagnosticError {
    #[error("Root path not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Root path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid value '{value}' for {name} (expected {expected})")]
    InvalidOption {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report to {}: {source}", path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DiagnosticError>;
