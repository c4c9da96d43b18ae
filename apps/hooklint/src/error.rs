//! Typed errors for the validation engine.
//!
//! Engine checks turn these into report findings; only the binary maps a
//! fatal error to exit code 2.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Script not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}", crate::runner::format_timeout(.timeout))]
    Timeout { program: String, timeout: Duration },

    #[error("Invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, HookError>;
