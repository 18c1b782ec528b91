//! Error types for the qualigate library
//!
//! Policy failures (too many violations, a limit that CI may not lower) are
//! not errors: they are [`Decision::Fail`](crate::budget::Decision) values.
//! Everything here is infrastructure: files, reports, git, configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading limits, reading reports or querying git
#[derive(Error, Debug)]
pub enum GateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt limits file {}:{line}: {reason}", path.display())]
    CorruptLimits {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to parse report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Git error: {0}")]
    Vcs(#[from] git2::Error),

    #[error("Cannot determine branch name: HEAD is detached at {0}")]
    DetachedHead(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid build plan: {0}")]
    Plan(String),
}

pub type Result<T> = std::result::Result<T, GateError>;
