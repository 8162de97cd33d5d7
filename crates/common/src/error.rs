//! Error types shared across Dragline crates.
//!
//! The gesture state machine itself never fails; these errors cover the
//! surrounding plumbing (traces, notification logs, configuration files).

use std::path::PathBuf;

/// Top-level error type for Dragline operations.
#[derive(Debug, thiserror::Error)]
pub enum DraglineError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Trace error at line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("Replay error: {message}")]
    Replay { message: String },

    #[error("Event pump error: {message}")]
    Pump { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DraglineError.
pub type DraglineResult<T> = Result<T, DraglineError>;

impl DraglineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn trace(line: usize, msg: impl Into<String>) -> Self {
        Self::Trace {
            line,
            message: msg.into(),
        }
    }

    pub fn replay(msg: impl Into<String>) -> Self {
        Self::Replay {
            message: msg.into(),
        }
    }

    pub fn pump(msg: impl Into<String>) -> Self {
        Self::Pump {
            message: msg.into(),
        }
    }
}
