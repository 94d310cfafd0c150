// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error types for Batchpress.
//
// Two layers: `UnitError` describes why a single file could not be counted or
// printed and is always captured into that file's result; `BatchError` is
// reserved for contract violations that fail a whole batch call.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-file failure. Never escapes a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UnitError {
    #[error("no handler registered for {0}")]
    NotFound(String),

    #[error("cannot read file: {0}")]
    Unreadable(String),

    #[error("document is damaged: {0}")]
    Corrupt(String),

    #[error("document is password-protected: {0}")]
    Encrypted(String),

    #[error("unsupported sub-format: {0}")]
    UnsupportedSubformat(String),

    #[error("timed out after {seconds}s: {detail}")]
    TimedOut { seconds: u64, detail: String },

    #[error("device busy: {0}")]
    TransientDevice(String),

    #[error("device error: {0}")]
    FatalDevice(String),

    #[error("cancelled before dispatch")]
    Cancelled,
}

/// Discriminant of [`UnitError`], used for grouping and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitErrorKind {
    NotFound,
    Unreadable,
    Corrupt,
    Encrypted,
    UnsupportedSubformat,
    TimedOut,
    TransientDevice,
    FatalDevice,
    Cancelled,
}

impl std::fmt::Display for UnitErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotFound => "NotFound",
            Self::Unreadable => "Unreadable",
            Self::Corrupt => "Corrupt",
            Self::Encrypted => "Encrypted",
            Self::UnsupportedSubformat => "UnsupportedSubformat",
            Self::TimedOut => "TimedOut",
            Self::TransientDevice => "TransientDeviceError",
            Self::FatalDevice => "FatalDeviceError",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

impl UnitError {
    pub fn kind(&self) -> UnitErrorKind {
        match self {
            Self::NotFound(_) => UnitErrorKind::NotFound,
            Self::Unreadable(_) => UnitErrorKind::Unreadable,
            Self::Corrupt(_) => UnitErrorKind::Corrupt,
            Self::Encrypted(_) => UnitErrorKind::Encrypted,
            Self::UnsupportedSubformat(_) => UnitErrorKind::UnsupportedSubformat,
            Self::TimedOut { .. } => UnitErrorKind::TimedOut,
            Self::TransientDevice(_) => UnitErrorKind::TransientDevice,
            Self::FatalDevice(_) => UnitErrorKind::FatalDevice,
            Self::Cancelled => UnitErrorKind::Cancelled,
        }
    }

    /// Map an I/O failure while touching `path` onto the taxonomy.
    ///
    /// Timeouts and interruptions are treated as device contention; everything
    /// else means the file itself could not be read.
    pub fn from_io(path: &Path, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted => {
                Self::TransientDevice(format!("{}: {err}", path.display()))
            }
            _ => Self::Unreadable(format!("{}: {err}", path.display())),
        }
    }
}

/// Failure of a whole batch call.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid print job: {0}")]
    InvalidJob(String),

    #[error("concurrency limit must be at least 1")]
    InvalidConcurrency,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used for batch-level calls.
pub type Result<T> = std::result::Result<T, BatchError>;

/// Alias used by handlers and capabilities for per-file calls.
pub type UnitOutcome<T> = std::result::Result<T, UnitError>;
