// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batchpress — Core types, error taxonomy and configuration shared across all
// crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod summary;
pub mod types;

pub use config::BatchConfig;
pub use error::{BatchError, UnitError, UnitErrorKind};
pub use summary::BatchSummary;
pub use types::*;
