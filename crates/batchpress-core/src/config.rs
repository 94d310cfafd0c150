// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dispatcher configuration.
//
// Defaults are the single policy applied to every document family. Callers can
// overlay `BATCHPRESS_*` environment variables; nothing is written back.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};
use crate::types::HelperFlavor;

/// Upper bound on the default worker count. Office automation is a single
/// session, so more workers only queue on its lock.
pub const MAX_DEFAULT_CONCURRENCY: usize = 4;

/// Tunables for counting and printing batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker count for counting. `None` derives it from available parallelism.
    pub count_concurrency: Option<usize>,
    /// Concurrent print channels.
    pub print_concurrency: Option<usize>,
    /// Capacity of the bounded progress channel.
    pub progress_capacity: usize,
    /// Additional attempts after a transient failure.
    pub max_retries: u32,
    /// First backoff delay; doubles per attempt.
    pub retry_base_delay_ms: u64,
    /// Ceiling for a single backoff delay.
    pub retry_max_delay_ms: u64,
    /// Bound on any spawned helper or automation process.
    pub process_timeout_secs: u64,
    /// Files larger than this are skipped when counting.
    pub max_count_file_bytes: u64,
    /// Office suite executable used for office automation.
    pub office_program: PathBuf,
    /// Helper executable used to print PDF, image and text files.
    pub print_helper: PathBuf,
    pub print_helper_flavor: HelperFlavor,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let flavor = if cfg!(windows) {
            HelperFlavor::Sumatra
        } else {
            HelperFlavor::Cups
        };
        Self {
            count_concurrency: None,
            print_concurrency: None,
            progress_capacity: 64,
            max_retries: 2,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 8_000,
            process_timeout_secs: 30,
            max_count_file_bytes: 100 * 1024 * 1024,
            office_program: PathBuf::from("soffice"),
            print_helper: PathBuf::from(match flavor {
                HelperFlavor::Cups => "lp",
                HelperFlavor::Sumatra => "SumatraPDF.exe",
            }),
            print_helper_flavor: flavor,
        }
    }
}

impl BatchConfig {
    /// Defaults overlaid with any `BATCHPRESS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay values produced by `lookup` (keyed by environment variable
    /// name) onto the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("BATCHPRESS_COUNT_CONCURRENCY") {
            config.count_concurrency = Some(parse_positive("BATCHPRESS_COUNT_CONCURRENCY", &v)?);
        }
        if let Some(v) = lookup("BATCHPRESS_PRINT_CONCURRENCY") {
            config.print_concurrency = Some(parse_positive("BATCHPRESS_PRINT_CONCURRENCY", &v)?);
        }
        if let Some(v) = lookup("BATCHPRESS_PROGRESS_CAPACITY") {
            config.progress_capacity = parse_positive("BATCHPRESS_PROGRESS_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("BATCHPRESS_MAX_RETRIES") {
            config.max_retries = parse_number("BATCHPRESS_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("BATCHPRESS_RETRY_BASE_DELAY_MS") {
            config.retry_base_delay_ms = parse_number("BATCHPRESS_RETRY_BASE_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("BATCHPRESS_RETRY_MAX_DELAY_MS") {
            config.retry_max_delay_ms = parse_number("BATCHPRESS_RETRY_MAX_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("BATCHPRESS_PROCESS_TIMEOUT_SECS") {
            config.process_timeout_secs = parse_number("BATCHPRESS_PROCESS_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("BATCHPRESS_MAX_COUNT_FILE_BYTES") {
            config.max_count_file_bytes = parse_number("BATCHPRESS_MAX_COUNT_FILE_BYTES", &v)?;
        }
        if let Some(v) = lookup("BATCHPRESS_OFFICE_PROGRAM") {
            config.office_program = PathBuf::from(v);
        }
        if let Some(v) = lookup("BATCHPRESS_PRINT_HELPER") {
            config.print_helper = PathBuf::from(v);
        }
        if let Some(v) = lookup("BATCHPRESS_PRINT_HELPER_FLAVOR") {
            config.print_helper_flavor = match v.to_ascii_lowercase().as_str() {
                "cups" | "lp" => HelperFlavor::Cups,
                "sumatra" | "sumatrapdf" => HelperFlavor::Sumatra,
                other => {
                    return Err(BatchError::Config(format!(
                        "BATCHPRESS_PRINT_HELPER_FLAVOR: unknown flavor '{other}'"
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Worker count for counting batches.
    pub fn effective_count_concurrency(&self) -> usize {
        self.count_concurrency.unwrap_or_else(default_concurrency)
    }

    /// Concurrent channels for print batches.
    pub fn effective_print_concurrency(&self) -> usize {
        self.print_concurrency.unwrap_or_else(default_concurrency)
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }
}

/// Available parallelism, capped at [`MAX_DEFAULT_CONCURRENCY`].
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_DEFAULT_CONCURRENCY)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BatchError::Config(format!("{key}: '{value}' is not a number")))
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    let n: usize = parse_number(key, value)?;
    if n == 0 {
        return Err(BatchError::Config(format!("{key} must be at least 1")));
    }
    Ok(n)
}
