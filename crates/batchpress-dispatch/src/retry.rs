// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry engine with exponential backoff + jitter for counting and printing.
//
// Classifies errors into Transient (auto-retry), UserAction (someone must
// fix the setup) and Permanent (the file itself is the problem). Only
// transient errors trigger automatic retries. A print helper killed at its
// deadline may already have handed the job to the spooler, so a print
// timeout is never resubmitted.

use std::future::Future;
use std::time::Duration;

use batchpress_core::BatchConfig;
use batchpress_core::error::{UnitError, UnitOutcome};
use batchpress_core::types::{BatchOperation, ErrorClass};
use tracing::{debug, info, warn};

/// The single retry policy applied to every unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&BatchConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Run `op` until it succeeds, fails non-transiently, or the retry
    /// budget is spent. `op` receives the zero-based attempt number.
    ///
    /// Returns the final outcome and the number of attempts made.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: BatchOperation,
        mut op: F,
    ) -> (UnitOutcome<T>, u32)
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = UnitOutcome<T>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match op(attempt).await {
                Ok(value) => return (Ok(value), attempt + 1),
                Err(err) => err,
            };
            match should_retry(&err, operation, attempt, self) {
                RetryDecision::RetryAfter(delay) => {
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp(_) | RetryDecision::Exhausted => {
                    return (Err(err), attempt + 1);
                }
            }
        }
    }
}

/// Result of evaluating whether to retry.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after this delay.
    RetryAfter(Duration),
    /// Do not retry: the error is permanent or needs user action.
    GiveUp(ErrorClass),
    /// Maximum retries exhausted.
    Exhausted,
}

/// Classify a [`UnitError`] raised by `operation` for retry decisions.
pub fn classify_error(err: &UnitError, operation: BatchOperation) -> ErrorClass {
    match err {
        // Busy spooler or slow office suite
        UnitError::TransientDevice(_) => ErrorClass::Transient,

        UnitError::TimedOut { .. } => match operation {
            BatchOperation::Count => ErrorClass::Transient,
            // The queue must be checked before anyone resubmits
            BatchOperation::Print => ErrorClass::UserAction,
        },

        // Setup problems: missing printer, missing program, locked file
        UnitError::FatalDevice(_) | UnitError::Unreadable(_) => ErrorClass::UserAction,

        // The file itself
        UnitError::NotFound(_)
        | UnitError::Corrupt(_)
        | UnitError::Encrypted(_)
        | UnitError::UnsupportedSubformat(_)
        | UnitError::Cancelled => ErrorClass::Permanent,
    }
}

/// Decide whether to retry based on the error class and attempt count.
pub fn should_retry(
    err: &UnitError,
    operation: BatchOperation,
    attempt: u32,
    policy: &RetryPolicy,
) -> RetryDecision {
    match classify_error(err, operation) {
        ErrorClass::Permanent => {
            info!(error = %err, "permanent error, not retrying");
            RetryDecision::GiveUp(ErrorClass::Permanent)
        }
        ErrorClass::UserAction => {
            info!(error = %err, "user action required, not retrying");
            RetryDecision::GiveUp(ErrorClass::UserAction)
        }
        ErrorClass::Transient => {
            if attempt >= policy.max_retries {
                warn!(attempt, max = policy.max_retries, error = %err, "retry limit exhausted");
                RetryDecision::Exhausted
            } else {
                let delay = compute_delay(attempt, policy);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "scheduling retry");
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

/// Exponential backoff with jitter.
///
/// delay = min(base * 2^attempt + jitter, max_delay), jitter in [0, base).
pub fn compute_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    let base_ms = policy.base_delay.as_millis() as u64;
    let exp_ms = base_ms.saturating_mul(1u64 << attempt.min(10));
    let total_ms = exp_ms.saturating_add(jitter(base_ms, attempt));
    Duration::from_millis(total_ms.min(policy.max_delay.as_millis() as u64))
}

/// Deterministic spread in [0, base) derived from the attempt number.
fn jitter(base_ms: u64, attempt: u32) -> u64 {
    let hash = u64::from(attempt).wrapping_mul(6364136223846793005);
    hash % base_ms.max(1)
}
