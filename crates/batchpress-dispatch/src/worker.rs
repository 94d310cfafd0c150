// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Execution of a single unit of work: dispatch-time file checks, the
// blocking handler call, and the retry loop around it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use batchpress_core::error::{UnitError, UnitOutcome};
use batchpress_core::types::{BatchOperation, DocumentFile, PrintJobDescriptor, SkipReason, UnitResult};
use batchpress_handlers::DocumentHandler;
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;

/// Run `call` on the blocking pool. A panicking handler fails its unit.
async fn on_blocking<T, F>(call: F) -> UnitOutcome<T>
where
    T: Send + 'static,
    F: FnOnce() -> UnitOutcome<T> + Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .unwrap_or_else(|e| Err(UnitError::FatalDevice(format!("handler panicked: {e}"))))
}

/// Dispatch-time check that the path is a readable regular file.
async fn probe(file: &DocumentFile) -> UnitOutcome<u64> {
    let meta = tokio::fs::metadata(file.path())
        .await
        .map_err(|e| UnitError::from_io(file.path(), &e))?;
    if !meta.is_file() {
        return Err(UnitError::Unreadable(format!(
            "{}: not a regular file",
            file.path().display()
        )));
    }
    Ok(meta.len())
}

/// Count one file.
pub(crate) async fn count_unit(
    policy: &RetryPolicy,
    handler: Arc<dyn DocumentHandler>,
    index: usize,
    file: DocumentFile,
    max_bytes: u64,
) -> UnitResult {
    let started = Instant::now();
    match probe(&file).await {
        Err(err) => return finish(index, file, Err(err), started.elapsed(), 1),
        Ok(size) if size > max_bytes => {
            info!(path = %file.path().display(), size, limit = max_bytes, "skipping oversized file");
            return UnitResult::skipped(index, file, SkipReason::TooLarge { limit_bytes: max_bytes });
        }
        Ok(_) => {}
    }

    let path: PathBuf = file.path().to_path_buf();
    let (result, attempts) = policy
        .execute(BatchOperation::Count, |attempt| {
            let handler = Arc::clone(&handler);
            let path = path.clone();
            async move {
                if attempt > 0 {
                    debug!(attempt, "retrying count");
                }
                on_blocking(move || handler.count(&path)).await
            }
        })
        .await;

    finish(index, file, result.map(Some), started.elapsed(), attempts)
}

/// Submit one file for printing.
pub(crate) async fn print_unit(
    policy: &RetryPolicy,
    handler: Arc<dyn DocumentHandler>,
    index: usize,
    file: DocumentFile,
    job: Arc<PrintJobDescriptor>,
) -> UnitResult {
    let started = Instant::now();
    if let Err(err) = probe(&file).await {
        return finish(index, file, Err(err), started.elapsed(), 1);
    }

    let path: PathBuf = file.path().to_path_buf();
    let (result, attempts) = policy
        .execute(BatchOperation::Print, |attempt| {
            let handler = Arc::clone(&handler);
            let path = path.clone();
            let job = Arc::clone(&job);
            async move {
                if attempt > 0 {
                    debug!(attempt, "retrying print");
                }
                on_blocking(move || handler.print(&path, &job)).await
            }
        })
        .await;

    finish(index, file, result.map(|()| None), started.elapsed(), attempts)
}

/// Build the unit result; `Some(n)` is a count, `None` a submission.
fn finish(
    index: usize,
    file: DocumentFile,
    result: UnitOutcome<Option<u32>>,
    elapsed: Duration,
    attempts: u32,
) -> UnitResult {
    match result {
        Ok(Some(units)) => {
            debug!(path = %file.path().display(), units, attempts, "counted");
            UnitResult::counted(index, file, units, elapsed, attempts)
        }
        Ok(None) => {
            debug!(path = %file.path().display(), attempts, "submitted");
            UnitResult::submitted(index, file, elapsed, attempts)
        }
        Err(err) => {
            warn!(path = %file.path().display(), kind = %err.kind(), attempts, error = %err, "unit failed");
            UnitResult::failed(index, file, err, elapsed, attempts)
        }
    }
}
