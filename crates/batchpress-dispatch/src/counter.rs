// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch counter.
//
// Files are dispatched in caller order onto a pool of at most `concurrency`
// workers; results fold into the summary in completion order. Cancellation
// is checked before each dispatch.

use std::sync::Arc;
use std::time::Duration;

use batchpress_core::BatchConfig;
use batchpress_core::BatchSummary;
use batchpress_core::error::{BatchError, Result};
use batchpress_core::types::{BatchId, BatchOperation, DocumentFile, SkipReason, UnitResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, info, info_span, trace};

use crate::accumulator::Accumulator;
use crate::progress::BatchControl;
use crate::registry::HandlerRegistry;
use crate::retry::RetryPolicy;
use crate::worker;

/// Counts units across a list of files.
#[derive(Debug, Clone)]
pub struct BatchCounter {
    registry: Arc<HandlerRegistry>,
    policy: RetryPolicy,
    concurrency: usize,
    max_file_bytes: u64,
}

impl BatchCounter {
    pub fn new(registry: Arc<HandlerRegistry>, config: &BatchConfig) -> Result<Self> {
        Self {
            registry,
            policy: RetryPolicy::from_config(config),
            concurrency: 1,
            max_file_bytes: config.max_count_file_bytes,
        }
        .with_concurrency(config.effective_count_concurrency())
    }

    /// Override the worker count. Zero is rejected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(BatchError::InvalidConcurrency);
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Count every file in `files`.
    ///
    /// Per-file problems land in the summary; only worker infrastructure
    /// failures return an error.
    pub async fn run(&self, files: &[DocumentFile], control: BatchControl) -> Result<BatchSummary> {
        let batch_id = BatchId::new();
        let span = info_span!(
            "count_batch",
            %batch_id,
            files = files.len(),
            concurrency = self.concurrency
        );
        self.dispatch(batch_id, files, control).instrument(span).await
    }

    async fn dispatch(
        &self,
        batch_id: BatchId,
        files: &[DocumentFile],
        control: BatchControl,
    ) -> Result<BatchSummary> {
        info!("counting started");
        let acc = Accumulator::new(batch_id, BatchOperation::Count, files.len(), control.progress.clone());
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers = JoinSet::new();
        let mut dispatched = 0usize;

        for (index, file) in files.iter().enumerate() {
            reap_finished(&mut workers)?;
            let permit = tokio::select! {
                biased;
                _ = control.cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    Some(permit.map_err(|e| BatchError::Worker(e.to_string()))?)
                }
            };
            let Some(permit) = permit.filter(|_| !control.is_cancelled()) else {
                break;
            };

            let acc = Arc::clone(&acc);
            let registry = Arc::clone(&self.registry);
            let policy = self.policy.clone();
            let file = file.clone();
            let max_bytes = self.max_file_bytes;
            workers.spawn(
                async move {
                    let _permit = permit;
                    let result = match registry.resolve(file.path()) {
                        Ok(handler) => {
                            worker::count_unit(&policy, handler, index, file, max_bytes).await
                        }
                        Err(err) => UnitResult::failed(index, file, err, Duration::ZERO, 0),
                    };
                    acc.record(result).await;
                }
                .in_current_span(),
            );
            dispatched += 1;
        }

        let cancelled = dispatched < files.len();
        if cancelled {
            info!(dispatched, remaining = files.len() - dispatched, "cancelled; skipping the rest");
            for (index, file) in files.iter().enumerate().skip(dispatched) {
                acc.record(UnitResult::skipped(index, file.clone(), SkipReason::Cancelled))
                    .await;
            }
        }

        while let Some(joined) = workers.join_next().await {
            joined.map_err(|e| BatchError::Worker(e.to_string()))?;
        }

        let summary = acc.finish(cancelled)?;
        info!(%summary, "counting finished");
        Ok(summary)
    }
}

/// Drop the handles of workers that already finished, without waiting.
fn reap_finished(workers: &mut JoinSet<()>) -> Result<usize> {
    let mut reaped = 0;
    while let Some(joined) = workers.try_join_next() {
        joined.map_err(|e| BatchError::Worker(e.to_string()))?;
        reaped += 1;
    }
    if reaped > 0 {
        trace!(reaped, in_flight = workers.len(), "reaped finished workers");
    }
    Ok(reaped)
}
