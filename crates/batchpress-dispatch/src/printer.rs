// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch printer.
//
// Files are grouped into lanes by print channel. Each lane submits its files
// strictly in caller order; lanes run concurrently and share a pool of
// `concurrency` permits, so at most that many submissions are in flight.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use batchpress_core::BatchConfig;
use batchpress_core::BatchSummary;
use batchpress_core::error::{BatchError, Result};
use batchpress_core::types::{
    BatchId, BatchOperation, DocumentFile, PrintChannel, PrintJobDescriptor, SkipReason,
    UnitResult,
};
use batchpress_handlers::DocumentHandler;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};

use crate::accumulator::Accumulator;
use crate::progress::BatchControl;
use crate::registry::HandlerRegistry;
use crate::retry::RetryPolicy;
use crate::worker;

type LaneUnit = (usize, DocumentFile, Arc<dyn DocumentHandler>);

/// Prints a list of files with one shared job descriptor.
#[derive(Debug, Clone)]
pub struct BatchPrinter {
    registry: Arc<HandlerRegistry>,
    policy: RetryPolicy,
    concurrency: usize,
}

impl BatchPrinter {
    pub fn new(registry: Arc<HandlerRegistry>, config: &BatchConfig) -> Result<Self> {
        Self {
            registry,
            policy: RetryPolicy::from_config(config),
            concurrency: 1,
        }
        .with_concurrency(config.effective_print_concurrency())
    }

    /// Override the number of concurrent submissions. Zero is rejected.
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

    /// Print every file in `files` with `job`.
    ///
    /// An invalid job fails the whole call before anything is submitted.
    pub async fn run(
        &self,
        files: &[DocumentFile],
        job: &PrintJobDescriptor,
        control: BatchControl,
    ) -> Result<BatchSummary> {
        job.validate()?;
        let batch_id = BatchId::new();
        let span = info_span!(
            "print_batch",
            %batch_id,
            files = files.len(),
            concurrency = self.concurrency,
            printer = %job.printer_name
        );
        self.dispatch(batch_id, files, Arc::new(job.clone()), control)
            .instrument(span)
            .await
    }

    async fn dispatch(
        &self,
        batch_id: BatchId,
        files: &[DocumentFile],
        job: Arc<PrintJobDescriptor>,
        control: BatchControl,
    ) -> Result<BatchSummary> {
        info!("printing started");
        let acc = Accumulator::new(batch_id, BatchOperation::Print, files.len(), control.progress.clone());

        let mut lanes: BTreeMap<PrintChannel, Vec<LaneUnit>> = BTreeMap::new();
        for (index, file) in files.iter().enumerate() {
            match self.registry.resolve(file.path()) {
                Ok(handler) => lanes
                    .entry(handler.print_channel())
                    .or_default()
                    .push((index, file.clone(), handler)),
                Err(err) => {
                    acc.record(UnitResult::failed(index, file.clone(), err, Duration::ZERO, 0))
                        .await;
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers = JoinSet::new();
        for (channel, units) in lanes {
            debug!(%channel, units = units.len(), "lane scheduled");
            let lane = Lane {
                channel: channel.clone(),
                semaphore: Arc::clone(&semaphore),
                acc: Arc::clone(&acc),
                policy: self.policy.clone(),
                job: Arc::clone(&job),
                cancel: control.cancel.clone(),
            };
            workers.spawn(
                lane.run(units)
                    .instrument(info_span!("lane", %channel)),
            );
        }

        let mut cancelled_units = 0usize;
        while let Some(joined) = workers.join_next().await {
            cancelled_units += joined.map_err(|e| BatchError::Worker(e.to_string()))?;
        }

        let summary = acc.finish(cancelled_units > 0)?;
        info!(%summary, "printing finished");
        Ok(summary)
    }
}

struct Lane {
    channel: PrintChannel,
    semaphore: Arc<Semaphore>,
    acc: Arc<Accumulator>,
    policy: RetryPolicy,
    job: Arc<PrintJobDescriptor>,
    cancel: CancellationToken,
}

impl Lane {
    /// Submit `units` in order. Returns how many were skipped by cancellation.
    async fn run(self, units: Vec<LaneUnit>) -> usize {
        let mut pending = units.into_iter();
        while let Some((index, file, handler)) = pending.next() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
            };
            let Some(_permit) = permit.filter(|_| !self.cancel.is_cancelled()) else {
                let mut skipped = 0;
                for (index, file) in std::iter::once((index, file))
                    .chain(pending.by_ref().map(|(i, f, _)| (i, f)))
                {
                    self.acc
                        .record(UnitResult::skipped(index, file, SkipReason::Cancelled))
                        .await;
                    skipped += 1;
                }
                info!(channel = %self.channel, skipped, "lane cancelled");
                return skipped;
            };

            let result =
                worker::print_unit(&self.policy, handler, index, file, Arc::clone(&self.job)).await;
            self.acc.record(result).await;
        }
        0
    }
}
