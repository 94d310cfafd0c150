// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared summary fold for one batch run.
//
// Each worker folds its own result under the lock and publishes the
// progress event before releasing it, so `completed` counts arrive in order.
// A slow progress consumer therefore back-pressures every worker.

use std::sync::Arc;

use batchpress_core::BatchSummary;
use batchpress_core::error::{BatchError, Result};
use batchpress_core::types::{BatchId, BatchOperation, UnitResult};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::progress::ProgressEvent;

pub(crate) struct Accumulator {
    summary: Mutex<BatchSummary>,
    progress: Option<mpsc::Sender<ProgressEvent>>,
}

impl Accumulator {
    pub(crate) fn new(
        batch_id: BatchId,
        operation: BatchOperation,
        total: usize,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            summary: Mutex::new(BatchSummary::new(batch_id, operation, total)),
            progress,
        })
    }

    pub(crate) async fn record(&self, result: UnitResult) {
        let mut summary = self.summary.lock().await;
        let event = ProgressEvent {
            batch_id: summary.batch_id,
            index: result.index(),
            file: result.file().clone(),
            outcome: result.outcome(),
            completed: summary.completed() + 1,
            total: summary.total_files,
        };
        summary.record(result);

        if let Some(tx) = &self.progress {
            if tx.send(event).await.is_err() {
                debug!("progress receiver dropped; continuing without events");
            }
        }
    }

    /// Seal and return the summary once every worker has finished.
    pub(crate) fn finish(self: Arc<Self>, cancelled: bool) -> Result<BatchSummary> {
        let this = Arc::try_unwrap(self)
            .map_err(|_| BatchError::Worker("summary still shared after join".into()))?;
        let mut summary = this.summary.into_inner();
        summary.finish(cancelled);
        Ok(summary)
    }
}
