// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress events and cancellation shared between a batch and its caller.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use batchpress_core::types::{BatchId, DocumentFile, Outcome};

/// Emitted once per unit result, after it has been folded into the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub batch_id: BatchId,
    /// Position of the file in the caller's list.
    pub index: usize,
    pub file: DocumentFile,
    pub outcome: Outcome,
    /// Results folded so far, including this one. Strictly increasing.
    pub completed: usize,
    pub total: usize,
}

/// Bounded progress channel. Producers wait when the consumer falls behind.
pub fn progress_channel(
    capacity: usize,
) -> (mpsc::Sender<ProgressEvent>, mpsc::Receiver<ProgressEvent>) {
    mpsc::channel(capacity.max(1))
}

/// Caller-side hooks for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    pub(crate) progress: Option<mpsc::Sender<ProgressEvent>>,
    pub(crate) cancel: CancellationToken,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream progress events into `sender`.
    pub fn with_progress(mut self, sender: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Observe `token` for cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this batch when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
