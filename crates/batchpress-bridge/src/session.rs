// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared, serialised access to the office automation session.
//
// At most one document is open at a time. The open document is closed and
// the lock released on every exit path, including errors and panics inside
// the caller's closure.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use batchpress_core::error::UnitOutcome;
use tracing::warn;

use crate::traits::{OfficeAutomation, OpenedDocument};

/// Cloneable handle to a single office automation session.
#[derive(Clone)]
pub struct AutomationSession {
    inner: Arc<Mutex<Box<dyn OfficeAutomation>>>,
}

impl AutomationSession {
    pub fn new(automation: impl OfficeAutomation + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(automation))),
        }
    }

    /// Name of the underlying implementation.
    pub fn name(&self) -> String {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .name()
            .to_string()
    }

    /// Open `path`, run `op` against it, then close it.
    ///
    /// Close failures after a successful `op` are logged, not reported: the
    /// unit's work has already happened.
    pub fn with_document<T>(
        &self,
        path: &Path,
        op: impl FnOnce(&mut dyn OfficeAutomation, &OpenedDocument) -> UnitOutcome<T>,
    ) -> UnitOutcome<T> {
        // A panic in an earlier unit leaves the automation usable.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let document = guard.open(path)?;

        let mut opened = OpenGuard {
            automation: &mut **guard,
            document: Some(document.clone()),
        };
        let result = op(&mut *opened.automation, &document);
        drop(opened);
        result
    }
}

impl std::fmt::Debug for AutomationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationSession").finish_non_exhaustive()
    }
}

struct OpenGuard<'a> {
    automation: &'a mut dyn OfficeAutomation,
    document: Option<OpenedDocument>,
}

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        if let Some(document) = self.document.take() {
            let path = document.path.clone();
            if let Err(e) = self.automation.close(document) {
                warn!(path = %path.display(), error = %e, "failed to close document");
            }
        }
    }
}
