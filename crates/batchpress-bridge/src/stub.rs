// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Automation used when no office suite is configured.
//
// Every call fails with `FatalDevice` so office files end up in the failed
// list without retries.

use std::path::Path;

use batchpress_core::error::{UnitError, UnitOutcome};
use batchpress_core::types::PrintJobDescriptor;

use crate::traits::{OfficeAutomation, OpenedDocument, UnitCount};

pub struct UnavailableAutomation {
    reason: String,
}

impl UnavailableAutomation {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable(&self) -> UnitError {
        UnitError::FatalDevice(format!("office automation unavailable: {}", self.reason))
    }
}

impl OfficeAutomation for UnavailableAutomation {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn open(&mut self, path: &Path) -> UnitOutcome<OpenedDocument> {
        tracing::warn!(path = %path.display(), "office automation requested but unavailable");
        Err(self.unavailable())
    }

    fn unit_count(&mut self, _document: &OpenedDocument) -> UnitOutcome<UnitCount> {
        Err(self.unavailable())
    }

    fn print(&mut self, _document: &OpenedDocument, _job: &PrintJobDescriptor) -> UnitOutcome<()> {
        Err(self.unavailable())
    }

    fn close(&mut self, _document: OpenedDocument) -> UnitOutcome<()> {
        Ok(())
    }
}
