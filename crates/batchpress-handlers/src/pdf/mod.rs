// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page counting via `lopdf`, printing via the print helper.

pub mod reader;

use std::path::Path;
use std::sync::Arc;

use batchpress_bridge::HelperPrinter;
use batchpress_core::error::UnitOutcome;
use batchpress_core::types::{DocumentFamily, PrintChannel, PrintJobDescriptor};
use tracing::instrument;

use crate::handler::DocumentHandler;
pub use reader::PdfReader;

pub struct PdfHandler {
    helper: Arc<HelperPrinter>,
}

impl PdfHandler {
    pub fn new(helper: Arc<HelperPrinter>) -> Self {
        Self { helper }
    }
}

impl DocumentHandler for PdfHandler {
    fn name(&self) -> &str {
        "pdf"
    }

    fn family(&self) -> DocumentFamily {
        DocumentFamily::Pdf
    }

    fn extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn count(&self, path: &Path) -> UnitOutcome<u32> {
        Ok(PdfReader::open(path)?.page_count())
    }

    #[instrument(skip(self, job), fields(path = %path.display()))]
    fn print(&self, path: &Path, job: &PrintJobDescriptor) -> UnitOutcome<()> {
        self.helper.submit(&self.helper.document_command(path, job))
    }

    fn print_channel(&self) -> PrintChannel {
        PrintChannel::PdfHelper
    }
}
