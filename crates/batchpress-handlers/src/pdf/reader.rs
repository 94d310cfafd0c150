// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open and inspect existing PDF documents using `lopdf`.

use std::path::Path;

use batchpress_core::error::{UnitError, UnitOutcome};
use lopdf::Document;
use tracing::{debug, instrument};

/// Read-only view of a PDF file.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    ///
    /// Load failures are split into `Encrypted` (the document needs a
    /// password) and `Corrupt` (anything else the parser rejects).
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> UnitOutcome<Self> {
        // Surface missing/locked files as I/O problems before parsing.
        std::fs::File::open(path).map_err(|e| UnitError::from_io(path, &e))?;

        let document = Document::load(path).map_err(|err| load_error(path, &err.to_string()))?;
        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        u32::try_from(self.document.get_pages().len()).unwrap_or(u32::MAX)
    }
}

fn load_error(path: &Path, message: &str) -> UnitError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("encrypt") || lower.contains("decrypt") || lower.contains("password") {
        UnitError::Encrypted(format!("{}: {message}", path.display()))
    } else {
        UnitError::Corrupt(format!("{}: {message}", path.display()))
    }
}
