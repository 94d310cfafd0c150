// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The handler interface every document family implements.

use std::path::Path;

use batchpress_core::error::UnitOutcome;
use batchpress_core::types::{DocumentFamily, PrintChannel, PrintJobDescriptor};

use crate::sniff;

/// Counting and printing strategy for one document family.
///
/// Handlers hold no per-call mutable state and are shared across workers
/// through `Arc`. All methods block; the dispatcher calls them on blocking
/// threads.
pub trait DocumentHandler: Send + Sync {
    /// Unique name, used for registry lookups and logs.
    fn name(&self) -> &str;

    fn family(&self) -> DocumentFamily;

    /// Lower-case extensions without the leading dot.
    fn extensions(&self) -> &[&'static str];

    /// Whether this handler accepts `path`.
    ///
    /// Decided by extension alone; files without one are sniffed.
    fn can_handle(&self, path: &Path) -> bool {
        match extension_of(path) {
            Some(ext) => self.extensions().contains(&ext.as_str()),
            None => sniff::sniff_family(path) == Some(self.family()),
        }
    }

    /// Natural units of the document (pages, slides, sheet pages, frames).
    fn count(&self, path: &Path) -> UnitOutcome<u32>;

    /// Submit the document for printing. Success means accepted by the
    /// spooler or helper, not that paper came out.
    fn print(&self, path: &Path, job: &PrintJobDescriptor) -> UnitOutcome<()>;

    /// Submission mechanism used by [`print`](Self::print).
    fn print_channel(&self) -> PrintChannel;
}

/// Lower-cased extension of `path`, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_lowercase)
}
