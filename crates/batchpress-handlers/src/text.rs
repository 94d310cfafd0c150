// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text handler.
//
// Pages are estimated for a monospaced layout: long lines wrap at
// `CHARS_PER_LINE` characters and `LINES_PER_PAGE` lines fill a page.
// Decoding tries UTF-8, then BOM-marked UTF-16, then Latin-1.

use std::path::Path;
use std::sync::Arc;

use batchpress_bridge::HelperPrinter;
use batchpress_core::error::{UnitError, UnitOutcome};
use batchpress_core::types::{DocumentFamily, PrintChannel, PrintJobDescriptor};
use tracing::{debug, instrument};

use crate::handler::DocumentHandler;

pub const CHARS_PER_LINE: usize = 75;
pub const LINES_PER_PAGE: usize = 50;

/// Minimum share of printable characters for content to count as text.
const PRINTABLE_RATIO: f64 = 0.8;
/// Characters inspected by the printable check.
const PRINTABLE_SAMPLE: usize = 1000;

pub struct TextHandler {
    helper: Arc<HelperPrinter>,
}

impl TextHandler {
    pub fn new(helper: Arc<HelperPrinter>) -> Self {
        Self { helper }
    }
}

impl DocumentHandler for TextHandler {
    fn name(&self) -> &str {
        "text"
    }

    fn family(&self) -> DocumentFamily {
        DocumentFamily::Text
    }

    fn extensions(&self) -> &[&'static str] {
        &["txt"]
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn count(&self, path: &Path) -> UnitOutcome<u32> {
        let bytes = std::fs::read(path).map_err(|e| UnitError::from_io(path, &e))?;
        let content = decode(&bytes);
        if !is_mostly_printable(&content) {
            return Err(UnitError::UnsupportedSubformat(format!(
                "{}: does not look like text",
                path.display()
            )));
        }
        let pages = paginate(&content);
        debug!(pages, bytes = bytes.len(), "text paginated");
        Ok(pages)
    }

    #[instrument(skip(self, job), fields(path = %path.display()))]
    fn print(&self, path: &Path, job: &PrintJobDescriptor) -> UnitOutcome<()> {
        self.helper.submit(&self.helper.text_command(path, job))
    }

    fn print_channel(&self) -> PrintChannel {
        PrintChannel::TextSpooler
    }
}

/// Decode raw bytes, never failing: Latin-1 maps every byte.
pub fn decode(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        if let Ok(text) = std::str::from_utf8(rest) {
            return text.to_string();
        }
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    if let Some(text) = decode_utf16(bytes) {
        return text;
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        (rest, true)
    } else if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        (rest, false)
    } else {
        return None;
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units = body.chunks_exact(2).map(|pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Whether at least 80% of the leading characters are printable or
/// whitespace. Empty content counts as text.
pub fn is_mostly_printable(content: &str) -> bool {
    let mut total = 0usize;
    let mut printable = 0usize;
    for c in content.chars().take(PRINTABLE_SAMPLE) {
        total += 1;
        if !c.is_control() || c.is_whitespace() {
            printable += 1;
        }
    }
    total == 0 || printable as f64 / total as f64 >= PRINTABLE_RATIO
}

/// Estimated printed pages; never less than one.
pub fn paginate(content: &str) -> u32 {
    if content.is_empty() {
        return 1;
    }
    let lines: usize = content
        .split('\n')
        .map(|line| {
            let width = line.trim_end().chars().count();
            width.div_ceil(CHARS_PER_LINE).max(1)
        })
        .sum();
    u32::try_from(lines.div_ceil(LINES_PER_PAGE).max(1)).unwrap_or(u32::MAX)
}
