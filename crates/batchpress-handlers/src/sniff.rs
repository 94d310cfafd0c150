// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Magic-byte classification for files without an extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use batchpress_core::types::DocumentFamily;

const SNIFF_LEN: usize = 512;

/// Guess the family of an extension-less file from its first bytes.
///
/// Returns `None` when the file cannot be read or nothing matches. Legacy
/// compound-file documents are not distinguished and yield `None`.
pub fn sniff_family(path: &Path) -> Option<DocumentFamily> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)
        .ok()?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .ok()?;

    if head.starts_with(b"%PDF-") {
        return Some(DocumentFamily::Pdf);
    }
    if head.starts_with(b"PK\x03\x04") {
        return ooxml_family(path);
    }
    if image::guess_format(&head).is_ok() {
        return Some(DocumentFamily::Image);
    }
    if !head.is_empty() && looks_like_text(&head) {
        return Some(DocumentFamily::Text);
    }
    None
}

fn ooxml_family(path: &Path) -> Option<DocumentFamily> {
    let archive = zip::ZipArchive::new(File::open(path).ok()?).ok()?;
    archive
        .file_names()
        .find_map(|name| match name.split('/').next() {
            Some("word") => Some(DocumentFamily::Word),
            Some("ppt") => Some(DocumentFamily::Slideshow),
            Some("xl") => Some(DocumentFamily::Spreadsheet),
            _ => None,
        })
}

fn looks_like_text(head: &[u8]) -> bool {
    // A multi-byte character may be cut at the sniff boundary.
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&head[..e.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return false,
        },
        Err(_) => return false,
    };
    crate::text::is_mostly_printable(text)
}
