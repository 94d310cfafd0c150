// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Batchpress dispatcher.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BatchError, UnitError};

/// Unique identifier for one batch run (used in log spans).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which bulk operation a batch performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOperation {
    Count,
    Print,
}

/// Coarse document-type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentFamily {
    Word,
    Slideshow,
    Spreadsheet,
    Pdf,
    Image,
    Text,
    Unknown,
}

impl DocumentFamily {
    /// Infer the family from a file extension (with or without the leading
    /// dot, any case).
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "doc" | "docx" | "wps" => Self::Word,
            "ppt" | "pptx" | "dps" => Self::Slideshow,
            "xls" | "xlsx" | "et" => Self::Spreadsheet,
            "pdf" => Self::Pdf,
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "tiff" | "tif" | "tga" | "bmp" | "dib" => {
                Self::Image
            }
            "txt" => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// Infer the family from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// The natural countable quantity for this family.
    pub fn unit_name(&self) -> &'static str {
        match self {
            Self::Slideshow => "slide",
            Self::Image => "frame",
            _ => "page",
        }
    }
}

impl std::fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Word => "WORD",
            Self::Slideshow => "SLIDESHOW",
            Self::Spreadsheet => "SPREADSHEET",
            Self::Pdf => "PDF",
            Self::Image => "IMAGE",
            Self::Text => "TEXT",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// A file handed to a batch operation.
///
/// The family is fixed when the value is built (normally by the handler
/// registry) and never re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    path: PathBuf,
    family: DocumentFamily,
    size_bytes: u64,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>, family: DocumentFamily, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            family,
            size_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn family(&self) -> DocumentFamily {
        self.family
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PaperSize {
    /// Media name understood by both CUPS `-o media=` and SumatraPDF `paper=`.
    pub fn media_name(&self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::A3 => "A3",
            Self::A5 => "A5",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::Tabloid => "Tabloid",
        }
    }
}

impl std::str::FromStr for PaperSize {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a3" => Ok(Self::A3),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "tabloid" | "ledger" => Ok(Self::Tabloid),
            other => Err(BatchError::InvalidJob(format!("unknown paper size '{other}'"))),
        }
    }
}

/// Colour or monochrome output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    Color,
    Grayscale,
}

impl ColorMode {
    /// IPP `print-color-mode` keyword.
    pub fn ipp_keyword(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Grayscale => "monochrome",
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

impl Orientation {
    /// IPP `orientation-requested` enum value (RFC 8011 §5.2.10).
    pub fn ipp_enum_value(&self) -> i32 {
        match self {
            Self::Portrait => 3,
            Self::Landscape => 4,
            Self::ReversePortrait => 5,
            Self::ReverseLandscape => 6,
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::Landscape | Self::ReverseLandscape)
    }
}

/// One contiguous, inclusive, 1-indexed span of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    pub start: u32,
    pub end: u32,
}

/// Page selection such as `1-3,5`. Absence of a range means all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub spans: Vec<PageSpan>,
}

impl PageRange {
    /// Parse a comma separated list of pages and spans.
    ///
    /// Returns `Ok(None)` for an empty string.
    pub fn parse(input: &str) -> Result<Option<Self>, BatchError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let mut spans = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (parse_page(a, input)?, parse_page(b, input)?),
                None => {
                    let page = parse_page(part, input)?;
                    (page, page)
                }
            };
            spans.push(PageSpan { start, end });
        }

        let range = Self { spans };
        range.check()?;
        Ok(Some(range))
    }

    fn check(&self) -> Result<(), BatchError> {
        if self.spans.is_empty() {
            return Err(BatchError::InvalidJob("page range has no spans".into()));
        }
        for span in &self.spans {
            if span.start == 0 || span.start > span.end {
                return Err(BatchError::InvalidJob(format!(
                    "invalid page span {}-{}",
                    span.start, span.end
                )));
            }
        }
        Ok(())
    }
}

fn parse_page(text: &str, whole: &str) -> Result<u32, BatchError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| BatchError::InvalidJob(format!("malformed page range '{whole}'")))
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .spans
            .iter()
            .map(|s| {
                if s.start == s.end {
                    s.start.to_string()
                } else {
                    format!("{}-{}", s.start, s.end)
                }
            })
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Print settings shared read-only by every unit of a print batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJobDescriptor {
    /// Target printer. Empty means the system default printer.
    pub printer_name: String,
    pub paper_size: PaperSize,
    pub copies: u32,
    pub duplex: bool,
    pub color_mode: ColorMode,
    pub page_range: Option<PageRange>,
    pub orientation: Orientation,
}

impl Default for PrintJobDescriptor {
    fn default() -> Self {
        Self {
            printer_name: String::new(),
            paper_size: PaperSize::A4,
            copies: 1,
            duplex: true,
            color_mode: ColorMode::Grayscale,
            page_range: None,
            orientation: Orientation::Portrait,
        }
    }
}

impl PrintJobDescriptor {
    /// Reject descriptors no handler could honour.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.copies == 0 {
            return Err(BatchError::InvalidJob("copies must be at least 1".into()));
        }
        if let Some(range) = &self.page_range {
            range.check()?;
        }
        Ok(())
    }

    /// IPP `sides` keyword for the duplex flag.
    pub fn sides_keyword(&self) -> &'static str {
        if !self.duplex {
            "one-sided"
        } else if self.orientation.is_landscape() {
            "two-sided-short-edge"
        } else {
            "two-sided-long-edge"
        }
    }
}

/// Classification of errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Busy spooler or automation contention; safe to retry.
    Transient,
    /// Someone must act first (missing printer, no office suite installed).
    UserAction,
    /// Retrying cannot help: the content itself is unusable.
    Permanent,
}

/// The submission mechanism behind a handler's `print`.
///
/// Units on the same channel are submitted strictly in caller order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrintChannel {
    OfficeAutomation,
    PdfHelper,
    ImageHelper,
    TextSpooler,
    Named(String),
}

impl std::fmt::Display for PrintChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OfficeAutomation => f.write_str("office-automation"),
            Self::PdfHelper => f.write_str("pdf-helper"),
            Self::ImageHelper => f.write_str("image-helper"),
            Self::TextSpooler => f.write_str("text-spooler"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Command-line dialect of the external print helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelperFlavor {
    /// CUPS `lp`.
    Cups,
    /// SumatraPDF `-print-to`.
    Sumatra,
}

/// Page-break layout of one spreadsheet sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetBreaks {
    pub horizontal: u32,
    pub vertical: u32,
}

impl SheetBreaks {
    /// Printed pages for this sheet; an empty sheet still prints one page.
    pub fn pages(&self) -> u32 {
        (self.horizontal.saturating_add(1))
            .saturating_mul(self.vertical.saturating_add(1))
            .max(1)
    }
}

/// Total printed pages of a workbook.
pub fn spreadsheet_pages(sheets: &[SheetBreaks]) -> u32 {
    sheets
        .iter()
        .fold(0u32, |total, sheet| total.saturating_add(sheet.pages()))
}

// ---------------------------------------------------------------------------
// Unit results
// ---------------------------------------------------------------------------

/// Terminal status of one file in one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Ok,
    Failed,
    Skipped,
}

/// Why a file was not handed to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    UnsupportedFormat,
    Cancelled,
    TooLarge { limit_bytes: u64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat => f.write_str("unsupported format"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::TooLarge { .. } => f.write_str("file too large"),
        }
    }
}

/// Payload of a [`UnitResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitDetail {
    /// Units counted.
    Count(u32),
    /// Print request handed off to the spooler/helper.
    Submitted,
    Error(UnitError),
    Skipped(SkipReason),
}

/// Outcome of one file in one batch operation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitResult {
    index: usize,
    file: DocumentFile,
    outcome: Outcome,
    detail: UnitDetail,
    elapsed: Duration,
    attempts: u32,
}

impl UnitResult {
    pub fn counted(
        index: usize,
        file: DocumentFile,
        units: u32,
        elapsed: Duration,
        attempts: u32,
    ) -> Self {
        Self {
            index,
            file,
            outcome: Outcome::Ok,
            detail: UnitDetail::Count(units),
            elapsed,
            attempts,
        }
    }

    pub fn submitted(index: usize, file: DocumentFile, elapsed: Duration, attempts: u32) -> Self {
        Self {
            index,
            file,
            outcome: Outcome::Ok,
            detail: UnitDetail::Submitted,
            elapsed,
            attempts,
        }
    }

    /// Record a handler failure. `NotFound` and `Cancelled` become skips.
    pub fn failed(
        index: usize,
        file: DocumentFile,
        error: UnitError,
        elapsed: Duration,
        attempts: u32,
    ) -> Self {
        let (outcome, detail) = match error {
            UnitError::NotFound(_) => (
                Outcome::Skipped,
                UnitDetail::Skipped(SkipReason::UnsupportedFormat),
            ),
            UnitError::Cancelled => (Outcome::Skipped, UnitDetail::Skipped(SkipReason::Cancelled)),
            other => (Outcome::Failed, UnitDetail::Error(other)),
        };
        Self {
            index,
            file,
            outcome,
            detail,
            elapsed,
            attempts,
        }
    }

    pub fn skipped(index: usize, file: DocumentFile, reason: SkipReason) -> Self {
        Self {
            index,
            file,
            outcome: Outcome::Skipped,
            detail: UnitDetail::Skipped(reason),
            elapsed: Duration::ZERO,
            attempts: 0,
        }
    }

    /// Position of the file in the caller's input list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn file(&self) -> &DocumentFile {
        &self.file
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn detail(&self) -> &UnitDetail {
        &self.detail
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Handler invocations made for this file (0 when never dispatched).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn count(&self) -> Option<u32> {
        match self.detail {
            UnitDetail::Count(n) => Some(n),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&UnitError> {
        match &self.detail {
            UnitDetail::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.detail {
            UnitDetail::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}
