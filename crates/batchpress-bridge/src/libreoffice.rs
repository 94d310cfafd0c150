// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Office automation backed by a LibreOffice-compatible suite.
//
// OOXML packages are inspected directly: Word page totals come from the
// extended properties, slides from the slide parts, and spreadsheet pages
// from the manual page breaks of each worksheet. Legacy binary formats, and
// Word files without a stored page total, are converted to PDF by the suite
// and the PDF pages are counted instead. Printing renders the document to
// PDF the same way and hands that file to the print helper once, with
// every job setting and the full copy count.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use batchpress_core::error::{UnitError, UnitOutcome};
use batchpress_core::types::{DocumentFamily, PrintJobDescriptor, SheetBreaks};
use regex::Regex;
use tracing::{debug, instrument};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::helper::HelperPrinter;
use crate::process::classify_exit;
use crate::traits::{HelperCommand, OfficeAutomation, OpenedDocument, ProcessRunner, UnitCount};

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// Compound File Binary header: legacy Office files and encrypted OOXML.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

static PAGES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:\w+:)?Pages>\s*(\d+)\s*</(?:\w+:)?Pages>").expect("valid regex")
});
static SLIDE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide\d+\.xml$").expect("valid regex"));
static SHEET_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^xl/worksheets/sheet\d+\.xml$").expect("valid regex"));
static ROW_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:\w+:)?rowBreaks\b[^>]*?(?:/>|>(.*?)</(?:\w+:)?rowBreaks>)")
        .expect("valid regex")
});
static COL_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:\w+:)?colBreaks\b[^>]*?(?:/>|>(.*?)</(?:\w+:)?colBreaks>)")
        .expect("valid regex")
});
static BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:\w+:)?brk\b").expect("valid regex"));

enum Package {
    Ooxml(ZipArchive<BufReader<File>>),
    Legacy,
}

/// Headless office suite driven through its command line.
pub struct LibreOfficeAutomation {
    program: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    printer: Arc<HelperPrinter>,
    timeout: Duration,
    next_handle: u64,
    open: HashMap<u64, Package>,
}

impl LibreOfficeAutomation {
    pub fn new(
        program: PathBuf,
        runner: Arc<dyn ProcessRunner>,
        printer: Arc<HelperPrinter>,
        timeout: Duration,
    ) -> Self {
        Self {
            program,
            runner,
            printer,
            timeout,
            next_handle: 1,
            open: HashMap::new(),
        }
    }

    fn package(&mut self, document: &OpenedDocument) -> UnitOutcome<&mut Package> {
        self.open.get_mut(&document.handle).ok_or_else(|| {
            UnitError::FatalDevice(format!(
                "document {} is not open in this session",
                document.path.display()
            ))
        })
    }

    /// Let the suite render `path` to PDF inside `outdir`.
    fn render_pdf(&self, path: &Path, outdir: &Path) -> UnitOutcome<PathBuf> {
        let command = HelperCommand::new(&self.program)
            .args(["--headless", "--norestore", "--convert-to", "pdf", "--outdir"])
            .arg(outdir)
            .arg(path);

        let output = self.runner.run(&command, self.timeout)?;
        if !output.success() {
            return Err(classify_exit(&command, &output));
        }

        let mut name = path.file_stem().unwrap_or_default().to_os_string();
        name.push(".pdf");
        let pdf = outdir.join(name);
        if !pdf.exists() {
            return Err(UnitError::Corrupt(format!(
                "{}: office suite produced no output",
                path.display()
            )));
        }
        Ok(pdf)
    }

    /// Render to PDF and count the result.
    #[instrument(skip(self), fields(path = %path.display()))]
    fn converted_pages(&self, path: &Path) -> UnitOutcome<u32> {
        let outdir = scratch_dir()?;
        let pdf = self.render_pdf(path, outdir.path())?;
        let pages = lopdf::Document::load(&pdf)
            .map_err(|e| UnitError::Corrupt(format!("{}: converted PDF unreadable: {e}", path.display())))?
            .get_pages()
            .len();
        debug!(pages, "counted converted document");
        Ok(u32::try_from(pages).unwrap_or(u32::MAX))
    }
}

impl OfficeAutomation for LibreOfficeAutomation {
    fn name(&self) -> &str {
        "libreoffice"
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn open(&mut self, path: &Path) -> UnitOutcome<OpenedDocument> {
        let mut family = DocumentFamily::from_path(path);
        if family != DocumentFamily::Unknown && !is_office(family) {
            return Err(UnitError::UnsupportedSubformat(format!(
                "{} is not an office document",
                path.display()
            )));
        }

        let mut file = File::open(path).map_err(|e| UnitError::from_io(path, &e))?;
        let mut magic = [0u8; 8];
        let read = read_prefix(&mut file, &mut magic).map_err(|e| UnitError::from_io(path, &e))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| UnitError::from_io(path, &e))?;

        let package = if read >= 4 && magic[..4] == ZIP_MAGIC {
            let archive =
                ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(path, e))?;
            if family == DocumentFamily::Unknown {
                family = package_family(&archive);
            }
            Package::Ooxml(archive)
        } else if read == 8 && magic == CFB_MAGIC {
            if is_ooxml_extension(path) {
                // OOXML wrapped in a compound file is the encrypted form.
                return Err(UnitError::Encrypted(path.display().to_string()));
            }
            Package::Legacy
        } else {
            return Err(UnitError::Corrupt(format!(
                "{}: not an office package",
                path.display()
            )));
        };

        if !is_office(family) {
            return Err(UnitError::UnsupportedSubformat(format!(
                "{} is not an office document",
                path.display()
            )));
        }

        let handle = self.next_handle;
        self.next_handle += 1;
        self.open.insert(handle, package);
        Ok(OpenedDocument {
            handle,
            path: path.to_path_buf(),
            family,
        })
    }

    fn unit_count(&mut self, document: &OpenedDocument) -> UnitOutcome<UnitCount> {
        let path = document.path.clone();
        let family = document.family;

        let count = match self.package(document)? {
            Package::Ooxml(archive) => match family {
                DocumentFamily::Word => {
                    let app = read_part(archive, &path, "docProps/app.xml").ok();
                    app.as_deref().and_then(stored_page_total).map(UnitCount::Pages)
                }
                DocumentFamily::Slideshow => {
                    let slides = archive.file_names().filter(|n| SLIDE_PART.is_match(n)).count();
                    Some(UnitCount::Slides(u32::try_from(slides).unwrap_or(u32::MAX)))
                }
                _ => {
                    let mut parts: Vec<String> = archive
                        .file_names()
                        .filter(|n| SHEET_PART.is_match(n))
                        .map(str::to_string)
                        .collect();
                    parts.sort();
                    let mut sheets = Vec::with_capacity(parts.len());
                    for part in &parts {
                        sheets.push(sheet_breaks(&read_part(archive, &path, part)?));
                    }
                    Some(UnitCount::Sheets(sheets))
                }
            },
            Package::Legacy => None,
        };

        match count {
            Some(count) => Ok(count),
            None => {
                let pages = self.converted_pages(&path)?;
                Ok(match family {
                    DocumentFamily::Slideshow => UnitCount::Slides(pages),
                    _ => UnitCount::Pages(pages),
                })
            }
        }
    }

    /// Renders to PDF, then makes exactly one helper submission carrying
    /// every job setting and the full copy count.
    #[instrument(skip(self, job), fields(path = %document.path.display(), printer = %job.printer_name))]
    fn print(&mut self, document: &OpenedDocument, job: &PrintJobDescriptor) -> UnitOutcome<()> {
        self.package(document)?;

        let outdir = scratch_dir()?;
        let pdf = self.render_pdf(&document.path, outdir.path())?;
        debug!(pdf = %pdf.display(), "rendered for printing");
        self.printer.submit(&self.printer.document_command(&pdf, job))
    }

    fn close(&mut self, document: OpenedDocument) -> UnitOutcome<()> {
        self.open.remove(&document.handle);
        Ok(())
    }
}

fn scratch_dir() -> UnitOutcome<tempfile::TempDir> {
    tempfile::tempdir()
        .map_err(|e| UnitError::TransientDevice(format!("cannot create scratch dir: {e}")))
}

fn read_prefix(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn is_office(family: DocumentFamily) -> bool {
    matches!(
        family,
        DocumentFamily::Word | DocumentFamily::Slideshow | DocumentFamily::Spreadsheet
    )
}

/// Family of an extension-less OOXML package, from its top-level part folder.
fn package_family(archive: &ZipArchive<BufReader<File>>) -> DocumentFamily {
    archive
        .file_names()
        .find_map(|name| match name.split('/').next() {
            Some("word") => Some(DocumentFamily::Word),
            Some("ppt") => Some(DocumentFamily::Slideshow),
            Some("xl") => Some(DocumentFamily::Spreadsheet),
            _ => None,
        })
        .unwrap_or(DocumentFamily::Unknown)
}

fn is_ooxml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "docx" | "pptx" | "xlsx"))
        .unwrap_or(false)
}

fn read_part(
    archive: &mut ZipArchive<BufReader<File>>,
    path: &Path,
    name: &str,
) -> UnitOutcome<String> {
    let mut entry = archive.by_name(name).map_err(|e| zip_error(path, e))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| UnitError::Corrupt(format!("{}: {name}: {e}", path.display())))?;
    Ok(xml)
}

fn zip_error(path: &Path, err: ZipError) -> UnitError {
    match err {
        ZipError::Io(e) => UnitError::from_io(path, &e),
        ZipError::UnsupportedArchive(detail) => {
            UnitError::UnsupportedSubformat(format!("{}: {detail}", path.display()))
        }
        other => UnitError::Corrupt(format!("{}: {other}", path.display())),
    }
}

/// Page total recorded by the authoring application, if any.
pub(crate) fn stored_page_total(app_xml: &str) -> Option<u32> {
    PAGES
        .captures(app_xml)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Manual page breaks of one worksheet.
pub(crate) fn sheet_breaks(sheet_xml: &str) -> SheetBreaks {
    SheetBreaks {
        horizontal: count_breaks(&ROW_BREAKS, sheet_xml),
        vertical: count_breaks(&COL_BREAKS, sheet_xml),
    }
}

fn count_breaks(section: &Regex, xml: &str) -> u32 {
    section
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|body| BREAK.find_iter(body.as_str()).count())
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
