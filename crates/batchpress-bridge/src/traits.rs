// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits for the outside world.
//
// Implementations are synchronous; the dispatcher runs them on blocking
// worker threads.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use batchpress_core::error::UnitOutcome;
use batchpress_core::types::{DocumentFamily, PrintJobDescriptor, SheetBreaks, spreadsheet_pages};

// ---------------------------------------------------------------------------
// Office automation
// ---------------------------------------------------------------------------

/// A document held open by an [`OfficeAutomation`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedDocument {
    /// Implementation-specific handle.
    pub handle: u64,
    pub path: PathBuf,
    pub family: DocumentFamily,
}

/// Units reported by office automation for an open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitCount {
    Pages(u32),
    Slides(u32),
    /// Page-break layout of every sheet in a workbook.
    Sheets(Vec<SheetBreaks>),
}

impl UnitCount {
    /// Printed units this count represents.
    pub fn total(&self) -> u32 {
        match self {
            Self::Pages(n) | Self::Slides(n) => *n,
            Self::Sheets(sheets) => spreadsheet_pages(sheets),
        }
    }
}

/// A stateful office suite session.
///
/// Not safe for concurrent use; callers go through
/// [`AutomationSession`](crate::session::AutomationSession), which serialises
/// access and always closes what it opened.
pub trait OfficeAutomation: Send {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn open(&mut self, path: &Path) -> UnitOutcome<OpenedDocument>;

    fn unit_count(&mut self, document: &OpenedDocument) -> UnitOutcome<UnitCount>;

    fn print(&mut self, document: &OpenedDocument, job: &PrintJobDescriptor) -> UnitOutcome<()>;

    fn close(&mut self, document: OpenedDocument) -> UnitOutcome<()>;
}

// ---------------------------------------------------------------------------
// External processes
// ---------------------------------------------------------------------------

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl HelperCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// File name of the program, for log lines and error details.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

impl std::fmt::Display for HelperCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs with a hard deadline.
pub trait ProcessRunner: Send + Sync {
    /// Run `command` to completion, killing it once `timeout` elapses.
    ///
    /// A non-zero exit is not an error here; callers classify the output.
    fn run(&self, command: &HelperCommand, timeout: Duration) -> UnitOutcome<ProcessOutput>;
}
