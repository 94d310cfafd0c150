// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface of the `batchpress` binary.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use batchpress_core::error::Result;
use batchpress_core::types::{ColorMode, Orientation, PageRange, PaperSize, PrintJobDescriptor};

#[derive(Parser, Debug)]
#[command(name = "batchpress", version, about = "Count and print mixed document batches")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit the summary as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Maximum files in flight (overrides BATCHPRESS_*_CONCURRENCY)
    #[arg(short = 'j', long, global = true)]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count pages, slides, sheet pages and frames
    Count(InputArgs),

    /// Submit every file to a printer
    Print(PrintArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Args, Debug)]
pub struct PrintArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Destination printer (system default when omitted)
    #[arg(short = 'P', long, env = "BATCHPRESS_PRINTER", default_value = "")]
    pub printer: String,

    #[arg(short = 'n', long, default_value_t = 1)]
    pub copies: u32,

    /// A4, A3, A5, Letter, Legal or Tabloid
    #[arg(long, default_value = "A4")]
    pub paper: String,

    /// Print one-sided
    #[arg(long)]
    pub simplex: bool,

    #[arg(long)]
    pub color: bool,

    #[arg(long)]
    pub landscape: bool,

    /// Page selection, e.g. "1-3,5"
    #[arg(long)]
    pub pages: Option<String>,
}

impl PrintArgs {
    pub fn job(&self) -> Result<PrintJobDescriptor> {
        let job = PrintJobDescriptor {
            printer_name: self.printer.clone(),
            paper_size: self.paper.parse::<PaperSize>()?,
            copies: self.copies,
            duplex: !self.simplex,
            color_mode: if self.color {
                ColorMode::Color
            } else {
                ColorMode::Grayscale
            },
            page_range: match &self.pages {
                Some(pages) => PageRange::parse(pages)?,
                None => None,
            },
            orientation: if self.landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
        };
        job.validate()?;
        Ok(job)
    }
}

impl InputArgs {
    /// Expand directories into their regular files, sorted by name.
    ///
    /// Explicit file arguments are kept even when missing so the batch
    /// reports them as unreadable.
    pub fn expand(&self) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for path in &self.paths {
            if path.is_dir() {
                collect_dir(path, self.recursive, &mut out)?;
            } else {
                out.push(path.clone());
            }
        }
        Ok(out)
    }
}

fn collect_dir(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            if recursive {
                collect_dir(&path, true, out)?;
            }
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}
