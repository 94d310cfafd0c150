// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External print helper: command-line construction and submission.
//
// Two dialects are supported. CUPS `lp` takes IPP job attributes as `-o`
// options; SumatraPDF takes a comma separated `-print-settings` list. Plain
// text on Windows goes through Notepad, which only understands the printer.
// Office documents reach the helper as PDF renderings, so every family gets
// the same job settings in a single submission.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use batchpress_core::BatchConfig;
use batchpress_core::error::UnitOutcome;
use batchpress_core::types::{ColorMode, HelperFlavor, PrintJobDescriptor};
use tracing::{debug, info, instrument};

use crate::process::classify_exit;
use crate::traits::{HelperCommand, ProcessRunner};

/// Submits files to the configured print helper.
pub struct HelperPrinter {
    program: PathBuf,
    flavor: HelperFlavor,
    runner: Arc<dyn ProcessRunner>,
    timeout: Duration,
}

impl HelperPrinter {
    pub fn new(
        program: impl Into<PathBuf>,
        flavor: HelperFlavor,
        runner: Arc<dyn ProcessRunner>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            flavor,
            runner,
            timeout,
        }
    }

    pub fn from_config(config: &BatchConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self::new(
            config.print_helper.clone(),
            config.print_helper_flavor,
            runner,
            config.process_timeout(),
        )
    }

    /// Command printing a PDF or image with every job setting applied.
    pub fn document_command(&self, path: &Path, job: &PrintJobDescriptor) -> HelperCommand {
        match self.flavor {
            HelperFlavor::Cups => lp_command(&self.program, path, job),
            HelperFlavor::Sumatra => sumatra_command(&self.program, path, job),
        }
    }

    /// Command printing a plain-text file.
    pub fn text_command(&self, path: &Path, job: &PrintJobDescriptor) -> HelperCommand {
        match self.flavor {
            HelperFlavor::Cups => lp_options(&self.program, job)
                .args(["-o", "document-format=text/plain"])
                .arg(path),
            HelperFlavor::Sumatra => notepad_command(path, job),
        }
    }

    /// Run `command` and map a non-zero exit onto the error taxonomy.
    #[instrument(skip(self, command), fields(program = %command.program_name()))]
    pub fn submit(&self, command: &HelperCommand) -> UnitOutcome<()> {
        debug!(%command, "submitting to print helper");
        let output = self.runner.run(command, self.timeout)?;
        if !output.success() {
            return Err(classify_exit(command, &output));
        }
        info!("print helper accepted job");
        Ok(())
    }
}

/// CUPS `lp` invocation.
pub fn lp_command(program: &Path, path: &Path, job: &PrintJobDescriptor) -> HelperCommand {
    lp_options(program, job).arg(path)
}

fn lp_options(program: &Path, job: &PrintJobDescriptor) -> HelperCommand {
    let mut cmd = HelperCommand::new(program);
    if !job.printer_name.is_empty() {
        cmd = cmd.arg("-d").arg(&job.printer_name);
    }
    cmd = cmd
        .arg("-n")
        .arg(job.copies.to_string())
        .arg("-o")
        .arg(format!("sides={}", job.sides_keyword()))
        .arg("-o")
        .arg(format!("media={}", job.paper_size.media_name()))
        .arg("-o")
        .arg(format!("orientation-requested={}", job.orientation.ipp_enum_value()))
        .arg("-o")
        .arg(format!("print-color-mode={}", job.color_mode.ipp_keyword()));
    if let Some(range) = &job.page_range {
        cmd = cmd.arg("-o").arg(format!("page-ranges={range}"));
    }
    cmd
}

/// SumatraPDF silent print invocation.
pub fn sumatra_command(program: &Path, path: &Path, job: &PrintJobDescriptor) -> HelperCommand {
    let mut cmd = HelperCommand::new(program);
    cmd = if job.printer_name.is_empty() {
        cmd.arg("-print-to-default")
    } else {
        cmd.arg("-print-to").arg(&job.printer_name)
    };
    cmd.arg("-print-settings")
        .arg(sumatra_settings(job))
        .arg("-silent")
        .arg(path)
}

/// The `-print-settings` list, e.g. `duplexlong,portrait,2x,monochrome,paper=A4`.
pub fn sumatra_settings(job: &PrintJobDescriptor) -> String {
    let mut settings = vec![
        match job.sides_keyword() {
            "two-sided-long-edge" => "duplexlong",
            "two-sided-short-edge" => "duplexshort",
            _ => "simplex",
        }
        .to_string(),
        if job.orientation.is_landscape() {
            "landscape".to_string()
        } else {
            "portrait".to_string()
        },
        format!("{}x", job.copies),
        match job.color_mode {
            ColorMode::Color => "color".to_string(),
            ColorMode::Grayscale => "monochrome".to_string(),
        },
        format!("paper={}", job.paper_size.media_name()),
    ];
    if let Some(range) = &job.page_range {
        settings.push(range.to_string());
    }
    settings.join(",")
}

fn notepad_command(path: &Path, job: &PrintJobDescriptor) -> HelperCommand {
    if job.printer_name.is_empty() {
        HelperCommand::new("notepad.exe").arg("/p").arg(path)
    } else {
        HelperCommand::new("notepad.exe")
            .arg("/pt")
            .arg(path)
            .arg(&job.printer_name)
    }
}
