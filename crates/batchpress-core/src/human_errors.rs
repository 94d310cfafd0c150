// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language messages for per-file failures and skips.
//
// The front-end renders these next to each failed or skipped file; the
// severity drives the icon/colour and whether a "Retry" button is offered.

use crate::error::UnitError;
use crate::types::SkipReason;

/// Severity of a unit failure from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Busy printer or slow office suite. Trying again may work.
    Transient,
    /// User must do something (pick another printer, install software).
    ActionRequired,
    /// The file itself is the problem.
    Permanent,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-running the batch for this file may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a [`UnitError`] into something a non-technical user can act on.
pub fn humanize_unit_error(err: &UnitError) -> HumanError {
    match err {
        UnitError::NotFound(ext) => HumanError {
            message: "This type of file can't be counted or printed.".into(),
            suggestion: format!("Save it as a PDF first, then add the PDF instead. ({ext})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        UnitError::Unreadable(_) => HumanError {
            message: "The file couldn't be opened.".into(),
            suggestion: "It may have been moved, deleted, or be open in another program. Check the file and try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        UnitError::Corrupt(_) => HumanError {
            message: "The file appears to be damaged.".into(),
            suggestion: "Try opening it in its own application first. If that works, save a fresh copy and add that.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        UnitError::Encrypted(_) => HumanError {
            message: "The file is password-protected.".into(),
            suggestion: "Open it with its password, save an unprotected copy, and add that copy.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        UnitError::UnsupportedSubformat(detail) => HumanError {
            message: "This version of the file format isn't supported.".into(),
            suggestion: format!("Re-save the file in a current format (for example .docx instead of .doc). ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        UnitError::TimedOut { seconds, .. } => HumanError {
            message: "The file took too long to process.".into(),
            suggestion: format!("Nothing answered within {seconds} seconds. Close other office programs and try again."),
            retriable: true,
            severity: Severity::Transient,
        },

        UnitError::TransientDevice(_) => HumanError {
            message: "The printer or office program was busy.".into(),
            suggestion: "Wait a moment and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        UnitError::FatalDevice(detail) => humanize_device_error(detail),

        UnitError::Cancelled => HumanError {
            message: "This file was not processed because the batch was stopped.".into(),
            suggestion: "Start the batch again to include it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Message for a skipped file.
pub fn humanize_skip(reason: SkipReason) -> HumanError {
    match reason {
        SkipReason::UnsupportedFormat => humanize_unit_error(&UnitError::NotFound(String::new())),
        SkipReason::Cancelled => humanize_unit_error(&UnitError::Cancelled),
        SkipReason::TooLarge { limit_bytes } => HumanError {
            message: "The file is too large to count.".into(),
            suggestion: format!(
                "Files over {} MB are skipped. Split the document and add the parts.",
                limit_bytes / (1024 * 1024)
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Parse helper/automation failure details into specific guidance.
fn humanize_device_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("does not exist") || lower.contains("unknown printer") || lower.contains("no such printer") {
        HumanError {
            message: "That printer couldn't be found.".into(),
            suggestion: "Check the printer name in the print settings, or pick the default printer.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("not installed") || lower.contains("unavailable") || lower.contains("no such file") {
        HumanError {
            message: "The program needed to handle this file isn't installed.".into(),
            suggestion: "Install an office suite (for office files) or the print helper, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The printer reported a problem.".into(),
            suggestion: format!("Check the printer is switched on and has paper, then try again. (Detail: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    }
}
