// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering of a finished batch for the terminal.

use std::fmt::Write;

use batchpress_core::BatchSummary;
use batchpress_core::human_errors::{humanize_skip, humanize_unit_error};
use batchpress_core::types::BatchOperation;

/// Multi-line report: headline, per-family totals, then every failed and
/// skipped file with a plain-language reason.
pub fn render(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{summary}");

    for (family, units) in &summary.per_family_counts {
        let files = summary.per_family_files.get(family).copied().unwrap_or(0);
        let unit = match summary.operation {
            BatchOperation::Count => family.unit_name(),
            BatchOperation::Print => "document",
        };
        let _ = writeln!(out, "  {:<12} {units:>8} {unit}(s) in {files} file(s)", family.to_string());
    }

    for (file, err) in &summary.failed_files {
        let human = humanize_unit_error(err);
        let _ = writeln!(out, "  FAILED  {}: {} [{}]", file.display_name(), human.message, err.kind());
        let _ = writeln!(out, "          {}", human.suggestion);
    }
    for (file, reason) in &summary.skipped_files {
        let human = humanize_skip(*reason);
        let _ = writeln!(out, "  SKIPPED {}: {reason}. {}", file.display_name(), human.suggestion);
    }
    out
}
