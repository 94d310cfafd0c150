// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal progress bar fed by the batch progress stream.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use batchpress_core::types::Outcome;
use batchpress_dispatch::ProgressEvent;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

fn bar(len: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Drain `events` into a bar of `total` steps until the batch drops its
/// sender. Failed files are echoed above the bar as they happen.
pub fn track(
    mut events: mpsc::Receiver<ProgressEvent>,
    total: usize,
    hidden: bool,
) -> JoinHandle<()> {
    let pb = bar(total as u64, hidden);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if event.outcome == Outcome::Failed {
                pb.println(format!("failed: {}", event.file.display_name()));
            }
            pb.set_message(event.file.display_name());
            pb.set_position(event.completed as u64);
        }
        pb.finish_and_clear();
    })
}
