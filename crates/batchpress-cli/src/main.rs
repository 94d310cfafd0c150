// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batchpress — batch page counting and printing for mixed documents
//
// Entry point. Initialises logging and configuration, builds the handler
// registry, runs the requested batch and reports the summary.

mod cli;
mod progress;
mod report;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use batchpress_bridge::process::SystemProcessRunner;
use batchpress_bridge::{ProcessRunner, office_session};
use batchpress_core::error::Result;
use batchpress_core::{BatchConfig, BatchSummary};
use batchpress_dispatch::{
    BatchControl, BatchCounter, BatchPrinter, CancellationToken, HandlerRegistry, progress_channel,
};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(summary) if summary.failed_count() == 0 && !summary.cancelled => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "batch aborted");
            eprintln!("batchpress: {e}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<BatchSummary> {
    let config = BatchConfig::from_env()?;
    let runner: Arc<dyn ProcessRunner> = Arc::new(SystemProcessRunner);
    let session = office_session(&config, Arc::clone(&runner));
    let registry = Arc::new(HandlerRegistry::with_defaults(&config, session, runner));
    tracing::info!(handlers = registry.handlers().len(), "registry ready");

    let input = match &cli.command {
        Command::Count(input) => input,
        Command::Print(args) => &args.input,
    };
    let files: Vec<_> = input
        .expand()?
        .into_iter()
        .map(|path| registry.describe(path))
        .collect();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling batch");
            on_interrupt.cancel();
        }
    });

    let (tx, rx) = progress_channel(config.progress_capacity);
    let tracker = progress::track(rx, files.len(), cli.quiet || cli.json);
    let control = BatchControl::new().with_progress(tx).with_cancellation(cancel);

    let summary = match &cli.command {
        Command::Count(_) => {
            let mut counter = BatchCounter::new(Arc::clone(&registry), &config)?;
            if let Some(n) = cli.concurrency {
                counter = counter.with_concurrency(n)?;
            }
            counter.run(&files, control).await?
        }
        Command::Print(args) => {
            let job = args.job()?;
            let mut printer = BatchPrinter::new(Arc::clone(&registry), &config)?;
            if let Some(n) = cli.concurrency {
                printer = printer.with_concurrency(n)?;
            }
            printer.run(&files, &job, control).await?
        }
    };
    // The batch dropped its sender, so the tracker drains and exits.
    let _ = tracker.await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::render(&summary));
    }
    Ok(summary)
}
