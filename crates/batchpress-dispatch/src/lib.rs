// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batchpress Dispatch — handler registry, retry policy and the concurrent
// batch counter and printer. Handler calls run on tokio's blocking pool,
// gated by a semaphore; results stream out through a bounded progress
// channel and fold into a `BatchSummary`.

mod accumulator;
pub mod counter;
pub mod printer;
pub mod progress;
pub mod registry;
pub mod retry;
mod worker;

pub use counter::BatchCounter;
pub use printer::BatchPrinter;
pub use progress::{BatchControl, ProgressEvent, progress_channel};
pub use registry::HandlerRegistry;
pub use retry::RetryPolicy;
pub use tokio_util::sync::CancellationToken;
