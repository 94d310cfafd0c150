// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// batchpress-handlers — Per-family document handlers.
//
// PDF pages come from `lopdf`, image frames from `image`/`tiff`, text pages
// from a monospaced layout estimate, and office units from the shared
// automation session. Every print ends at the external print helper; the
// office suite renders its documents to PDF for it.

pub mod handler;
pub mod image;
pub mod office;
pub mod pdf;
pub mod sniff;
pub mod text;

use std::sync::Arc;

use batchpress_bridge::{AutomationSession, HelperPrinter, ProcessRunner};
use batchpress_core::BatchConfig;

pub use handler::DocumentHandler;
pub use image::ImageHandler;
pub use office::OfficeHandler;
pub use pdf::{PdfHandler, PdfReader};
pub use text::TextHandler;

/// The standard handler set, in registration order.
pub fn default_handlers(
    config: &BatchConfig,
    session: AutomationSession,
    runner: Arc<dyn ProcessRunner>,
) -> Vec<Arc<dyn DocumentHandler>> {
    let helper = Arc::new(HelperPrinter::from_config(config, runner));
    vec![
        Arc::new(OfficeHandler::word(session.clone())),
        Arc::new(OfficeHandler::slideshow(session.clone())),
        Arc::new(OfficeHandler::spreadsheet(session)),
        Arc::new(PdfHandler::new(Arc::clone(&helper))),
        Arc::new(ImageHandler::new(Arc::clone(&helper))),
        Arc::new(TextHandler::new(helper)),
    ]
}
