// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batchpress — Outbound capabilities.
//
// Everything that leaves the process lives here: the office automation
// session, the print helper and the timed runner for external programs.
// Handlers only see the traits, so tests can substitute scripted fakes.

pub mod helper;
pub mod libreoffice;
pub mod process;
pub mod session;
pub mod stub;
pub mod traits;

use std::sync::Arc;

use batchpress_core::BatchConfig;

pub use helper::HelperPrinter;
pub use session::AutomationSession;
pub use traits::{HelperCommand, OfficeAutomation, OpenedDocument, ProcessOutput, ProcessRunner, UnitCount};

/// Build the shared office automation session for `config`.
///
/// An empty `office_program` disables automation: every office file then
/// fails with a fatal device error instead of spawning anything.
pub fn office_session(config: &BatchConfig, runner: Arc<dyn ProcessRunner>) -> AutomationSession {
    if config.office_program.as_os_str().is_empty() {
        tracing::warn!("no office program configured; office documents will fail");
        return AutomationSession::new(stub::UnavailableAutomation::new(
            "no office program configured",
        ));
    }
    let printer = Arc::new(HelperPrinter::from_config(config, Arc::clone(&runner)));
    AutomationSession::new(libreoffice::LibreOfficeAutomation::new(
        config.office_program.clone(),
        runner,
        printer,
        config.process_timeout(),
    ))
}
