// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word, slideshow and spreadsheet handlers.
//
// All three share the single office automation session; every call opens
// the document through the session's scoped guard.

use std::path::Path;

use batchpress_bridge::AutomationSession;
use batchpress_core::error::UnitOutcome;
use batchpress_core::types::{DocumentFamily, PrintChannel, PrintJobDescriptor};
use tracing::{debug, instrument};

use crate::handler::DocumentHandler;

pub struct OfficeHandler {
    family: DocumentFamily,
    name: &'static str,
    extensions: &'static [&'static str],
    session: AutomationSession,
}

impl OfficeHandler {
    pub fn word(session: AutomationSession) -> Self {
        Self {
            family: DocumentFamily::Word,
            name: "word",
            extensions: &["doc", "docx", "wps"],
            session,
        }
    }

    pub fn slideshow(session: AutomationSession) -> Self {
        Self {
            family: DocumentFamily::Slideshow,
            name: "slideshow",
            extensions: &["ppt", "pptx", "dps"],
            session,
        }
    }

    pub fn spreadsheet(session: AutomationSession) -> Self {
        Self {
            family: DocumentFamily::Spreadsheet,
            name: "spreadsheet",
            extensions: &["xls", "xlsx", "et"],
            session,
        }
    }
}

impl DocumentHandler for OfficeHandler {
    fn name(&self) -> &str {
        self.name
    }

    fn family(&self) -> DocumentFamily {
        self.family
    }

    fn extensions(&self) -> &[&'static str] {
        self.extensions
    }

    #[instrument(skip(self), fields(handler = self.name, path = %path.display()))]
    fn count(&self, path: &Path) -> UnitOutcome<u32> {
        let count = self
            .session
            .with_document(path, |automation, document| automation.unit_count(document))?;
        debug!(?count, "office units");
        Ok(count.total())
    }

    #[instrument(skip(self, job), fields(handler = self.name, path = %path.display()))]
    fn print(&self, path: &Path, job: &PrintJobDescriptor) -> UnitOutcome<()> {
        self.session
            .with_document(path, |automation, document| automation.print(document, job))
    }

    fn print_channel(&self) -> PrintChannel {
        PrintChannel::OfficeAutomation
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use batchpress_bridge::{OfficeAutomation, OpenedDocument, UnitCount};
    use batchpress_core::error::UnitError;
    use batchpress_core::types::SheetBreaks;

    use super::*;

    /// Automation answering from a fixed table and logging calls.
    struct Table {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl OfficeAutomation for Table {
        fn name(&self) -> &str {
            "table"
        }

        fn open(&mut self, path: &Path) -> UnitOutcome<OpenedDocument> {
            self.log.lock().expect("lock").push(format!("open {}", path.display()));
            Ok(OpenedDocument {
                handle: 7,
                path: path.to_path_buf(),
                family: DocumentFamily::from_path(path),
            })
        }

        fn unit_count(&mut self, document: &OpenedDocument) -> UnitOutcome<UnitCount> {
            match document.family {
                DocumentFamily::Word => Ok(UnitCount::Pages(5)),
                DocumentFamily::Slideshow => Ok(UnitCount::Slides(0)),
                DocumentFamily::Spreadsheet => Ok(UnitCount::Sheets(vec![
                    SheetBreaks::default(),
                    SheetBreaks { horizontal: 1, vertical: 1 },
                ])),
                _ => Err(UnitError::UnsupportedSubformat("not office".into())),
            }
        }

        fn print(&mut self, document: &OpenedDocument, job: &PrintJobDescriptor) -> UnitOutcome<()> {
            self.log
                .lock()
                .expect("lock")
                .push(format!("print {} x{}", document.path.display(), job.copies));
            Ok(())
        }

        fn close(&mut self, document: OpenedDocument) -> UnitOutcome<()> {
            self.log.lock().expect("lock").push(format!("close {}", document.path.display()));
            Ok(())
        }
    }

    fn session() -> (AutomationSession, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (AutomationSession::new(Table { log: Arc::clone(&log) }), log)
    }

    #[test]
    fn families_report_their_units() {
        let (session, _) = session();
        assert_eq!(OfficeHandler::word(session.clone()).count(Path::new("a.docx")).expect("word"), 5);
        assert_eq!(OfficeHandler::slideshow(session.clone()).count(Path::new("b.pptx")).expect("deck"), 0);
        assert_eq!(OfficeHandler::spreadsheet(session).count(Path::new("c.xlsx")).expect("book"), 1 + 4);
    }

    #[test]
    fn print_opens_prints_and_closes() {
        let (session, log) = session();
        let handler = OfficeHandler::word(session);
        let job = PrintJobDescriptor {
            copies: 3,
            ..Default::default()
        };
        handler.print(Path::new("a.docx"), &job).expect("print");
        assert_eq!(
            *log.lock().expect("lock"),
            vec!["open a.docx", "print a.docx x3", "close a.docx"]
        );
        assert_eq!(handler.print_channel(), PrintChannel::OfficeAutomation);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let (session, _) = session();
        let handler = OfficeHandler::spreadsheet(session);
        assert!(handler.can_handle(Path::new("Q3 BUDGET.XLSX")));
        assert!(handler.can_handle(Path::new("ledger.et")));
        assert!(!handler.can_handle(Path::new("ledger.csv")));
    }
}
