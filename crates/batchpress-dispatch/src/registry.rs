// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handler registry.
//
// Handlers are kept in registration order and resolved newest-first, so a
// later registration overrides an earlier one for the same extension. The
// registry is built at start-up and shared read-only afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use batchpress_bridge::{AutomationSession, ProcessRunner};
use batchpress_core::BatchConfig;
use batchpress_core::error::{UnitError, UnitOutcome};
use batchpress_core::types::{DocumentFamily, DocumentFile};
use batchpress_handlers::DocumentHandler;
use tracing::debug;

#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn DocumentHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard handler set.
    pub fn with_defaults(
        config: &BatchConfig,
        session: AutomationSession,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let mut registry = Self::new();
        for handler in batchpress_handlers::default_handlers(config, session, runner) {
            registry.register(handler);
        }
        registry
    }

    /// Append `handler`; it takes priority over earlier registrations.
    pub fn register(&mut self, handler: Arc<dyn DocumentHandler>) {
        debug!(handler = handler.name(), family = %handler.family(), "handler registered");
        self.handlers.push(handler);
    }

    /// Remove the most recent handler called `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn DocumentHandler>> {
        let position = self.handlers.iter().rposition(|h| h.name() == name)?;
        Some(self.handlers.remove(position))
    }

    /// The handler responsible for `path`.
    pub fn resolve(&self, path: &Path) -> UnitOutcome<Arc<dyn DocumentHandler>> {
        self.handlers
            .iter()
            .rev()
            .find(|h| h.can_handle(path))
            .cloned()
            .ok_or_else(|| UnitError::NotFound(path.display().to_string()))
    }

    /// Build the [`DocumentFile`] for `path`.
    ///
    /// The family comes from the resolving handler, falling back to the
    /// extension table. A size of 0 is recorded when metadata is unavailable;
    /// existence is checked later, at dispatch.
    pub fn describe(&self, path: impl Into<PathBuf>) -> DocumentFile {
        let path = path.into();
        let family = match self.resolve(&path) {
            Ok(handler) => handler.family(),
            Err(_) => DocumentFamily::from_path(&path),
        };
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        DocumentFile::new(path, family, size)
    }

    /// Registered handlers, oldest first.
    pub fn handlers(&self) -> &[Arc<dyn DocumentHandler>] {
        &self.handlers
    }

    /// Every extension some handler accepts.
    pub fn supported_extensions(&self) -> BTreeSet<&'static str> {
        self.handlers
            .iter()
            .flat_map(|h| h.extensions().iter().copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}
