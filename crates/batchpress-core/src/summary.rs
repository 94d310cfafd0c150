// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Aggregated report of a batch run.
//
// `record` is commutative: folding the same set of unit results in any order
// yields the same totals, and `finish` restores caller order in the lists.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnitError;
use crate::types::{
    BatchId, BatchOperation, DocumentFamily, DocumentFile, Outcome, SkipReason, UnitDetail,
    UnitResult,
};

/// Folded result of a counting or printing batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub operation: BatchOperation,
    /// Number of files the caller supplied.
    pub total_files: usize,
    /// Units per family. For print batches this is documents submitted.
    pub per_family_counts: BTreeMap<DocumentFamily, u64>,
    /// Files per family that completed successfully.
    pub per_family_files: BTreeMap<DocumentFamily, usize>,
    /// Failed files per family.
    pub per_family_failures: BTreeMap<DocumentFamily, usize>,
    pub total_units: u64,
    pub failed_files: Vec<(DocumentFile, UnitError)>,
    pub skipped_files: Vec<(DocumentFile, SkipReason)>,
    /// Every unit result, in caller order once finished.
    pub results: Vec<UnitResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Whether cancellation was raised before every unit was dispatched.
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn new(batch_id: BatchId, operation: BatchOperation, total_files: usize) -> Self {
        Self {
            batch_id,
            operation,
            total_files,
            per_family_counts: BTreeMap::new(),
            per_family_files: BTreeMap::new(),
            per_family_failures: BTreeMap::new(),
            total_units: 0,
            failed_files: Vec::new(),
            skipped_files: Vec::new(),
            results: Vec::with_capacity(total_files),
            started_at: Utc::now(),
            finished_at: None,
            cancelled: false,
        }
    }

    /// Fold one unit result into the totals.
    pub fn record(&mut self, result: UnitResult) {
        let family = result.file().family();
        match result.detail() {
            UnitDetail::Count(units) => {
                let units = u64::from(*units);
                *self.per_family_counts.entry(family).or_insert(0) += units;
                *self.per_family_files.entry(family).or_insert(0) += 1;
                self.total_units += units;
            }
            UnitDetail::Submitted => {
                *self.per_family_counts.entry(family).or_insert(0) += 1;
                *self.per_family_files.entry(family).or_insert(0) += 1;
                self.total_units += 1;
            }
            UnitDetail::Error(err) => {
                *self.per_family_failures.entry(family).or_insert(0) += 1;
                self.failed_files.push((result.file().clone(), err.clone()));
            }
            UnitDetail::Skipped(reason) => {
                self.skipped_files.push((result.file().clone(), *reason));
            }
        }
        self.results.push(result);
    }

    /// Seal the summary: stamp the finish time and restore caller order.
    pub fn finish(&mut self, cancelled: bool) {
        self.results.sort_by_key(UnitResult::index);

        self.failed_files = self
            .results
            .iter()
            .filter_map(|r| r.error().map(|e| (r.file().clone(), e.clone())))
            .collect();
        self.skipped_files = self
            .results
            .iter()
            .filter_map(|r| r.skip_reason().map(|s| (r.file().clone(), s)))
            .collect();

        self.cancelled = cancelled;
        self.finished_at = Some(Utc::now());
    }

    /// Number of results recorded so far.
    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn ok_count(&self) -> usize {
        self.count_outcome(Outcome::Ok)
    }

    pub fn failed_count(&self) -> usize {
        self.count_outcome(Outcome::Failed)
    }

    pub fn skipped_count(&self) -> usize {
        self.count_outcome(Outcome::Skipped)
    }

    /// Every input file appears exactly once across Ok/Failed/Skipped.
    pub fn is_complete(&self) -> bool {
        self.ok_count() + self.failed_count() + self.skipped_count() == self.total_files
    }

    /// Units counted for one family (0 when absent).
    pub fn family_total(&self, family: DocumentFamily) -> u64 {
        self.per_family_counts.get(&family).copied().unwrap_or(0)
    }

    fn count_outcome(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome() == outcome).count()
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self.operation {
            BatchOperation::Count => "counted",
            BatchOperation::Print => "printed",
        };
        write!(
            f,
            "{} of {} files {verb} ({} units), {} failed, {} skipped",
            self.ok_count(),
            self.total_files,
            self.total_units,
            self.failed_count(),
            self.skipped_count(),
        )?;
        if self.cancelled {
            f.write_str(" [cancelled]")?;
        }
        Ok(())
    }
}
