//! In-memory calculation session
//!
//! Holds the control accounts and the PL batches loaded so far. Loaders take
//! `&mut self` and run one at a time; computing only borrows the session.
//! Per-file failures are recorded as warnings and never abort the session.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::accounts::AccountRecord;
use crate::error::FeeError;
use crate::importers::{parse_controle_excel, parse_pl_excel, SnapshotBatch};
use crate::reports::{compute_daily_fees, FeeReport};

#[derive(Debug, Clone)]
pub struct FeeSession {
    year: i32,
    reference: Option<Vec<AccountRecord>>,
    batches: Vec<SnapshotBatch>,
    warnings: Vec<FeeError>,
}

impl FeeSession {
    /// New empty session; `year` dates the PL files
    pub fn new(year: i32) -> Self {
        Self {
            year,
            reference: None,
            batches: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Load the control spreadsheet, replacing any previous one.
    ///
    /// On failure the reference is left unset and the error is recorded.
    /// Returns the number of account records loaded.
    pub fn load_reference(&mut self, bytes: &[u8]) -> Option<usize> {
        match parse_controle_excel(bytes) {
            Ok(records) => {
                let count = records.len();
                self.reference = Some(records);
                Some(count)
            }
            Err(err) => {
                self.reference = None;
                self.record_warning(err);
                None
            }
        }
    }

    /// Load one PL file and append its rows after the ones already loaded.
    ///
    /// On failure nothing is appended and the error is recorded.
    /// Returns the snapshot date of the accepted file.
    pub fn load_snapshot(&mut self, bytes: &[u8], file_name: &str) -> Option<NaiveDate> {
        match parse_pl_excel(bytes, file_name, self.year) {
            Ok(batch) => {
                let date = batch.date;
                info!(
                    "Accepted PL '{}' ({} rows, batch #{})",
                    file_name,
                    batch.rows.len(),
                    self.batches.len() + 1
                );
                self.batches.push(batch);
                Some(date)
            }
            Err(err) => {
                self.record_warning(err);
                None
            }
        }
    }

    /// Compute the fee report from everything loaded so far
    pub fn compute(&self) -> Result<FeeReport, FeeError> {
        let reference = self.reference.as_deref().unwrap_or_default();
        compute_daily_fees(reference, &self.batches)
    }

    pub fn reference(&self) -> Option<&[AccountRecord]> {
        self.reference.as_deref()
    }

    pub fn batches(&self) -> &[SnapshotBatch] {
        &self.batches
    }

    /// Warnings recorded so far, in the order they happened
    pub fn warnings(&self) -> &[FeeError] {
        &self.warnings
    }

    /// Drain recorded warnings for display
    pub fn take_warnings(&mut self) -> Vec<FeeError> {
        std::mem::take(&mut self.warnings)
    }

    /// Record a per-file problem found outside the loaders (e.g. an unreadable path)
    pub fn record_warning(&mut self, err: FeeError) {
        // Callers surface these through `warnings()`; the log line is for tracing only
        debug!("Recorded warning: {}", err);
        self.warnings.push(err);
    }
}
