//! Provenance-tagged dataset of startup records.
//!
//! # Responsibility
//! - Hold one immutable, normalized snapshot of records per load cycle.
//! - Record which source supplied it and how many inputs were dropped.
//!
//! # Invariants
//! - A dataset is never empty.
//! - Record identifiers are unique.
//! - Every record passes `StartupRecord::validate()`.

use crate::model::record::{RecordValidationError, StartupRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Source that ultimately supplied a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    PersistentStore,
    StaticFile,
    RemoteApi,
    Synthetic,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PersistentStore => "persistent-store",
            Self::StaticFile => "static-file",
            Self::RemoteApi => "remote-api",
            Self::Synthetic => "synthetic",
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, validated collection of startup records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    provenance: Provenance,
    records: Vec<StartupRecord>,
    skipped: usize,
    seed: Option<u64>,
}

impl Dataset {
    /// Builds a dataset after checking every invariant.
    ///
    /// # Errors
    /// - `DatasetError::Empty` when `records` is empty.
    /// - `DatasetError::DuplicateId` when two records share an id.
    /// - `DatasetError::InvalidRecord` when a record fails validation.
    pub fn new(provenance: Provenance, records: Vec<StartupRecord>) -> DatasetResult<Self> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !seen.insert(record.id.as_str()) {
                return Err(DatasetError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self {
            provenance,
            records,
            skipped: 0,
            seed: None,
        })
    }

    /// Sets the number of malformed input records dropped while building.
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    /// Records the generator seed that produced this dataset.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns a copy holding at most `cap` records (never fewer than one).
    pub fn truncated(&self, cap: usize) -> Self {
        let keep = cap.max(1).min(self.records.len());
        Self {
            provenance: self.provenance,
            records: self.records[..keep].to_vec(),
            skipped: self.skipped,
            seed: self.seed,
        }
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn records(&self) -> &[StartupRecord] {
        &self.records
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for a constructed dataset; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<StartupRecord> {
        self.records
    }
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Dataset construction failures.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    Empty,
    DuplicateId(String),
    InvalidRecord(RecordValidationError),
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "dataset must contain at least one record"),
            Self::DuplicateId(id) => write!(f, "duplicate record id `{id}`"),
            Self::InvalidRecord(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DatasetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            Self::Empty | Self::DuplicateId(_) => None,
        }
    }
}

impl From<RecordValidationError> for DatasetError {
    fn from(value: RecordValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}
