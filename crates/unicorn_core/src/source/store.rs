//! Persistent store source backed by the SQLite `startups` table.
//!
//! # Invariants
//! - Resolution opens the database read-only; a missing file is reported as
//!   `SourceError::Missing` and never created.
//! - Invalid or mistyped persisted rows are skipped and counted, not fatal,
//!   and never use up the record limit.

use crate::db::{open_db, open_db_read_only};
use crate::model::dataset::{Dataset, Provenance};
use crate::repo::record_repo::{
    RecordRepository, RowOutcome, SqliteRecordReader, SqliteRecordRepository,
};
use crate::source::{DataSource, SourceError, SourceResult};
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const STORE_SOURCE_ID: &str = "persistent_store";

/// Reads startup rows from a local SQLite database.
#[derive(Debug, Clone)]
pub struct StoreSource {
    path: PathBuf,
}

impl StoreSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for StoreSource {
    fn source_id(&self) -> &str {
        STORE_SOURCE_ID
    }

    fn provenance(&self) -> Provenance {
        Provenance::PersistentStore
    }

    fn load(&self, limit: usize) -> SourceResult<Dataset> {
        let conn = open_db_read_only(&self.path)?;

        let bound = u32::try_from(limit).unwrap_or(u32::MAX);
        let rows = SqliteRecordReader::new(&conn).list_records(Some(bound))?;

        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0_usize;
        for row in rows {
            match row {
                RowOutcome::Valid(record) => records.push(record),
                RowOutcome::Invalid(err) => {
                    skipped += 1;
                    debug!("event=record_skipped module=store reason={}", err);
                }
                RowOutcome::Unreadable { rowid, reason } => {
                    skipped += 1;
                    debug!(
                        "event=record_skipped module=store rowid={} reason={}",
                        rowid, reason
                    );
                }
            }
        }

        if records.is_empty() {
            return Err(SourceError::Empty { skipped });
        }

        let dataset = Dataset::new(Provenance::PersistentStore, records)
            .map_err(|err| SourceError::Parse(err.to_string()))?;
        Ok(dataset.with_skipped(skipped))
    }
}

/// Writes a dataset into the store, creating and migrating it if needed.
///
/// Returns the number of rows written.
///
/// # Side effects
/// - May create the database file.
/// - Upserts every record of `dataset` in one transaction.
pub fn persist_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> SourceResult<usize> {
    let mut conn = open_db(path.as_ref())?;
    let written = SqliteRecordRepository::new(&mut conn).insert_records(dataset.records())?;
    info!(
        "event=store_seeded module=store status=ok rows={} provenance={}",
        written,
        dataset.provenance()
    );
    Ok(written)
}
