//! Startup record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide bulk write and bounded read APIs over `startups` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `StartupRecord::validate()` before SQL mutations.
//! - Bulk writes are atomic: either every record lands or none do.
//! - Read paths surface invalid persisted rows as `RowOutcome::Invalid` or
//!   `RowOutcome::Unreadable` instead of silently dropping them or failing.
//! - Read limits count valid rows only.

use crate::db::DbError;
use crate::model::record::{RecordValidationError, StartupRecord};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    rowid,
    id,
    name,
    valuation,
    founded_year,
    country,
    sector,
    ai_impact_score,
    growth_rate
FROM startups";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for startup persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One persisted row as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Valid(StartupRecord),
    Invalid(RecordValidationError),
    /// A column holds a value of the wrong SQLite type.
    Unreadable { rowid: i64, reason: String },
}

impl RowOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Repository interface for startup record storage.
pub trait RecordRepository {
    /// Inserts or replaces records by id. Returns the number written.
    fn insert_records(&mut self, records: &[StartupRecord]) -> RepoResult<usize>;
    /// Lists stored rows in insertion order until `limit` valid rows are seen.
    fn list_records(&self, limit: Option<u32>) -> RepoResult<Vec<RowOutcome>>;
    fn count_records(&self) -> RepoResult<u64>;
}

/// SQLite-backed startup repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

/// Read-only view used by the store source; never writes.
pub struct SqliteRecordReader<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordReader<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn list_records(&self, limit: Option<u32>) -> RepoResult<Vec<RowOutcome>> {
        list_records_on(self.conn, limit)
    }

    pub fn count_records(&self) -> RepoResult<u64> {
        count_records_on(self.conn)
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert_records(&mut self, records: &[StartupRecord]) -> RepoResult<usize> {
        for record in records {
            record.validate()?;
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO startups (
                    id,
                    name,
                    valuation,
                    founded_year,
                    country,
                    sector,
                    ai_impact_score,
                    growth_rate
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    valuation = excluded.valuation,
                    founded_year = excluded.founded_year,
                    country = excluded.country,
                    sector = excluded.sector,
                    ai_impact_score = excluded.ai_impact_score,
                    growth_rate = excluded.growth_rate,
                    updated_at = (strftime('%s', 'now') * 1000);",
            )?;
            for record in records {
                stmt.execute(params![
                    record.id.as_str(),
                    record.name.as_str(),
                    record.valuation,
                    record.founded_year,
                    record.country.as_str(),
                    record.sector.as_str(),
                    record.ai_impact_score,
                    record.growth_rate,
                ])?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }

    fn list_records(&self, limit: Option<u32>) -> RepoResult<Vec<RowOutcome>> {
        list_records_on(&*self.conn, limit)
    }

    fn count_records(&self) -> RepoResult<u64> {
        count_records_on(&*self.conn)
    }
}

fn list_records_on(conn: &Connection, limit: Option<u32>) -> RepoResult<Vec<RowOutcome>> {
    let wanted = limit.map_or(usize::MAX, |limit| limit as usize);
    let mut outcomes = Vec::new();
    if wanted == 0 {
        return Ok(outcomes);
    }

    let mut stmt = conn.prepare(&format!("{RECORD_SELECT_SQL} ORDER BY rowid ASC"))?;
    let mut rows = stmt.query([])?;
    let mut valid = 0_usize;

    while let Some(row) = rows.next()? {
        let outcome = match parse_record_row(row)? {
            RowParse::Parsed(record) => match record.validate() {
                Ok(()) => RowOutcome::Valid(record),
                Err(err) => RowOutcome::Invalid(err),
            },
            RowParse::Mistyped { rowid, reason } => RowOutcome::Unreadable { rowid, reason },
        };
        if outcome.is_valid() {
            valid += 1;
        }
        outcomes.push(outcome);
        if valid == wanted {
            break;
        }
    }

    Ok(outcomes)
}

fn count_records_on(conn: &Connection) -> RepoResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM startups;", [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

enum RowParse {
    Parsed(StartupRecord),
    Mistyped { rowid: i64, reason: String },
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<RowParse> {
    let rowid: i64 = row.get(0)?;
    match read_record(row) {
        Ok(record) => Ok(RowParse::Parsed(record)),
        Err(
            err @ (rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)),
        ) => Ok(RowParse::Mistyped {
            rowid,
            reason: err.to_string(),
        }),
        Err(err) => Err(err.into()),
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<StartupRecord> {
    Ok(StartupRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        valuation: row.get("valuation")?,
        founded_year: row.get("founded_year")?,
        country: row.get("country")?,
        sector: row.get("sector")?,
        ai_impact_score: row.get("ai_impact_score")?,
        growth_rate: row.get("growth_rate")?,
    })
}
