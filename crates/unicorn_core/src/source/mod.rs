//! Dataset sources behind one fallback-friendly contract.
//!
//! # Responsibility
//! - Define the `DataSource` trait every provider step implements.
//! - Define `SourceError`, the non-fatal "source unavailable" taxonomy.
//!
//! # Invariants
//! - A failed `load` has no side effects beyond the I/O it attempted.
//! - A successful `load` returns a non-empty, validated dataset.

use crate::db::DbError;
use crate::model::dataset::{Dataset, Provenance};
use crate::repo::record_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod normalize;
pub mod remote;
pub mod static_file;
pub mod store;
pub mod synthetic;

pub use normalize::{records_from_values, RecordError};
pub use remote::RemoteSource;
pub use static_file::StaticFileSource;
pub use store::StoreSource;
pub use synthetic::SyntheticSource;

pub type SourceResult<T> = Result<T, SourceError>;

/// One step of the dataset fallback chain.
pub trait DataSource: Send + Sync {
    /// Stable id used in logs and attempt reports.
    fn source_id(&self) -> &str;

    fn provenance(&self) -> Provenance;

    /// Loads at most `limit` records.
    fn load(&self, limit: usize) -> SourceResult<Dataset>;
}

/// Reasons a single source could not supply a dataset.
#[derive(Debug)]
pub enum SourceError {
    /// The source is switched off in configuration.
    Disabled,
    /// None of the configured files/stores exist.
    Missing(Vec<PathBuf>),
    Io { path: PathBuf, error: std::io::Error },
    Db(DbError),
    /// Store exists but carries a schema version this build cannot read.
    SchemaMismatch { found: u32, expected: u32 },
    /// Body or document could not be parsed into records.
    Parse(String),
    Timeout { url: String, attempts: u32 },
    Connect { url: String, message: String },
    HttpStatus { url: String, status: u16 },
    /// Reachable, but yielded zero well-formed records.
    Empty { skipped: usize },
}

impl SourceError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short machine-readable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Missing(_) => "missing",
            Self::Io { .. } => "io",
            Self::Db(_) => "db",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::Parse(_) => "parse",
            Self::Timeout { .. } => "timeout",
            Self::Connect { .. } => "connect",
            Self::HttpStatus { .. } => "http_status",
            Self::Empty { .. } => "empty",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "source disabled by configuration"),
            Self::Missing(paths) => {
                let joined = paths
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "no source file found among [{joined}]")
            }
            Self::Io { path, error } => write!(f, "failed to read {}: {error}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaMismatch { found, expected } => write!(
                f,
                "store schema version {found} does not match supported version {expected}"
            ),
            Self::Parse(message) => write!(f, "malformed source data: {message}"),
            Self::Timeout { url, attempts } => {
                write!(f, "request to {url} timed out after {attempts} attempt(s)")
            }
            Self::Connect { url, message } => write!(f, "request to {url} failed: {message}"),
            Self::HttpStatus { url, status } => {
                write!(f, "request to {url} returned HTTP {status}")
            }
            Self::Empty { skipped } => {
                write!(f, "source yielded no valid records ({skipped} skipped)")
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SourceError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Missing(path) => Self::Missing(vec![path]),
            DbError::SchemaNotReady {
                db_version,
                expected,
            } => Self::SchemaMismatch {
                found: db_version,
                expected,
            },
            DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => Self::SchemaMismatch {
                found: db_version,
                expected: latest_supported,
            },
            other => Self::Db(other),
        }
    }
}

impl From<RepoError> for SourceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::Db(err),
            RepoError::Validation(err) => Self::Parse(err.to_string()),
        }
    }
}
