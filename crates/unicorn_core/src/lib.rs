//! Core domain logic for the unicorn startup dashboard.
//!
//! Resolves a startup dataset through an ordered fallback chain (persistent
//! store, static snapshot, remote API, synthetic generator) and maps it to
//! 3D coordinate sets for several visualization styles.

pub mod config;
pub mod db;
pub mod layout;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod source;

pub use config::{ConfigError, DashboardConfig};
pub use layout::{map, map_records, CoordinatePoint, CoordinateSet, LayoutParams, StyleTag};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dataset::{Dataset, DatasetError, Provenance};
pub use model::record::{RecordValidationError, StartupRecord, StartupStatus};
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use service::data_provider::{
    AttemptOutcome, DataProvider, ProviderError, Resolution, SourceAttempt,
};
pub use service::overview::DatasetOverview;
pub use service::session::{DashboardSession, RefreshReport, SessionError, TickOutcome};
pub use source::{DataSource, SourceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
