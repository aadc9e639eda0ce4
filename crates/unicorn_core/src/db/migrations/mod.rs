//! Schema steps for the startup store.
//!
//! Each step is one SQL script embedded at build time. The database records
//! the last step it has run in `PRAGMA user_version`, so opening an already
//! current store is a single pragma read.
//!
//! # Invariants
//! - Step numbers start at 1 and grow by one.
//! - All pending steps land in a single transaction, together with the new
//!   `user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(step, script)` pairs in application order.
const SCHEMA_STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_init.sql")),
    (2, include_str!("0002_sector_index.sql")),
];

/// Schema step a fully migrated store reports.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(step, _)| *step)
}

/// Brings the store on `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store was written by a newer build.
/// - `Sqlite` when a script fails; nothing from this call is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    let pending: Vec<_> = SCHEMA_STEPS.iter().filter(|(step, _)| *step > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, script) in &pending {
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", step)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={} to={} steps={}",
        found,
        latest,
        pending.len()
    );
    Ok(())
}

/// Schema step recorded in the store, `0` for a fresh file.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
