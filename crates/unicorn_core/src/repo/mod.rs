//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for the startup store.
//! - Isolate SQLite query details from source/provider orchestration.

pub mod record_repo;
