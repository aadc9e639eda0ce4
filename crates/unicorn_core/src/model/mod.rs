//! Domain model for startup datasets.
//!
//! # Responsibility
//! - Define canonical record and dataset structures shared by every source.
//! - Keep one normalized tabular shape regardless of provenance.
//!
//! # Invariants
//! - Every record entering a dataset has passed validation.
//! - Datasets are immutable once constructed.

pub mod dataset;
pub mod record;
