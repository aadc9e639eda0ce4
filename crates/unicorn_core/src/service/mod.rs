//! Dashboard use-case services.
//!
//! # Responsibility
//! - Resolve datasets through the source fallback chain.
//! - Hold session state for a dashboard view.
//! - Keep the CLI and rendering layers decoupled from sources and storage.

pub mod data_provider;
pub mod overview;
pub mod session;
