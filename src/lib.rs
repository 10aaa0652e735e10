//! # twinsync - Metadata-based directory reconciliation
//!
//! Compares a source and a target tree by file size and modification time,
//! decides per relative path which side wins, and applies the decisions on
//! a bounded worker pool.
//!
//! The pipeline runs strictly forward:
//! scanner → metadata → merge → resolve → execute.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod logging;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use types::{Action, Decision, EntryKind, EntryPair, PathEntry, SyncError, TreeIndex};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
