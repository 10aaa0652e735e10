//! Core type definitions for twinsync

mod action;
mod entry;
mod error;
mod index;

pub use action::{Action, Decision};
pub use entry::{join_relpath, EntryKind, PathEntry};
pub use error::SyncError;
pub use index::{EntryPair, TreeIndex};
