//! Diff engine - tree merge, comparison and direction resolution

mod compare;
mod merge;
mod resolve;

pub use compare::compare_files;
pub use merge::{merge_trees, relative_path, TreeSide};
pub use resolve::{resolve, resolve_entry, Conflict, Resolution};
