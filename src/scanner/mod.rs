//! Directory scanning and metadata collection

mod metadata;
mod walker;

pub use metadata::{collect_metadata, stat_file, FileStat, MetadataReport, ProgressCallback};
pub use walker::{scan_both, scan_tree, ScanFilter, ScanResult};
