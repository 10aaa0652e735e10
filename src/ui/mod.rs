//! Terminal output: progress bars and the summary table

mod progress;
mod summary;

pub use progress::ProgressReporter;
pub use summary::{direction_label, format_summary, format_time, timestamp_now};
