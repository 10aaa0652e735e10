//! Progress reporting

use crate::executor::TaskOutcome;
use crate::types::Decision;
use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

/// Progress reporter for sync runs
///
/// A spinner covers scanning and metadata collection, a bar counts finished
/// execution tasks.
pub struct ProgressReporter {
    scan_bar: ProgressBar,
    task_bar: ProgressBar,
    started_at: Option<Instant>,
    copied_bytes: u64,
}

impl ProgressReporter {
    /// Create a reporter drawing to stderr
    pub fn new() -> Self {
        let scan_bar = ProgressBar::new_spinner();
        scan_bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            scan_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        let task_bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} finished {pos}/{len} | {msg}")
        {
            task_bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            scan_bar,
            task_bar,
            started_at: None,
            copied_bytes: 0,
        }
    }

    /// Reporter that draws nothing
    pub fn hidden() -> Self {
        let reporter = Self::new();
        reporter.scan_bar.set_draw_target(ProgressDrawTarget::hidden());
        reporter.task_bar.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    pub fn start_scan(&self) {
        self.scan_bar.set_message("Scanning source and target...");
    }

    pub fn finish_scan(&self, files: usize, folders: usize) {
        self.scan_bar.set_message(format!(
            "Scanned {} files in {} folders",
            files, folders
        ));
    }

    pub fn start_metadata(&self, label: &str) {
        self.scan_bar
            .set_message(format!("Reading {} metadata...", label));
    }

    pub fn update_metadata(&self, label: &str, files: u64, bytes: u64) {
        self.scan_bar.set_message(format!(
            "Reading {} metadata... {} files | {}",
            label,
            files,
            HumanBytes(bytes)
        ));
    }

    pub fn finish_metadata(&self, label: &str, files: usize, failures: usize) {
        let message = if failures == 0 {
            format!("Read {} metadata: {} files", label, files)
        } else {
            format!(
                "Read {} metadata: {} files, {} unreadable",
                label, files, failures
            )
        };
        self.scan_bar.set_message(message);
    }

    /// Close the spinner before the summary table or the task bar
    pub fn finish_preparation(&self, decisions: usize, conflicts: usize) {
        self.scan_bar.finish_with_message(format!(
            "Resolved {} action(s), {} conflict(s)",
            decisions, conflicts
        ));
    }

    pub fn start_execution(&mut self, total_tasks: u64) {
        self.started_at = Some(Instant::now());
        self.copied_bytes = 0;
        self.task_bar.set_length(total_tasks);
        self.task_bar.set_position(0);
        self.task_bar.set_message("Starting...");
    }

    /// Show what a worker just picked up
    pub fn task_started(&self, decision: &Decision) {
        self.task_bar
            .set_message(format!("{} {}", decision.action, decision.relpath));
    }

    /// Advance the bar; dry-run descriptions go to stdout, errors to stderr
    pub fn task_finished(&mut self, outcome: &TaskOutcome) {
        self.copied_bytes = self.copied_bytes.saturating_add(outcome.bytes_copied);
        self.task_bar.inc(1);

        // suspend() also prints when stderr is not a terminal, println() would not
        if let Some(description) = &outcome.description {
            self.task_bar.suspend(|| println!("{}", description));
        }
        if let Some(error) = &outcome.error {
            self.task_bar.suspend(|| {
                eprintln!("ERROR {} {}: {}", outcome.action, outcome.relpath, error)
            });
        }

        self.task_bar.set_message(format!(
            "{} copied | {}/s",
            HumanBytes(self.copied_bytes),
            HumanBytes(self.current_throughput_bps())
        ));
    }

    pub fn finish_execution(&self, succeeded: usize, failed: usize, bytes: u64) {
        self.task_bar.finish_with_message(format!(
            "{} succeeded, {} failed | {} copied | {}/s",
            succeeded,
            failed,
            HumanBytes(bytes),
            HumanBytes(self.current_throughput_bps())
        ));
    }

    fn current_throughput_bps(&self) -> u64 {
        match self.started_at {
            Some(started) => {
                let secs = started.elapsed().as_secs_f64();
                if secs > 0.0 {
                    (self.copied_bytes as f64 / secs) as u64
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::TaskState;
    use crate::types::{Action, EntryKind, PathEntry};
    use std::path::{Path, PathBuf};
    use std::thread;

    fn outcome(bytes: u64) -> TaskOutcome {
        TaskOutcome {
            relpath: "a.txt".to_string(),
            action: Action::CopySourceToTarget,
            kind: EntryKind::File,
            state: TaskState::Succeeded,
            bytes_copied: bytes,
            description: None,
            error: None,
        }
    }

    #[test]
    fn test_task_progress_increments_position_and_bytes() {
        let mut reporter = ProgressReporter::hidden();
        reporter.start_execution(2);

        reporter.task_finished(&outcome(128));
        reporter.task_finished(&outcome(256));

        assert_eq!(reporter.task_bar.position(), 2);
        assert_eq!(reporter.task_bar.length(), Some(2));
        assert_eq!(reporter.copied_bytes, 384);
    }

    #[test]
    fn test_task_started_updates_message() {
        let reporter = ProgressReporter::hidden();
        let decision = Decision::new(
            "a/b/file.txt",
            Action::CopyTargetToSource,
            PathEntry::placeholder(EntryKind::File, Path::new("/src"), "a/b/file.txt"),
            PathEntry::file(
                PathBuf::from("/dst/a/b/file.txt"),
                1,
                std::time::UNIX_EPOCH,
            ),
        );

        reporter.task_started(&decision);

        let msg = reporter.task_bar.message();
        assert!(msg.contains("TARGET --> SOURCE"));
        assert!(msg.contains("a/b/file.txt"));
    }

    #[test]
    fn test_throughput_becomes_non_zero_after_copy_time() {
        let mut reporter = ProgressReporter::hidden();
        reporter.start_execution(1);
        thread::sleep(Duration::from_millis(30));
        reporter.task_finished(&outcome(1024));

        assert!(reporter.current_throughput_bps() > 0);
    }

    #[test]
    fn test_phase_methods_execute_without_panicking() {
        let reporter = ProgressReporter::hidden();
        reporter.start_scan();
        reporter.finish_scan(3, 1);
        reporter.start_metadata("source");
        reporter.update_metadata("source", 3, 2048);
        reporter.finish_metadata("source", 3, 1);
        reporter.finish_preparation(2, 0);
    }
}
