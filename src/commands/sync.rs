//! Main sync command

use crate::diff::{merge_trees, relative_path, resolve, Conflict, Resolution, TreeSide};
use crate::executor::{execute, ExecutionCallback, ExecutionEvent, ExecutionReport};
use crate::scanner::{collect_metadata, scan_both, MetadataReport, ProgressCallback, ScanResult};
use crate::types::{SyncError, TreeIndex};
use crate::ui::{format_summary, timestamp_now, ProgressReporter};
use crate::Config;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Index and decisions computed before anything is executed
#[derive(Debug)]
pub struct SyncPlan {
    pub index: TreeIndex,
    pub resolution: Resolution,
    /// Files whose metadata could not be read; their relpaths are not indexed
    pub metadata_failures: Vec<(PathBuf, SyncError)>,
}

/// Outcome of a whole sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    pub decisions: usize,
    /// Conflicts left untouched under `skip_conflicts`
    pub conflicts: Vec<Conflict>,
    pub metadata_failures: Vec<(PathBuf, SyncError)>,
    /// `None` when there was nothing to execute
    pub execution: Option<ExecutionReport>,
}

impl SyncReport {
    /// False when any file was unreadable, conflicted or failed to sync
    pub fn is_success(&self) -> bool {
        self.metadata_failures.is_empty()
            && self.conflicts.is_empty()
            && self
                .execution
                .as_ref()
                .map_or(true, ExecutionReport::is_success)
    }

    /// Collapse the report into the error the binary exits with
    pub fn into_result(self) -> Result<(), SyncError> {
        if let Some(first) = self.conflicts.first() {
            return Err(SyncError::UnresolvedConflicts {
                count: self.conflicts.len(),
                first: first.relpath.clone(),
            });
        }

        let (task_failures, tasks) = self
            .execution
            .as_ref()
            .map_or((0, 0), |report| (report.failed, report.total));
        let failed = task_failures + self.metadata_failures.len();
        if failed > 0 {
            return Err(SyncError::Incomplete {
                failed,
                total: tasks + self.metadata_failures.len(),
            });
        }

        Ok(())
    }
}

/// Scan both trees, collect metadata, merge and resolve
///
/// Nothing on disk is modified.
pub fn build_plan(
    config: &Config,
    reporter: &Arc<Mutex<ProgressReporter>>,
) -> Result<SyncPlan, SyncError> {
    if let Ok(progress) = reporter.lock() {
        progress.start_scan();
    }
    let (source_scan, target_scan) =
        scan_both(&config.source, &config.target, &config.scan_filter())?;
    if let Ok(progress) = reporter.lock() {
        progress.finish_scan(
            source_scan.files.len() + target_scan.files.len(),
            source_scan.folders.len() + target_scan.folders.len(),
        );
    }
    info!(
        source_files = source_scan.files.len(),
        target_files = target_scan.files.len(),
        "scan finished"
    );

    let (source_side, source_meta) = collect_side("source", source_scan, reporter)?;
    let (target_side, target_meta) = collect_side("target", target_scan, reporter)?;

    let mut index = merge_trees(&source_side, &target_side);

    let mut metadata_failures = Vec::new();
    for (root, failures) in [
        (&config.source, source_meta.failures),
        (&config.target, target_meta.failures),
    ] {
        for (path, error) in failures {
            discard_unreadable(&mut index, root, &path);
            metadata_failures.push((path, error));
        }
    }

    let resolution = resolve(&index, config)?;
    if let Ok(progress) = reporter.lock() {
        progress.finish_preparation(resolution.decisions.len(), resolution.conflicts.len());
    }

    Ok(SyncPlan {
        index,
        resolution,
        metadata_failures,
    })
}

fn collect_side(
    label: &'static str,
    scan: ScanResult,
    reporter: &Arc<Mutex<ProgressReporter>>,
) -> Result<(TreeSide, MetadataReport), SyncError> {
    if let Ok(progress) = reporter.lock() {
        progress.start_metadata(label);
    }

    let on_progress: ProgressCallback = {
        let reporter = Arc::clone(reporter);
        Box::new(move |files: u64, bytes: u64| {
            if let Ok(progress) = reporter.lock() {
                progress.update_metadata(label, files, bytes);
            }
        })
    };
    let mut report = collect_metadata(
        scan.files,
        crate::config::default_workers(),
        Some(&on_progress),
    )?;

    if let Ok(progress) = reporter.lock() {
        progress.finish_metadata(label, report.entries.len(), report.failures.len());
    }

    let side = TreeSide {
        root: scan.root,
        folders: scan.folders,
        files: std::mem::take(&mut report.entries),
    };
    Ok((side, report))
}

fn discard_unreadable(index: &mut TreeIndex, root: &Path, path: &Path) {
    if let Some(relpath) = relative_path(root, path) {
        if index.discard(&relpath).is_some() {
            warn!(relpath = %relpath, "metadata unreadable, leaving path untouched on both sides");
        }
    }
}

/// Run the sync operation
///
/// # Errors
/// * Invalid configuration or unreadable roots, before anything is touched
/// * `SyncError::UnresolvedConflicts` when conflicts exist and
///   `skip_conflicts` is off; nothing is executed
///
/// Per-file failures do not return `Err`; they are in the report.
pub fn run(config: &Config) -> Result<SyncReport, SyncError> {
    config.validate()?;

    let reporter = Arc::new(Mutex::new(ProgressReporter::new()));
    let plan = build_plan(config, &reporter)?;

    if config.summary {
        println!(
            "{}",
            format_summary(&config.source, &config.target, &plan.resolution)
        );
    }

    if let Some(error) = plan.resolution.conflict_error() {
        if !config.skip_conflicts {
            return Err(error);
        }
        warn!(
            conflicts = plan.resolution.conflicts.len(),
            "skipping conflicting paths"
        );
    }

    let mut error_records: Vec<ErrorRecord> = plan
        .metadata_failures
        .iter()
        .map(|(path, error)| ErrorRecord::new(Some(path.as_path()), error))
        .collect();

    let mut report = SyncReport {
        decisions: plan.resolution.decisions.len(),
        conflicts: plan.resolution.conflicts.clone(),
        metadata_failures: plan.metadata_failures,
        execution: None,
    };

    if report.decisions == 0 {
        println!("Nothing to sync.");
        print_error_summary(&error_records);
        return Ok(report);
    }

    println!("Sync started at {}", timestamp_now());

    if let Ok(mut progress) = reporter.lock() {
        progress.start_execution(report.decisions as u64);
    }
    let callback: Box<ExecutionCallback> = {
        let reporter = Arc::clone(&reporter);
        Box::new(move |event| match event {
            ExecutionEvent::TaskStarted { decision } => {
                if let Ok(progress) = reporter.lock() {
                    progress.task_started(decision);
                }
            }
            ExecutionEvent::TaskFinished { outcome, .. } => {
                if let Ok(mut progress) = reporter.lock() {
                    progress.task_finished(outcome);
                }
            }
            ExecutionEvent::Complete { report } => {
                if let Ok(progress) = reporter.lock() {
                    progress.finish_execution(report.succeeded, report.failed, report.bytes_copied);
                }
            }
        })
    };

    let execution = execute(
        plan.resolution.into_decisions(),
        config,
        Some(callback.as_ref()),
    )?;

    error_records.extend(execution.failures().filter_map(|outcome| {
        outcome
            .error
            .as_ref()
            .map(|error| ErrorRecord::new(Some(Path::new(&outcome.relpath)), error))
    }));
    print_error_summary(&error_records);

    report.execution = Some(execution);

    if config.dry_run {
        println!("Dry-run mode: no changes were made.");
    } else if report.is_success() {
        println!("Done at {}", timestamp_now());
    }

    Ok(report)
}

fn print_error_summary(records: &[ErrorRecord]) {
    if !records.is_empty() {
        eprintln!("{}", format_error_summary(records));
    }
}

#[derive(Debug)]
struct ErrorRecord {
    kind: &'static str,
    path: Option<PathBuf>,
    message: String,
    suggestion: Option<String>,
}

impl ErrorRecord {
    fn new(path: Option<&Path>, error: &SyncError) -> Self {
        let (message, suggestion) = humanize_error(error);
        Self {
            kind: error_kind_label(error),
            path: path.map(PathBuf::from),
            message,
            suggestion,
        }
    }
}

fn humanize_error(error: &SyncError) -> (String, Option<String>) {
    match error {
        SyncError::Io(io) => match io.kind() {
            ErrorKind::AlreadyExists => (
                "The destination path already exists as a file or directory".to_string(),
                Some("Remove or rename the conflicting path, then retry.".to_string()),
            ),
            ErrorKind::WriteZero | ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof => (
                "File transfer was interrupted before completion".to_string(),
                Some("Retry the sync and check disk stability.".to_string()),
            ),
            _ => (
                format!("I/O operation failed: {}", io),
                Some(
                    "Retry the sync. If this keeps happening, check disk health and permissions."
                        .to_string(),
                ),
            ),
        },
        SyncError::NotFound { .. } => (
            "File or directory disappeared during the sync".to_string(),
            Some("Verify the path still exists and retry.".to_string()),
        ),
        SyncError::PermissionDenied { .. } => (
            "Permission denied while accessing file".to_string(),
            Some("Check file permissions or run with a user that has access.".to_string()),
        ),
        SyncError::DiskFull { .. } => (
            "Not enough disk space to complete operation".to_string(),
            Some("Free disk space on the receiving side and retry.".to_string()),
        ),
        SyncError::AmbiguousConflict { .. } | SyncError::UnresolvedConflicts { .. } => (
            error.to_string(),
            Some("Inspect both copies and touch the one that should win.".to_string()),
        ),
        SyncError::Config(msg) | SyncError::Internal(msg) => (msg.clone(), None),
        SyncError::Incomplete { .. } => (error.to_string(), None),
    }
}

fn error_kind_label(error: &SyncError) -> &'static str {
    match error {
        SyncError::Io(_) => "I/O error",
        SyncError::Config(_) => "Configuration error",
        SyncError::AmbiguousConflict { .. } | SyncError::UnresolvedConflicts { .. } => "Conflict",
        SyncError::NotFound { .. } => "Not found",
        SyncError::PermissionDenied { .. } => "Permission denied",
        SyncError::DiskFull { .. } => "Disk full",
        SyncError::Incomplete { .. } => "Incomplete",
        SyncError::Internal(_) => "Internal error",
    }
}

fn format_error_summary(records: &[ErrorRecord]) -> String {
    let mut groups: BTreeMap<&'static str, Vec<&ErrorRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.kind).or_default().push(record);
    }

    let mut lines = Vec::new();
    lines.push("Error summary:".to_string());
    for (kind, items) in groups {
        lines.push(format!("  {} ({}):", kind, items.len()));
        for record in items.iter().take(3) {
            lines.push(format!("    - {}", record.message));
            if let Some(path) = &record.path {
                lines.push(format!("      Path: {}", path.display()));
            }
            if let Some(suggestion) = &record.suggestion {
                lines.push(format!("      Try: {}", suggestion));
            }
        }
        if items.len() > 3 {
            lines.push(format!("    - ... {} more", items.len() - 3));
        }
    }
    lines.join("\n")
}
