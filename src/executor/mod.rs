//! Execution engine: applies decisions on a bounded worker pool

pub mod copy;
pub mod pool;

use crate::types::{Action, Decision, EntryKind, SyncError};
use crate::Config;
use tracing::{debug, info, warn};

pub use copy::{copy_file_atomic, ensure_dir};
pub use pool::{PoolEvent, WorkerPool};

/// Lifecycle of one execution task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// Result of applying one decision
#[derive(Debug)]
pub struct TaskOutcome {
    pub relpath: String,
    pub action: Action,
    pub kind: EntryKind,
    pub state: TaskState,
    /// Bytes written by a file copy
    pub bytes_copied: u64,
    /// What a dry run would have done
    pub description: Option<String>,
    pub error: Option<SyncError>,
}

impl TaskOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == TaskState::Succeeded
    }
}

/// Aggregate result of an execution phase
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub bytes_copied: u64,
    /// One outcome per decision, in decision order
    pub outcomes: Vec<TaskOutcome>,
}

impl ExecutionReport {
    /// True when every task succeeded
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Outcomes of the tasks that failed
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }
}

/// Events emitted while executing decisions
#[derive(Debug)]
pub enum ExecutionEvent<'a> {
    /// A worker picked up a task
    TaskStarted { decision: &'a Decision },
    /// A task reached a terminal state
    TaskFinished {
        finished: usize,
        total: usize,
        outcome: &'a TaskOutcome,
    },
    /// Every task reached a terminal state
    Complete { report: &'a ExecutionReport },
}

/// Optional callback used to receive execution events.
pub type ExecutionCallback = dyn Fn(&ExecutionEvent<'_>) + Send + Sync;

/// Apply decisions concurrently
///
/// Each decision is an independent task; a failing task never cancels its
/// siblings and nothing is retried. Blocks until every task finished.
/// Under `config.dry_run` nothing touches the filesystem and every task
/// succeeds with a description of what it would have done.
///
/// Only pool failures (a panicking task) return `Err`; per-task failures
/// are recorded in the report.
pub fn execute(
    decisions: Vec<Decision>,
    config: &Config,
    on_event: Option<&ExecutionCallback>,
) -> Result<ExecutionReport, SyncError> {
    let total = decisions.len();
    let workers = config.execution_workers();
    let dry_run = config.dry_run;
    info!(tasks = total, workers, dry_run, "executing sync decisions");

    let pool = WorkerPool::new(workers)?;
    let mut states = vec![TaskState::Pending; total];
    let started_decisions = decisions.clone();

    let outcomes = pool.run(
        decisions,
        move |decision| run_task(&decision, dry_run),
        |event| match event {
            PoolEvent::Started { index } => {
                states[index] = TaskState::Running;
                emit_event(
                    on_event,
                    ExecutionEvent::TaskStarted {
                        decision: &started_decisions[index],
                    },
                );
            }
            PoolEvent::Finished {
                index,
                finished,
                total,
                result,
            } => {
                states[index] = result.state;
                emit_event(
                    on_event,
                    ExecutionEvent::TaskFinished {
                        finished,
                        total,
                        outcome: result,
                    },
                );
            }
        },
    )?;

    debug_assert!(states.iter().all(|state| state.is_terminal()));

    let mut report = ExecutionReport {
        total,
        ..Default::default()
    };
    for outcome in outcomes {
        if outcome.succeeded() {
            report.succeeded += 1;
            report.bytes_copied += outcome.bytes_copied;
        } else {
            report.failed += 1;
        }
        report.outcomes.push(outcome);
    }

    emit_event(on_event, ExecutionEvent::Complete { report: &report });
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        bytes = report.bytes_copied,
        "execution finished"
    );

    Ok(report)
}

fn run_task(decision: &Decision, dry_run: bool) -> TaskOutcome {
    let mut outcome = TaskOutcome {
        relpath: decision.relpath.clone(),
        action: decision.action,
        kind: decision.kind(),
        state: TaskState::Running,
        bytes_copied: 0,
        description: None,
        error: None,
    };

    if dry_run {
        outcome.description = Some(describe(decision));
        outcome.state = TaskState::Succeeded;
        return outcome;
    }

    match apply(decision) {
        Ok(bytes) => {
            debug!(relpath = %decision.relpath, action = %decision.action, bytes, "task succeeded");
            outcome.bytes_copied = bytes;
            outcome.state = TaskState::Succeeded;
        }
        Err(err) => {
            warn!(relpath = %decision.relpath, action = %decision.action, error = %err, "task failed");
            outcome.error = Some(err);
            outcome.state = TaskState::Failed;
        }
    }

    outcome
}

fn apply(decision: &Decision) -> Result<u64, SyncError> {
    match (decision.action, decision.kind()) {
        (Action::RemoveTarget, EntryKind::File) => {
            copy::remove_file(&decision.target.path).map(|_| 0)
        }
        (Action::RemoveTarget, EntryKind::Folder) => {
            copy::remove_dir_best_effort(&decision.target.path);
            Ok(0)
        }
        (Action::CopySourceToTarget, EntryKind::File) => {
            copy_file_atomic(&decision.source.path, &decision.target.path)
        }
        (Action::CopyTargetToSource, EntryKind::File) => {
            copy_file_atomic(&decision.target.path, &decision.source.path)
        }
        (Action::CopySourceToTarget, EntryKind::Folder) => {
            ensure_dir(&decision.target.path).map(|_| 0)
        }
        (Action::CopyTargetToSource, EntryKind::Folder) => {
            ensure_dir(&decision.source.path).map(|_| 0)
        }
    }
}

/// Dry-run description of a decision
pub fn describe(decision: &Decision) -> String {
    match (decision.action, decision.kind()) {
        (Action::RemoveTarget, EntryKind::File) => {
            format!("DryRun: remove {}", decision.target.path.display())
        }
        (Action::RemoveTarget, EntryKind::Folder) => {
            format!("DryRun: remove dir {}", decision.target.path.display())
        }
        (Action::CopySourceToTarget, EntryKind::Folder) => {
            format!("DryRun: create dir {}", decision.target.path.display())
        }
        (Action::CopyTargetToSource, EntryKind::Folder) => {
            format!("DryRun: create dir {}", decision.source.path.display())
        }
        (Action::CopySourceToTarget, EntryKind::File) => format!(
            "DryRun: copy {} ---> {}",
            decision.source.path.display(),
            decision.target.path.display()
        ),
        (Action::CopyTargetToSource, EntryKind::File) => format!(
            "DryRun: copy {} ---> {}",
            decision.target.path.display(),
            decision.source.path.display()
        ),
    }
}

fn emit_event(on_event: Option<&ExecutionCallback>, event: ExecutionEvent<'_>) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
