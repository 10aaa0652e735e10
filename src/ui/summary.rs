//! Decision summary table

use crate::diff::Resolution;
use crate::types::{Action, Decision, PathEntry};
use chrono::{DateTime, Local};
use console::style;
use indicatif::HumanBytes;
use std::cmp::Ordering;
use std::path::Path;
use std::time::SystemTime;

const DIRECTION_WIDTH: usize = 17;
const TIME_WIDTH: usize = 41;
const SIZE_WIDTH: usize = 23;

/// Render the table printed by `--summary`
///
/// One row per decision: direction, modification times, sizes and the
/// relative path. Conflicts follow the table.
pub fn format_summary(source: &Path, target: &Path, resolution: &Resolution) -> String {
    let mut lines = Vec::with_capacity(resolution.decisions.len() + 6);

    lines.push(String::new());
    lines.push(format!("{} {}", style("SOURCE:").green(), source.display()));
    lines.push(format!("{} {}", style("TARGET:").yellow(), target.display()));
    lines.push(String::new());
    lines.push(format!(
        "{:<dw$} | {:<tw$} | {:<sw$} | Relative path",
        "Sync direction",
        "Last modification time",
        "File size",
        dw = DIRECTION_WIDTH,
        tw = TIME_WIDTH,
        sw = SIZE_WIDTH,
    ));
    lines.push("-".repeat(DIRECTION_WIDTH + TIME_WIDTH + SIZE_WIDTH + 24));

    for decision in resolution.decisions.values() {
        lines.push(format_row(decision));
    }

    if !resolution.conflicts.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "{} ({}):",
            style("Ambiguous conflicts").red().bold(),
            resolution.conflicts.len()
        ));
        for conflict in &resolution.conflicts {
            lines.push(format!(
                "  {} | size {} != {}",
                conflict.relpath,
                HumanBytes(conflict.source_size),
                HumanBytes(conflict.target_size)
            ));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn format_row(decision: &Decision) -> String {
    let times = format!(
        "{} {} {}",
        format_time(decision.source.mtime),
        compare_symbol(decision.source.mtime, decision.target.mtime),
        format_time(decision.target.mtime)
    );
    let sizes = format!(
        "{} {} {}",
        format_size(&decision.source),
        compare_symbol(decision.source.size, decision.target.size),
        format_size(&decision.target)
    );

    format!(
        "{} | {:<tw$} | {:<sw$} | {}",
        direction_label(decision.action),
        times,
        sizes,
        decision.relpath,
        tw = TIME_WIDTH,
        sw = SIZE_WIDTH,
    )
}

/// Colored, fixed-width direction label
pub fn direction_label(action: Action) -> String {
    let label = format!("{:<width$}", action.label(), width = DIRECTION_WIDTH);
    match action {
        Action::CopySourceToTarget => style(label).green().to_string(),
        Action::CopyTargetToSource => style(label).yellow().to_string(),
        Action::RemoveTarget => style(label).red().to_string(),
    }
}

/// Local time, `-` when unknown
pub fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Current local time for the start and end banners
pub fn timestamp_now() -> String {
    format_time(Some(SystemTime::now()))
}

fn format_size(entry: &PathEntry) -> String {
    match entry.size {
        Some(size) => HumanBytes(size).to_string(),
        None => "-".to_string(),
    }
}

fn compare_symbol<T: Ord>(source: Option<T>, target: Option<T>) -> &'static str {
    match (source, target) {
        (Some(source), Some(target)) => match source.cmp(&target) {
            Ordering::Greater => ">",
            Ordering::Less => "<",
            Ordering::Equal => "=",
        },
        _ => " ",
    }
}
