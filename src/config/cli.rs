//! Command-line interface definition

use clap::Parser;
use std::path::PathBuf;

/// Two-way directory sync driven by file size and modification time.
///
/// Files are compared only by size and last modification time. Optionally
/// sync only source → target, delete target files missing from the source,
/// or force the source to win every time conflict.
#[derive(Debug, Parser)]
#[command(name = "twinsync", version, about, long_about = None)]
pub struct Cli {
    /// Source directory - from where to sync
    pub source: PathBuf,

    /// Target directory - with which to sync
    pub target: PathBuf,

    /// Folder names (not paths) to exclude, e.g. node_modules .git cache
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub exclude_folder_names: Vec<String>,

    /// File extensions to exclude, e.g. .png .tmp (case-insensitive)
    #[arg(long, num_args = 1.., value_name = "EXT")]
    pub exclude_file_ext: Vec<String>,

    /// Sync only source → target, never target → source
    #[arg(long)]
    pub one_direction_sync: bool,

    /// With --one-direction-sync, delete target paths missing from the source
    #[arg(long)]
    pub delete_orphans: bool,

    /// Always treat the source file as the latest one
    #[arg(long)]
    pub prefer_source: bool,

    /// Do not copy or remove anything, just print the actions
    #[arg(long)]
    pub dry_run: bool,

    /// Number of concurrent workers for the execution phase
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Print a table of pending changes before executing
    #[arg(long)]
    pub summary: bool,

    /// Leave ambiguous conflicts untouched and sync everything else
    #[arg(long)]
    pub skip_conflicts: bool,

    /// TOML file with default options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
