//! CLI argument definitions for Todosnap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Todosnap - snapshot, summarize, and diff Todoist task data.
#[derive(Parser, Debug)]
#[command(name = "tsnap")]
#[command(author, version, about = "Snapshot and summarize Todoist task data", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a snapshot: fetch tasks/projects/labels, normalize, filter,
    /// redact, and write a timestamped snapshot directory with reports.
    Snapshot {
        /// Todoist API token. Read from the environment; never logged.
        #[arg(long, env = "TODOIST_API_TOKEN", hide_env_values = true)]
        token: String,

        /// Base directory for snapshot data (defaults to the platform data
        /// dir, e.g. ~/.local/share/todosnap)
        #[arg(long, env = "TODOSNAP_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Disable redaction of emails, phone numbers, and URLs
        #[arg(long)]
        no_redact: bool,

        /// Path to a previous snapshot directory to diff against
        #[arg(long)]
        diff: Option<PathBuf>,

        /// Include only tasks in this project (by name or id; repeatable)
        #[arg(long)]
        include_project: Vec<String>,

        /// Exclude tasks in this project (by name or id; repeatable)
        #[arg(long)]
        exclude_project: Vec<String>,

        /// Include only tasks with this label (repeatable)
        #[arg(long)]
        include_label: Vec<String>,

        /// Exclude tasks with this label (repeatable)
        #[arg(long)]
        exclude_label: Vec<String>,

        /// Also persist tasks due within a window, e.g. "14d"
        #[arg(long)]
        due_window: Option<String>,
    },
}
