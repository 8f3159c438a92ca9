//! Todosnap CLI - snapshot, summarize, and diff Todoist task data.

use clap::Parser;
use std::process;
use todosnap::cli::{Cli, Commands};
use todosnap::commands::{self, Output, SnapshotOptions};

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run_command(cli.command, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(command: Commands, human: bool) -> Result<(), todosnap::Error> {
    match command {
        Commands::Snapshot {
            token,
            data_dir,
            no_redact,
            diff,
            include_project,
            exclude_project,
            include_label,
            exclude_label,
            due_window,
        } => {
            let options = SnapshotOptions {
                data_dir,
                no_redact,
                diff,
                include_project,
                exclude_project,
                include_label,
                exclude_label,
                due_window,
            };
            let result = commands::snapshot(&token, options)?;
            output(&result, human);
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
