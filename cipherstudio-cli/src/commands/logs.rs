//! Logs command - what happened to your projects
//!
//! Reads logs.duckdb directly, without opening the project store, so it works
//! even when the store is locked or damaged.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use cipherstudio_core::{EntryPoint, LogEntry, LogQuery, LoggingService};

use super::{emit_json, get_data_dir};
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only events for this project ID
        #[arg(long)]
        project: Option<String>,
        /// Only this event (e.g. autosave_failed, project_deleted)
        #[arg(long)]
        event: Option<String>,
        /// Only failures
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count events by name
    Stats {
        /// Only events for this project ID
        #[arg(long)]
        project: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old events
    Clear {
        /// Keep the last N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy the log database somewhere, e.g. to attach to a bug report
    Export {
        /// Destination file
        path: PathBuf,
    },
}

fn open_logs() -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    let logs = open_logs()?;

    match command {
        LogsCommands::List {
            limit,
            project,
            event,
            errors,
            json,
        } => {
            let mut query = LogQuery::recent(limit);
            if let Some(project) = project {
                query = query.for_project(project);
            }
            if let Some(event) = event {
                query = query.with_event(event);
            }
            if errors {
                query = query.errors_only();
            }

            let entries = logs.find(&query);
            if json {
                return emit_json(entries);
            }
            print_entries(&entries?);
        }
        LogsCommands::Stats { project, json } => {
            let counts = logs.event_counts(project.as_deref());
            if json {
                return emit_json(counts);
            }
            let counts = counts?;

            let heading = match &project {
                Some(id) => format!("Events for {}", id),
                None => "Events".to_string(),
            };
            println!("{}", heading.bold());

            if counts.is_empty() {
                println!("{}", "Nothing recorded yet".dimmed());
            } else {
                let mut table = output::create_table();
                table.set_header(vec!["Event", "Count", "Failed"]);
                for count in &counts {
                    let failed = match count.failures {
                        0 => String::new(),
                        n => n.to_string().red().to_string(),
                    };
                    table.add_row(vec![count.event.clone(), count.total.to_string(), failed]);
                }
                println!("{}", table);
            }

            if project.is_none() {
                println!("{} events in total", logs.count()?);
                if let Some(path) = logs.db_path() {
                    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                    println!(
                        "{}",
                        format!("{} ({})", path.display(), output::format_size(size)).dimmed()
                    );
                }
            }
        }
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => {
            let cutoff = Utc::now() - Duration::days(older_than_days as i64);

            if !force && !json {
                let prompt = format!(
                    "Delete events from before {}?",
                    cutoff.format("%Y-%m-%d")
                );
                if !Confirm::new().with_prompt(prompt).default(false).interact()? {
                    println!("{}", "Cancelled".dimmed());
                    return Ok(());
                }
            }

            let deleted = logs.delete_before(cutoff.timestamp_millis());
            if json {
                return emit_json(deleted.map(|deleted| serde_json::json!({ "deleted": deleted })));
            }
            output::success(&format!("Removed {} events", deleted?));
        }
        LogsCommands::Export { path } => {
            let written = logs.export(&path)?;
            output::success(&format!("Logs copied to {}", written.display()));
        }
    }

    Ok(())
}

fn print_entries(entries: &[LogEntry]) {
    if entries.is_empty() {
        println!("{}", "No matching events".dimmed());
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Event", "Project", "Command", "Problem"]);
    for entry in entries {
        let problem = entry
            .error_message
            .as_deref()
            .map(|m| m.red().to_string())
            .unwrap_or_default();
        table.add_row(vec![
            format_timestamp(entry.timestamp),
            entry.event.clone(),
            entry.project_id.clone().unwrap_or_default(),
            entry.command.clone().unwrap_or_default(),
            problem,
        ]);
    }
    println!("{}", table);
}
