//! Logs command - browse and prune the local event log

use anyhow::{anyhow, Result};
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use serde_json::json;

use super::get_capbank_dir;
use crate::output;
use capbank_core::services::{Breakdown, LogEntry, LogQuery, LogSource};
use capbank_core::{BankEvent, LoggingService, Route};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recorded events, newest first
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only events on this screen, e.g. /transfers
        #[arg(long)]
        route: Option<String>,
        /// Only this event, e.g. transfer_failed
        #[arg(long)]
        event: Option<String>,
        /// Only failed operations
        #[arg(long)]
        failed: bool,
    },
    /// Delete old events
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Event counts per screen and per command
    Stats,
}

fn open() -> Result<LoggingService> {
    let dir = get_capbank_dir()?;
    std::fs::create_dir_all(&dir)?;
    LoggingService::new(&dir, LogSource::Cli, env!("CARGO_PKG_VERSION"))
}

fn build_query(
    limit: usize,
    route: Option<&str>,
    event: Option<&str>,
    failed: bool,
) -> Result<LogQuery> {
    let route = route
        .map(|r| Route::from_path(r).ok_or_else(|| anyhow!("Unknown route: {}", r)))
        .transpose()?;
    let event = event
        .map(|e| BankEvent::parse(e).ok_or_else(|| anyhow!("Unknown event: {}", e)))
        .transpose()?;
    Ok(LogQuery {
        route,
        event,
        failures_only: failed,
        limit,
    })
}

fn local_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%d/%m %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn print_entries(entries: &[LogEntry]) {
    let mut table = output::create_table();
    table.set_header(vec!["When", "Event", "Screen", "Command", "Error"]);
    for entry in entries {
        let event = match entry.outcome.as_str() {
            "failed" => entry.event.red().to_string(),
            "aborted" => entry.event.yellow().to_string(),
            _ => entry.event.clone(),
        };
        table.add_row(vec![
            local_time(entry.timestamp),
            event,
            entry.route.clone().unwrap_or_default(),
            entry.command.clone().unwrap_or_default(),
            entry.error_message.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
}

fn print_breakdown(title: &str, rows: &[Breakdown]) {
    if rows.is_empty() {
        return;
    }
    println!();
    println!("{}", title.bold());
    let mut table = output::create_table();
    table.set_header(vec!["", "Events", "Failed"]);
    for row in rows {
        let failed = if row.failures > 0 {
            row.failures.to_string().red().to_string()
        } else {
            "0".to_string()
        };
        table.add_row(vec![row.name.clone(), row.entries.to_string(), failed]);
    }
    println!("{}", table);
}

pub fn run(command: LogsCommands, json: bool) -> Result<()> {
    let service = open()?;

    match command {
        LogsCommands::List {
            limit,
            route,
            event,
            failed,
        } => {
            let query = build_query(limit, route.as_deref(), event.as_deref(), failed)?;
            let entries = service.entries(&query)?;
            if json {
                return output::json(&entries);
            }
            if entries.is_empty() {
                println!("No events recorded.");
            } else {
                print_entries(&entries);
            }
        }
        LogsCommands::Clear {
            older_than_days,
            force,
        } => {
            let confirmed = force
                || json
                || Confirm::new()
                    .with_prompt(format!("Delete events older than {} days?", older_than_days))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }

            let deleted = service.prune(older_than_days)?;
            if json {
                return output::json(json!({ "deleted": deleted }));
            }
            output::success(&format!("Deleted {} events", deleted));
        }
        LogsCommands::Stats => {
            let stats = service.stats()?;
            if json {
                return output::json(&stats);
            }
            println!("{}", "Event log".bold());
            println!("  Events: {} ({} failed)", stats.total_entries, stats.failures);
            println!(
                "  File: {} ({})",
                stats.database_path.display(),
                output::format_size(stats.database_size_bytes)
            );
            print_breakdown("By screen", &stats.by_route);
            print_breakdown("By command", &stats.by_command);
        }
    }

    Ok(())
}
