//! Output formatting utilities

use std::time::Duration;

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use capbank_core::services::NotificationQueue;
use capbank_core::{OperationResult, Severity, ValidationReport};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Print a successful `--json` payload
pub fn json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
    Ok(())
}

/// Spinner shown while waiting on the bank; hidden for JSON and pipes
pub fn spinner(message: &str, json: bool) -> ProgressBar {
    if json || !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn paint(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Success => text.green(),
        Severity::Error => text.red(),
        Severity::Warning => text.yellow(),
        Severity::Info => text.cyan(),
    }
}

/// Print and drain the pending notifications
pub fn notifications(queue: &NotificationQueue) {
    for n in queue.snapshot() {
        let line = format!("{} {}", n.severity.icon(), n.message);
        if n.severity == Severity::Error {
            eprintln!("{}", paint(&line, n.severity));
        } else {
            println!("{}", paint(&line, n.severity));
        }
    }
    queue.clear();
}

/// Field errors, one per line
pub fn validation(report: &ValidationReport) {
    for e in report.errors() {
        eprintln!("  {} {}", "•".red(), e.message);
    }
}
