//! CLI command implementations

pub mod cash;
pub mod dashboard;
pub mod extract;
pub mod login;
pub mod logs;
pub mod mask;
pub mod register;
pub mod status;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use capbank_core::services::{GuardDecision, LogSource};
use capbank_core::{BankContext, BankEvent, Error, LogEvent, LoggingService, Route};
use tracing::debug;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let capbank_dir = get_capbank_dir().ok()?;
    std::fs::create_dir_all(&capbank_dir).ok()?;
    LoggingService::new(&capbank_dir, LogSource::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.record(event);
    }
}

/// Get the client directory from environment or default
pub fn get_capbank_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CAPBANK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".capbank"))
        .ok_or_else(|| anyhow!("Could not find home directory; set CAPBANK_DIR"))
}

/// Get or create the client context
pub fn get_context() -> Result<BankContext> {
    let capbank_dir = get_capbank_dir()?;

    std::fs::create_dir_all(&capbank_dir)
        .with_context(|| format!("Failed to create capbank directory: {:?}", capbank_dir))?;

    debug!(dir = %capbank_dir.display(), "opening capbank context");
    BankContext::new(&capbank_dir).context("Failed to initialize capbank context")
}

/// Run the route guard before a screen's command
pub fn enter(ctx: &BankContext, route: Route) -> Result<()> {
    enter_logged(ctx, route, &get_logger())
}

fn enter_logged(ctx: &BankContext, route: Route, logger: &Option<LoggingService>) -> Result<()> {
    match ctx.guard.check(route) {
        GuardDecision::Allowed(route) => {
            log_event(logger, LogEvent::new(BankEvent::RouteOpened).with_route(route));
            Ok(())
        }
        GuardDecision::Denied { redirect } => {
            log_event(
                logger,
                LogEvent::new(BankEvent::NavigationDenied).with_route(route),
            );
            Err(anyhow!(
                "Not logged in. Run `capbank login` first ({} -> {}).",
                route,
                redirect
            ))
        }
    }
}

/// Message for a failed command, preferring the bank's own wording
pub fn describe_error(error: &anyhow::Error) -> String {
    if let Some(e) = error.downcast_ref::<Error>() {
        return describe_core_error(e);
    }
    if let Some(e) = error.downcast_ref::<capbank_core::services::TransferError>() {
        return describe_core_error(&e.source);
    }
    error.to_string()
}

fn describe_core_error(error: &Error) -> String {
    match error {
        Error::Validation(report) => report
            .errors()
            .iter()
            .map(|e| e.message.clone())
            .collect::<Vec<_>>()
            .join("\n"),
        Error::Unauthorized => "Session expired. Run `capbank login` again.".to_string(),
        other => other.user_message(),
    }
}
