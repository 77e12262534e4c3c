//! Event log
//!
//! Workflow outcomes are appended to logs.duckdb so a user can see what the
//! client did and why a command failed. A row holds the event kind, its
//! outcome, the route and command involved and an error message. Tokens,
//! passwords, documents, account numbers and amounts are never recorded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use duckdb::{params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::domain::Route;
use crate::log_migrations::LOG_MIGRATIONS;

pub const LOG_DB_FILE_NAME: &str = "logs.duckdb";

/// Front end that recorded an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Cli,
    Library,
}

impl LogSource {
    fn as_str(&self) -> &'static str {
        match self {
            LogSource::Cli => "cli",
            LogSource::Library => "library",
        }
    }
}

/// How a recorded event ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    /// Stopped by the guard or by the user
    Aborted,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Aborted => "aborted",
            Outcome::Failed => "failed",
        }
    }
}

/// Everything the client records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankEvent {
    LoggedIn,
    LoggedOut,
    RouteOpened,
    NavigationDenied,
    DashboardLoaded,
    StatementViewed,
    TransferCompleted,
    TransferFailed,
    DepositCompleted,
    WithdrawalCompleted,
    AccountRegistered,
    EmailVerified,
    RegistrationCancelled,
    CommandFailed,
}

impl BankEvent {
    pub const ALL: [BankEvent; 14] = [
        BankEvent::LoggedIn,
        BankEvent::LoggedOut,
        BankEvent::RouteOpened,
        BankEvent::NavigationDenied,
        BankEvent::DashboardLoaded,
        BankEvent::StatementViewed,
        BankEvent::TransferCompleted,
        BankEvent::TransferFailed,
        BankEvent::DepositCompleted,
        BankEvent::WithdrawalCompleted,
        BankEvent::AccountRegistered,
        BankEvent::EmailVerified,
        BankEvent::RegistrationCancelled,
        BankEvent::CommandFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BankEvent::LoggedIn => "logged_in",
            BankEvent::LoggedOut => "logged_out",
            BankEvent::RouteOpened => "route_opened",
            BankEvent::NavigationDenied => "navigation_denied",
            BankEvent::DashboardLoaded => "dashboard_loaded",
            BankEvent::StatementViewed => "statement_viewed",
            BankEvent::TransferCompleted => "transfer_completed",
            BankEvent::TransferFailed => "transfer_failed",
            BankEvent::DepositCompleted => "deposit_completed",
            BankEvent::WithdrawalCompleted => "withdrawal_completed",
            BankEvent::AccountRegistered => "account_registered",
            BankEvent::EmailVerified => "email_verified",
            BankEvent::RegistrationCancelled => "registration_cancelled",
            BankEvent::CommandFailed => "command_failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.iter().copied().find(|e| e.as_str() == value)
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            BankEvent::TransferFailed | BankEvent::CommandFailed => Outcome::Failed,
            BankEvent::NavigationDenied | BankEvent::RegistrationCancelled => Outcome::Aborted,
            _ => Outcome::Success,
        }
    }
}

/// An event about to be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub kind: BankEvent,
    pub route: Option<Route>,
    pub command: Option<String>,
    pub error: Option<String>,
}

impl LogEvent {
    pub fn new(kind: BankEvent) -> Self {
        Self {
            kind,
            route: None,
            command: None,
            error: None,
        }
    }

    /// Screen the event happened on
    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// A user-facing message only, never a request body
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

impl From<BankEvent> for LogEvent {
    fn from(kind: BankEvent) -> Self {
        Self::new(kind)
    }
}

/// A stored row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    /// Unix milliseconds
    pub timestamp: i64,
    pub source: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub outcome: String,
    pub route: Option<String>,
    pub command: Option<String>,
    pub error_message: Option<String>,
}

impl LogEntry {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            source: row.get(2)?,
            app_version: row.get(3)?,
            platform: row.get(4)?,
            event: row.get(5)?,
            outcome: row.get(6)?,
            route: row.get(7)?,
            command: row.get(8)?,
            error_message: row.get(9)?,
        })
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failed.as_str()
    }
}

/// Which rows `LoggingService::entries` returns, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub route: Option<Route>,
    pub event: Option<BankEvent>,
    pub failures_only: bool,
    pub limit: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            route: None,
            event: None,
            failures_only: false,
            limit: 50,
        }
    }
}

/// Event counts for one route or command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub name: String,
    pub entries: u64,
    pub failures: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total_entries: u64,
    pub failures: u64,
    pub by_route: Vec<Breakdown>,
    pub by_command: Vec<Breakdown>,
    pub database_path: PathBuf,
    pub database_size_bytes: u64,
}

const ENTRY_COLUMNS: &str = "id, timestamp, source, app_version, platform, event, outcome, \
     route, command, error_message";

/// Apply the embedded migrations not yet listed in `sys_migrations`
fn migrate(conn: &Connection) -> Result<()> {
    let ((_, bootstrap), pending) = LOG_MIGRATIONS
        .split_first()
        .ok_or_else(|| anyhow!("no log migrations embedded"))?;
    conn.execute_batch(bootstrap)?;

    let applied: HashSet<String> = conn
        .prepare("SELECT migration_name FROM sys_migrations")?
        .query_map([], |row| row.get(0))?
        .collect::<duckdb::Result<_>>()?;

    for (name, sql) in pending.iter().filter(|(n, _)| !applied.contains(*n)) {
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
    }
    Ok(())
}

pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    source: LogSource,
    app_version: String,
}

impl LoggingService {
    /// Open or create logs.duckdb in `data_dir`
    pub fn new(data_dir: &Path, source: LogSource, app_version: impl Into<String>) -> Result<Self> {
        let db_path = data_dir.join(LOG_DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            source,
            app_version: app_version.into(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("log connection poisoned: {}", e))
    }

    pub fn record(&self, event: impl Into<LogEvent>) -> Result<()> {
        let event = event.into();
        self.conn()?.execute(
            "INSERT INTO sys_logs (timestamp, source, app_version, platform, event, outcome, \
             route, command, error_message) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                Utc::now().timestamp_millis(),
                self.source.as_str(),
                &self.app_version,
                std::env::consts::OS,
                event.kind.as_str(),
                event.kind.outcome().as_str(),
                event.route.map(|r| r.path()),
                &event.command,
                &event.error,
            ],
        )?;
        Ok(())
    }

    pub fn entries(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let mut clauses = Vec::new();
        let mut values: Vec<&str> = Vec::new();
        if let Some(route) = query.route {
            clauses.push("route = ?");
            values.push(route.path());
        }
        if let Some(event) = query.event {
            clauses.push("event = ?");
            values.push(event.as_str());
        }
        if query.failures_only {
            clauses.push("outcome = ?");
            values.push(Outcome::Failed.as_str());
        }

        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM sys_logs {} ORDER BY id DESC LIMIT {}",
            ENTRY_COLUMNS, filter, query.limit
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(values), LogEntry::from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Counts grouped by `column`, busiest first
    fn breakdown(conn: &Connection, column: &'static str) -> Result<Vec<Breakdown>> {
        let sql = format!(
            "SELECT {col}, COUNT(*), COUNT(*) FILTER (WHERE outcome = 'failed') \
             FROM sys_logs WHERE {col} IS NOT NULL GROUP BY {col} ORDER BY 2 DESC, 1",
            col = column
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Breakdown {
                    name: row.get(0)?,
                    entries: row.get::<_, i64>(1)?.max(0) as u64,
                    failures: row.get::<_, i64>(2)?.max(0) as u64,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.conn()?;
        let (total, failures): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE outcome = 'failed') FROM sys_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(LogStats {
            total_entries: total.max(0) as u64,
            failures: failures.max(0) as u64,
            by_route: Self::breakdown(&conn, "route")?,
            by_command: Self::breakdown(&conn, "command")?,
            database_path: self.db_path.clone(),
            database_size_bytes: std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0),
        })
    }

    /// Delete entries recorded more than `days` days ago
    pub fn prune(&self, days: u32) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let deleted = self.conn()?.execute(
            "DELETE FROM sys_logs WHERE timestamp < ?",
            [cutoff.timestamp_millis()],
        )?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
