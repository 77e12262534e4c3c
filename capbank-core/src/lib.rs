//! CapBank Core - client logic for the CapBank banking services
//!
//! This crate implements the client following hexagonal architecture:
//!
//! - **domain**: Transport models and value types (BankAccount, Session, Route, etc.)
//! - **ports**: Trait definitions for external dependencies (gateways, session store)
//! - **services**: Workflows behind each screen (login, transfer, extract, ...)
//! - **adapters**: Concrete implementations (HTTP gateway, session files)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod log_migrations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use adapters::http::HttpGateway;
use adapters::session_file::FileSessionStore;
use config::Config;
use ports::{AccountGateway, AuthGateway, BankGateway, TransactionGateway, UserGateway};
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    BankAccount, Notification, Route, Session, Severity, Transaction, TransactionHistory,
    TransactionResult, TransactionType, ValidationReport,
};
pub use domain::result::{Error, OperationResult};
pub use services::{BankEvent, LogEvent, LoggingService};

/// Main context for CapBank operations
///
/// Holds configuration, the shared session and notification queue, and one
/// handle per gateway port. Stateless services live here; stateful workflows
/// are built on demand.
pub struct BankContext {
    pub config: Config,
    pub session: SessionContext,
    pub notifications: NotificationQueue,
    pub auth_service: AuthService,
    pub guard: RouteGuard,
    data_dir: PathBuf,
    users: Arc<dyn UserGateway>,
    accounts: Arc<dyn AccountGateway>,
    transactions: Arc<dyn TransactionGateway>,
}

impl BankContext {
    /// Create a context talking HTTP to the configured API, with the session
    /// persisted in `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let session = SessionContext::new(Arc::new(FileSessionStore::new(data_dir)));
        let gateway = HttpGateway::new(&config.api_url, config.request_timeout(), session.clone())?;
        Ok(Self::with_gateway(data_dir, config, session, Arc::new(gateway)))
    }

    /// Create a context over any gateway implementation
    pub fn with_gateway<G: BankGateway + 'static>(
        data_dir: &Path,
        config: Config,
        session: SessionContext,
        gateway: Arc<G>,
    ) -> Self {
        let notifications = NotificationQueue::new(config.notification_duration());
        let auth: Arc<dyn AuthGateway> = gateway.clone();

        Self {
            auth_service: AuthService::new(auth, session.clone()),
            guard: RouteGuard::new(session.clone()),
            users: gateway.clone(),
            accounts: gateway.clone(),
            transactions: gateway,
            notifications,
            session,
            config,
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn account_creation(&self) -> AccountCreationWorkflow {
        AccountCreationWorkflow::new(self.users.clone(), self.notifications.clone())
            .with_account_type(self.config.account_type.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(
            self.accounts.clone(),
            self.transactions.clone(),
            self.session.clone(),
            self.notifications.clone(),
        )
        .with_recent_count(self.config.recent_transactions)
    }

    pub fn transfer(&self) -> TransferWorkflow {
        TransferWorkflow::new(
            self.accounts.clone(),
            self.transactions.clone(),
            self.session.clone(),
            self.notifications.clone(),
        )
    }

    pub fn cash(&self) -> CashService {
        CashService::new(
            self.accounts.clone(),
            self.transactions.clone(),
            self.session.clone(),
            self.notifications.clone(),
        )
    }

    pub fn extract(&self, today: NaiveDate) -> ExtractWorkflow {
        ExtractWorkflow::new(
            self.accounts.clone(),
            self.transactions.clone(),
            self.session.clone(),
            self.notifications.clone(),
            today,
        )
        .with_page_size(self.config.extract_page_size)
        .with_fetch_size(self.config.history_fetch_size)
    }
}
