//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one screen or concern of the client.

pub mod account_creation;
mod auth;
mod cash;
pub mod dashboard;
pub mod extract;
pub mod forms;
mod guard;
pub mod logging;
pub mod masks;
mod notifications;
mod session;
pub mod transfer;

pub use account_creation::{AccountCreationWorkflow, CreationStep};
pub use auth::AuthService;
pub use cash::CashService;
pub use dashboard::{DashboardService, DashboardView, QuickAction};
pub use extract::{DayGroup, ExtractFilter, ExtractWorkflow, Period};
pub use guard::{GuardDecision, RouteGuard};
pub use logging::{
    BankEvent, Breakdown, LogEntry, LogEvent, LogQuery, LogSource, LogStats, LoggingService, Outcome,
};
pub use notifications::NotificationQueue;
pub use session::SessionContext;
pub use transfer::{TransferError, TransferForm, TransferStep, TransferWorkflow};
