//! Core domain entities
//!
//! Transport models mirrored from the CapBank services plus the client's own
//! value types. Pure data with validation helpers - no I/O.

mod account;
pub mod money;
mod notification;
pub mod result;
mod route;
mod session;
mod transaction;
mod user;
pub mod validation;

pub use account::BankAccount;
pub use notification::{Notification, Severity, DEFAULT_NOTIFICATION_DURATION};
pub use route::Route;
pub use session::Session;
pub use transaction::{
    DepositRequest, Page, Transaction, TransactionHistory, TransactionResult, TransactionStatus,
    TransactionType, TransferRequest, WithdrawalRequest,
};
pub use user::{
    AccessToken, LoginRequest, LoginResponse, LoginUser, RegisterUser, RegisteredUser,
    VerifyCodeRequest,
};
pub use validation::{FieldError, ValidationReport};
