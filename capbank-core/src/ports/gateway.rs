//! Gateway ports - the CapBank backend capabilities the client consumes
//!
//! One trait per backend service. The HTTP adapter implements all of them;
//! tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{
    BankAccount, DepositRequest, LoginRequest, LoginResponse, Page, RegisterUser, RegisteredUser,
    Transaction, TransactionHistory, TransactionResult, TransferRequest, VerifyCodeRequest,
    WithdrawalRequest,
};

/// Authentication (user service `validate` endpoint)
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange document + password for a token.
    ///
    /// Fails with `Error::Auth` on any non-2xx answer.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;
}

/// User registration and e-mail verification
#[async_trait]
pub trait UserGateway: Send + Sync {
    async fn register(&self, payload: &RegisterUser) -> Result<RegisteredUser>;

    /// Send (or re-send) the verification code to an e-mail address
    async fn send_verification_code(&self, email: &str) -> Result<()>;

    async fn verify_code(&self, request: &VerifyCodeRequest) -> Result<()>;
}

/// Bank-account lookups
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// The account owned by a user
    async fn account_for_user(&self, user_id: &str) -> Result<BankAccount>;

    async fn account_by_number(&self, account_number: &str) -> Result<BankAccount>;

    /// Resolve a human account number to the account's id
    async fn account_id_by_number(&self, account_number: &str) -> Result<String> {
        Ok(self.account_by_number(account_number).await?.id)
    }
}

/// Transaction and transaction-history services
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    async fn deposit(&self, request: &DepositRequest) -> Result<TransactionResult>;

    async fn withdraw(&self, request: &WithdrawalRequest) -> Result<TransactionResult>;

    async fn transfer(&self, request: &TransferRequest) -> Result<TransactionResult>;

    /// Ledger transactions touching an account
    async fn transactions(&self, account_id: &str, page: u32, size: u32)
        -> Result<Page<Transaction>>;

    /// Statement lines of an account, newest first
    async fn history(
        &self,
        account_id: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<TransactionHistory>>;
}

/// Everything the workflows need from the backend
pub trait BankGateway: AuthGateway + UserGateway + AccountGateway + TransactionGateway {}

impl<T> BankGateway for T where T: AuthGateway + UserGateway + AccountGateway + TransactionGateway {}
