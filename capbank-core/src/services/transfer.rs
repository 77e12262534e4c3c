//! Transfer workflow
//!
//! load account -> validate locally -> resolve destination -> submit.
//! Local validation failures never reach the network. After a successful
//! transfer the cached balance is decremented by exactly the amount; it is
//! not re-read from the server.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

use crate::domain::money::format_currency;
use crate::domain::result::Error;
use crate::domain::{BankAccount, Route, TransactionResult, TransferRequest, ValidationReport};
use crate::ports::{AccountGateway, TransactionGateway};
use crate::services::forms::{positive_amount, required};
use crate::services::masks::mask_account_number;
use crate::services::{NotificationQueue, SessionContext};

/// Which step of the transfer failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStep {
    LoadAccount,
    Validate,
    ResolveDestination,
    Submit,
}

#[derive(Debug, ThisError)]
#[error("{source}")]
pub struct TransferError {
    pub step: TransferStep,
    pub source: Error,
}

impl TransferError {
    fn new(step: TransferStep, source: Error) -> Self {
        Self { step, source }
    }

    pub fn user_message(&self) -> String {
        self.source.user_message()
    }

    /// Field errors when the failure was local validation
    pub fn validation(&self) -> Option<&ValidationReport> {
        match &self.source {
            Error::Validation(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferForm {
    /// Destination account number, masked or not
    pub destination: String,
    /// Amount as typed (`100,50`, `100.50`, `R$ 1.234,56`)
    pub amount: String,
    pub description: String,
}

/// A transfer that passed local validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTransfer {
    pub destination: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

pub struct TransferWorkflow {
    accounts: Arc<dyn AccountGateway>,
    transactions: Arc<dyn TransactionGateway>,
    session: SessionContext,
    notifications: NotificationQueue,
    account: Option<BankAccount>,
    pub form: TransferForm,
}

impl TransferWorkflow {
    pub fn new(
        accounts: Arc<dyn AccountGateway>,
        transactions: Arc<dyn TransactionGateway>,
        session: SessionContext,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            accounts,
            transactions,
            session,
            notifications,
            account: None,
            form: TransferForm::default(),
        }
    }

    /// The cached source account, once loaded
    pub fn account(&self) -> Option<&BankAccount> {
        self.account.as_ref()
    }

    /// Use an already known source account instead of loading it
    pub fn with_account(mut self, account: BankAccount) -> Self {
        self.account = Some(account);
        self
    }

    /// Load the logged-in user's account
    pub async fn load_account(&mut self) -> Result<&BankAccount, TransferError> {
        let Some(user_id) = self.session.user_id() else {
            return Err(TransferError::new(TransferStep::LoadAccount, Error::Unauthorized));
        };

        match self.accounts.account_for_user(&user_id).await {
            Ok(account) => Ok(self.account.insert(account)),
            Err(e) => Err(self.fail(TransferStep::LoadAccount, e)),
        }
    }

    /// Check the form against the cached account
    pub fn validate(&self) -> Result<ValidTransfer, ValidationReport> {
        let mut report = ValidationReport::new();
        let destination = self.form.destination.trim();

        report.check("destination", required(destination, "Destination account"));
        if let Some(account) = &self.account {
            if account.is_same_number(destination) {
                report.push("destination", "You cannot transfer to your own account");
            }
        }

        let amount = match positive_amount(&self.form.amount) {
            Ok(amount) => Some(amount),
            Err(message) => {
                report.push("amount", message);
                None
            }
        };

        match (&self.account, amount) {
            (Some(account), Some(amount)) if amount > account.balance => {
                report.push("amount", "Insufficient balance");
            }
            (None, _) => report.push("account", "Account not loaded"),
            _ => {}
        }

        report.into_result()?;

        let description = self.form.description.trim();
        Ok(ValidTransfer {
            destination: destination.to_string(),
            amount: amount.unwrap_or_default(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    /// Validate, resolve the destination and transfer.
    ///
    /// Returns the route to show next. Validation errors are returned
    /// without a notification; server failures notify with the server's
    /// message and leave the form as it was.
    pub async fn submit(&mut self) -> Result<Route, TransferError> {
        let valid = self
            .validate()
            .map_err(|report| TransferError::new(TransferStep::Validate, report.into()))?;

        let source_account_id = match &self.account {
            Some(account) => account.id.clone(),
            None => {
                return Err(TransferError::new(
                    TransferStep::LoadAccount,
                    Error::Other("Account not loaded".to_string()),
                ))
            }
        };

        let lookup = mask_account_number(&valid.destination);
        let target_account_id = match self.accounts.account_id_by_number(&lookup).await {
            Ok(id) => id,
            Err(e) => return Err(self.fail(TransferStep::ResolveDestination, e)),
        };

        let request = TransferRequest {
            source_account_id,
            target_account_id,
            amount: valid.amount,
            description: valid.description,
        };

        let result: TransactionResult = match self.transactions.transfer(&request).await {
            Ok(result) => result,
            Err(e) => return Err(self.fail(TransferStep::Submit, e)),
        };

        if let Some(account) = self.account.as_mut() {
            account.debit(valid.amount);
        }
        debug!(transaction_id = %result.transaction.id, "transfer completed");
        self.notifications.success(format!(
            "Transfer of {} completed",
            format_currency(valid.amount)
        ));

        Ok(Route::Dashboard)
    }

    fn fail(&self, step: TransferStep, error: Error) -> TransferError {
        warn!(step = ?step, error = %error, "transfer failed");
        self.notifications.error(error.user_message());
        TransferError::new(step, error)
    }
}
