//! Deposits and withdrawals on the logged-in user's account

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::money::format_currency;
use crate::domain::result::{Error, Result};
use crate::domain::{
    BankAccount, DepositRequest, TransactionResult, ValidationReport, WithdrawalRequest,
};
use crate::ports::{AccountGateway, TransactionGateway};
use crate::services::forms::positive_amount;
use crate::services::{NotificationQueue, SessionContext};

pub struct CashService {
    accounts: Arc<dyn AccountGateway>,
    transactions: Arc<dyn TransactionGateway>,
    session: SessionContext,
    notifications: NotificationQueue,
}

fn description_of(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn amount_of(input: &str) -> Result<Decimal> {
    let mut report = ValidationReport::new();
    match positive_amount(input) {
        Ok(amount) => Ok(amount),
        Err(message) => {
            report.push("amount", message);
            Err(report.into())
        }
    }
}

impl CashService {
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
        }
    }

    async fn own_account(&self) -> Result<BankAccount> {
        let user_id = self.session.user_id().ok_or(Error::Unauthorized)?;
        self.accounts.account_for_user(&user_id).await
    }

    pub async fn deposit(&self, amount: &str, description: Option<&str>) -> Result<TransactionResult> {
        let amount = amount_of(amount)?;
        let outcome = async {
            let account = self.own_account().await?;
            let request = DepositRequest {
                target_account_id: account.id,
                amount,
                description: description_of(description),
            };
            self.transactions.deposit(&request).await
        }
        .await;

        self.finish(outcome, format!("Deposit of {} completed", format_currency(amount)))
    }

    /// Withdraw, refusing locally when the amount exceeds the balance
    pub async fn withdraw(&self, amount: &str, description: Option<&str>) -> Result<TransactionResult> {
        let amount = amount_of(amount)?;
        let account = match self.own_account().await {
            Ok(account) => account,
            Err(e) => return self.finish(Err(e), String::new()),
        };

        if amount > account.balance {
            let mut report = ValidationReport::new();
            report.push("amount", "Insufficient balance");
            return Err(report.into());
        }

        let request = WithdrawalRequest {
            source_account_id: account.id,
            amount,
            description: description_of(description),
        };
        let outcome = self.transactions.withdraw(&request).await;
        self.finish(outcome, format!("Withdrawal of {} completed", format_currency(amount)))
    }

    fn finish(&self, outcome: Result<TransactionResult>, success: String) -> Result<TransactionResult> {
        match outcome {
            Ok(result) => {
                self.notifications.success(success);
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "cash operation failed");
                self.notifications.error(e.user_message());
                Err(e)
            }
        }
    }
}
