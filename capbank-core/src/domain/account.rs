//! Bank account domain model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bank account as returned by the bank-account service
///
/// Fetched on every screen load. The only local mutation is the optimistic
/// balance decrement after a transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: String,
    pub account_number: String,
    #[serde(default)]
    pub agency: String,
    pub balance: Decimal,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl BankAccount {
    pub fn new(id: impl Into<String>, account_number: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id: id.into(),
            account_number: account_number.into(),
            agency: String::new(),
            balance,
            account_type: None,
            status: None,
            user_id: None,
            created_at: None,
        }
    }

    /// Whether `number` designates this account, ignoring mask punctuation
    pub fn is_same_number(&self, number: &str) -> bool {
        let own: String = self.account_number.chars().filter(char::is_ascii_digit).collect();
        let other: String = number.chars().filter(char::is_ascii_digit).collect();
        !own.is_empty() && own == other
    }

    /// Subtract a confirmed transfer from the cached balance
    pub fn debit(&mut self, amount: Decimal) {
        self.balance -= amount;
    }
}
