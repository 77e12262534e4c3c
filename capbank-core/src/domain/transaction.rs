//! Transaction and transaction-history domain models

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    #[serde(alias = "deposit")]
    Deposit,
    #[serde(alias = "withdrawal")]
    Withdrawal,
    #[serde(alias = "transfer")]
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
        }
    }

    /// Parse the lowercase filter value used by the statement screen
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Deposits add to the balance, everything else subtracts
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::Deposit)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "completed")]
    Completed,
    #[serde(alias = "failed")]
    Failed,
    #[serde(alias = "cancelled")]
    Cancelled,
}

/// One line of an account's statement (transaction-history service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub id: String,
    pub account_id: String,
    pub transaction_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub transaction_amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub record_date: NaiveDateTime,
}

impl TransactionHistory {
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// A ledger transaction (transaction service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub source_account_id: Option<String>,
    #[serde(default)]
    pub target_account_id: Option<String>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub transaction_date: NaiveDateTime,
}

/// Answer of deposit, withdrawal and transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub transaction: Transaction,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub notification_sent: bool,
}

/// A page of results as the transaction services return them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default = "default_last")]
    pub last: bool,
}

fn default_last() -> bool {
    true
}

// Request bodies. Amounts go out as JSON numbers, which is what the
// transaction service's BigDecimal fields expect.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRequest {
    pub source_account_id: String,
    pub target_account_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositRequest {
    pub target_account_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalRequest {
    pub source_account_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
