//! Dashboard: balance and the latest statement lines

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::domain::money::format_currency;
use crate::domain::result::{Error, Result};
use crate::domain::{BankAccount, Route, TransactionHistory};
use crate::ports::{AccountGateway, TransactionGateway};
use crate::services::{NotificationQueue, SessionContext};

pub const DEFAULT_RECENT_TRANSACTIONS: u32 = 5;

pub const HIDDEN_BALANCE: &str = "R$ ••••••";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    Transfer,
    Extract,
    Profile,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [QuickAction::Transfer, QuickAction::Extract, QuickAction::Profile];

    pub fn route(&self) -> Route {
        match self {
            Self::Transfer => Route::Transfers,
            Self::Extract => Route::Extract,
            Self::Profile => Route::Profile,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Extract => "Statement",
            Self::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub user_name: Option<String>,
    pub account: BankAccount,
    pub recent: Vec<TransactionHistory>,
}

pub struct DashboardService {
    accounts: Arc<dyn AccountGateway>,
    transactions: Arc<dyn TransactionGateway>,
    session: SessionContext,
    notifications: NotificationQueue,
    recent_count: u32,
    balance_visible: bool,
}

impl DashboardService {
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
            recent_count: DEFAULT_RECENT_TRANSACTIONS,
            balance_visible: false,
        }
    }

    pub fn with_recent_count(mut self, count: u32) -> Self {
        self.recent_count = count.max(1);
        self
    }

    /// Account first, then its latest history, one after the other
    pub async fn load(&self) -> Result<DashboardView> {
        let outcome = async {
            let user_id = self.session.user_id().ok_or(Error::Unauthorized)?;
            let account = self.accounts.account_for_user(&user_id).await?;
            let page = self
                .transactions
                .history(&account.id, 0, self.recent_count)
                .await?;
            Ok::<_, Error>(DashboardView {
                user_name: self.session.user_name(),
                account,
                recent: page.content,
            })
        }
        .await;

        outcome.map_err(|e: Error| {
            warn!(error = %e, "loading dashboard failed");
            self.notifications.error(e.user_message());
            e
        })
    }

    pub fn is_balance_visible(&self) -> bool {
        self.balance_visible
    }

    /// Flip balance visibility, returning the new state
    pub fn toggle_balance(&mut self) -> bool {
        self.balance_visible = !self.balance_visible;
        self.balance_visible
    }

    pub fn balance_display(&self, account: &BankAccount) -> String {
        if self.balance_visible {
            format_currency(account.balance)
        } else {
            HIDDEN_BALANCE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DepositRequest, Page, Session, Transaction, TransactionResult, TransferRequest,
        WithdrawalRequest,
    };
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBank {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AccountGateway for FakeBank {
        async fn account_for_user(&self, user_id: &str) -> Result<BankAccount> {
            self.calls.lock().unwrap().push(format!("account:{}", user_id));
            Ok(BankAccount::new("acc-1", "12345-678", Decimal::new(1254789, 2)))
        }

        async fn account_by_number(&self, _: &str) -> Result<BankAccount> {
            unreachable!()
        }
    }

    #[async_trait]
    impl TransactionGateway for FakeBank {
        async fn deposit(&self, _: &DepositRequest) -> Result<TransactionResult> {
            unreachable!()
        }

        async fn withdraw(&self, _: &WithdrawalRequest) -> Result<TransactionResult> {
            unreachable!()
        }

        async fn transfer(&self, _: &TransferRequest) -> Result<TransactionResult> {
            unreachable!()
        }

        async fn transactions(&self, _: &str, _: u32, _: u32) -> Result<Page<Transaction>> {
            unreachable!()
        }

        async fn history(&self, account_id: &str, page: u32, size: u32) -> Result<Page<TransactionHistory>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("history:{}:{}:{}", account_id, page, size));
            Ok(Page {
                content: Vec::new(),
                page_number: page,
                page_size: size,
                total_elements: 0,
                total_pages: 0,
                first: true,
                last: true,
            })
        }
    }

    #[tokio::test]
    async fn test_load_calls_account_then_history() {
        let bank = Arc::new(FakeBank::default());
        let session = SessionContext::in_memory();
        session
            .establish(Session::new("tok", "user-1").with_user_name("Maria"))
            .unwrap();
        let dashboard = DashboardService::new(bank.clone(), bank.clone(), session, NotificationQueue::default());

        let view = dashboard.load().await.unwrap();
        assert_eq!(view.user_name.as_deref(), Some("Maria"));
        assert_eq!(
            *bank.calls.lock().unwrap(),
            vec!["account:user-1".to_string(), "history:acc-1:0:5".to_string()]
        );
    }

    #[tokio::test]
    async fn test_load_without_session() {
        let bank = Arc::new(FakeBank::default());
        let notifications = NotificationQueue::default();
        let dashboard = DashboardService::new(bank.clone(), bank.clone(), SessionContext::in_memory(), notifications.clone());

        assert!(matches!(dashboard.load().await, Err(Error::Unauthorized)));
        assert!(bank.calls.lock().unwrap().is_empty());
        assert_eq!(notifications.len(), 1);
    }

    #[test]
    fn test_balance_hidden_by_default() {
        let bank = Arc::new(FakeBank::default());
        let mut dashboard = DashboardService::new(bank.clone(), bank, SessionContext::in_memory(), NotificationQueue::default());
        let account = BankAccount::new("a", "1", Decimal::new(1254789, 2));

        assert_eq!(dashboard.balance_display(&account), HIDDEN_BALANCE);
        assert!(dashboard.toggle_balance());
        assert_eq!(dashboard.balance_display(&account), "R$ 12.547,89");
    }

    #[test]
    fn test_quick_actions() {
        let routes: Vec<Route> = QuickAction::ALL.iter().map(QuickAction::route).collect();
        assert_eq!(routes, vec![Route::Transfers, Route::Extract, Route::Profile]);
    }
}
