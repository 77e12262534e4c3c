//! Integration tests for capbank-core workflows
//!
//! The bank is faked at the gateway trait level. Everything above the
//! gateways (session, guard, workflows, notifications) is the real thing,
//! wired through `BankContext::with_gateway`.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tempfile::TempDir;

use capbank_core::config::Config;
use capbank_core::domain::result::Result;
use capbank_core::domain::{
    AccessToken, DepositRequest, LoginRequest, LoginResponse, LoginUser, Page, RegisterUser,
    RegisteredUser, TransactionStatus, TransferRequest, VerifyCodeRequest, WithdrawalRequest,
};
use capbank_core::ports::{AccountGateway, AuthGateway, TransactionGateway, UserGateway};
use capbank_core::services::forms::LoginForm;
use capbank_core::services::{
    ExtractFilter, GuardDecision, NotificationQueue, SessionContext, TransferStep,
};
use capbank_core::{
    BankAccount, BankContext, Error, Route, Session, Severity, Transaction, TransactionHistory,
    TransactionResult, TransactionType,
};

// ============================================================================
// Test Helpers
// ============================================================================

const TOKEN: &str = "token-abc";

/// In-memory bank. Account calls demand the session token, the way the
/// real services answer 401 without a bearer.
struct FakeBank {
    session: SessionContext,
    balance: Decimal,
    history: Vec<TransactionHistory>,
    transfers: Mutex<Vec<TransferRequest>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBank {
    fn new(session: SessionContext, balance: Decimal) -> Self {
        Self {
            session,
            balance,
            history: Vec::new(),
            transfers: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_history(mut self, history: Vec<TransactionHistory>) -> Self {
        self.history = history;
        self
    }

    fn authorize(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.session.token() {
            Some(token) if token == TOKEN => Ok(()),
            _ => {
                self.session.clear()?;
                Err(Error::Unauthorized)
            }
        }
    }

    fn transfer_count(&self) -> usize {
        self.transfers.lock().unwrap().len()
    }
}

#[async_trait]
impl AuthGateway for FakeBank {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        if request.password != "secret" {
            return Err(Error::Auth("Invalid credentials".to_string()));
        }
        Ok(LoginResponse {
            user: LoginUser {
                id: "user-1".to_string(),
                full_name: Some("Maria Silva".to_string()),
            },
            token: AccessToken {
                access_token: TOKEN.to_string(),
                expires_in: 3600,
            },
        })
    }
}

#[async_trait]
impl UserGateway for FakeBank {
    async fn register(&self, _: &RegisterUser) -> Result<RegisteredUser> {
        Ok(RegisteredUser::default())
    }

    async fn send_verification_code(&self, _: &str) -> Result<()> {
        Ok(())
    }

    async fn verify_code(&self, _: &VerifyCodeRequest) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl AccountGateway for FakeBank {
    async fn account_for_user(&self, user_id: &str) -> Result<BankAccount> {
        self.authorize(format!("account:{}", user_id))?;
        Ok(BankAccount::new("acc-1", "12345-678", self.balance))
    }

    async fn account_by_number(&self, number: &str) -> Result<BankAccount> {
        self.authorize(format!("lookup:{}", number))?;
        match number {
            "98765-432" => Ok(BankAccount::new("acc-2", number, Decimal::ZERO)),
            _ => Err(Error::api(404, "Account not found")),
        }
    }
}

#[async_trait]
impl TransactionGateway for FakeBank {
    async fn deposit(&self, _: &DepositRequest) -> Result<TransactionResult> {
        unreachable!("no deposits in these tests")
    }

    async fn withdraw(&self, _: &WithdrawalRequest) -> Result<TransactionResult> {
        unreachable!("no withdrawals in these tests")
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransactionResult> {
        self.authorize("transfer".to_string())?;
        self.transfers.lock().unwrap().push(request.clone());
        Ok(TransactionResult {
            transaction: Transaction {
                id: "tx-1".to_string(),
                source_account_id: Some(request.source_account_id.clone()),
                target_account_id: Some(request.target_account_id.clone()),
                transaction_type: TransactionType::Transfer,
                amount: request.amount,
                description: request.description.clone(),
                status: TransactionStatus::Completed,
                transaction_date: at("2025-10-25 10:00:00"),
            },
            message: None,
            notification_sent: false,
        })
    }

    async fn transactions(&self, _: &str, _: u32, _: u32) -> Result<Page<Transaction>> {
        unreachable!("statement reads use the history endpoint")
    }

    async fn history(&self, account_id: &str, page: u32, size: u32) -> Result<Page<TransactionHistory>> {
        self.authorize(format!("history:{}:{}:{}", account_id, page, size))?;
        let start = (page * size) as usize;
        let content: Vec<TransactionHistory> = self
            .history
            .iter()
            .skip(start)
            .take(size as usize)
            .cloned()
            .collect();
        let total = self.history.len() as u64;
        let total_pages = (self.history.len() as u32).div_ceil(size.max(1));
        Ok(Page {
            last: page + 1 >= total_pages,
            first: page == 0,
            content,
            page_number: page,
            page_size: size,
            total_elements: total,
            total_pages,
        })
    }
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn record(id: u32, when: &str, kind: TransactionType, cents: i64) -> TransactionHistory {
    TransactionHistory {
        id: format!("h-{}", id),
        account_id: "acc-1".to_string(),
        transaction_id: format!("t-{}", id),
        description: Some(format!("Record {}", id)),
        transaction_amount: money(cents),
        balance_before: Decimal::ZERO,
        balance_after: Decimal::ZERO,
        transaction_type: kind,
        status: TransactionStatus::Completed,
        record_date: at(when),
    }
}

/// Context over a fake bank, plus the bank itself for assertions
fn context(balance: Decimal, history: Vec<TransactionHistory>) -> (TempDir, BankContext, Arc<FakeBank>) {
    let dir = TempDir::new().unwrap();
    let session = SessionContext::in_memory();
    let bank = Arc::new(FakeBank::new(session.clone(), balance).with_history(history));
    let ctx = BankContext::with_gateway(dir.path(), Config::default(), session, bank.clone());
    (dir, ctx, bank)
}

fn logged_in(ctx: &BankContext) {
    ctx.session
        .establish(Session::new(TOKEN, "user-1").with_user_name("Maria Silva"))
        .unwrap();
}

// ============================================================================
// Transfer
// ============================================================================

#[tokio::test]
async fn test_invalid_amounts_never_reach_the_bank() {
    let (_dir, ctx, bank) = context(money(150_000), Vec::new());
    logged_in(&ctx);

    for amount in ["", "   ", "0", "0,00", "-5", "abc"] {
        let mut transfer = ctx.transfer();
        transfer.load_account().await.unwrap();
        transfer.form.destination = "98765-432".to_string();
        transfer.form.amount = amount.to_string();

        let err = transfer.submit().await.unwrap_err();
        assert_eq!(err.step, TransferStep::Validate, "amount {:?}", amount);
        assert!(err.validation().unwrap().has_error("amount"));
    }

    assert_eq!(bank.transfer_count(), 0);
    // Validation failures do not notify
    assert!(ctx.notifications.is_empty());
}

#[tokio::test]
async fn test_balance_decrements_by_exactly_the_amount() {
    let (_dir, ctx, bank) = context(money(150_000), Vec::new());
    logged_in(&ctx);

    let mut transfer = ctx.transfer();
    transfer.load_account().await.unwrap();
    transfer.form.destination = "98765432".to_string();
    transfer.form.amount = "100,50".to_string();
    transfer.form.description = "Rent".to_string();

    let route = transfer.submit().await.unwrap();

    assert_eq!(route, Route::Dashboard);
    assert_eq!(transfer.account().unwrap().balance, money(139_950));

    let sent = bank.transfers.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].source_account_id, "acc-1");
    assert_eq!(sent[0].target_account_id, "acc-2");
    assert_eq!(sent[0].amount, money(10_050));
    assert_eq!(sent[0].description.as_deref(), Some("Rent"));

    let notes = ctx.notifications.snapshot();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Success);
    assert!(notes[0].message.contains("R$ 100,50"));
}

#[tokio::test]
async fn test_amount_over_balance_is_blocked_locally() {
    let (_dir, ctx, bank) = context(money(5_000), Vec::new());
    logged_in(&ctx);

    let mut transfer = ctx.transfer();
    transfer.load_account().await.unwrap();
    transfer.form.destination = "12345-6".to_string();
    transfer.form.amount = "100.00".to_string();

    let err = transfer.submit().await.unwrap_err();

    assert_eq!(err.step, TransferStep::Validate);
    assert_eq!(err.validation().unwrap().messages_for("amount"), vec!["Insufficient balance"]);
    assert_eq!(bank.transfer_count(), 0);
    assert!(!bank.calls.lock().unwrap().iter().any(|c| c.starts_with("lookup")));
    assert_eq!(transfer.account().unwrap().balance, money(5_000));
}

#[tokio::test]
async fn test_unknown_destination_notifies_and_keeps_balance() {
    let (_dir, ctx, bank) = context(money(150_000), Vec::new());
    logged_in(&ctx);

    let mut transfer = ctx.transfer();
    transfer.load_account().await.unwrap();
    transfer.form.destination = "11111-111".to_string();
    transfer.form.amount = "10".to_string();

    let err = transfer.submit().await.unwrap_err();

    assert_eq!(err.step, TransferStep::ResolveDestination);
    assert_eq!(err.user_message(), "Account not found");
    assert_eq!(bank.transfer_count(), 0);
    assert_eq!(transfer.account().unwrap().balance, money(150_000));
    assert_eq!(ctx.notifications.snapshot()[0].severity, Severity::Error);
}

// ============================================================================
// Session, guard and login
// ============================================================================

#[test]
fn test_guard_redirects_without_session() {
    let (_dir, ctx, _bank) = context(Decimal::ZERO, Vec::new());

    for route in [Route::Dashboard, Route::Transfers, Route::Extract] {
        assert_eq!(
            ctx.guard.check(route),
            GuardDecision::Denied { redirect: Route::Login }
        );
    }
    assert!(ctx.guard.check(Route::Login).is_allowed());
    assert!(ctx.guard.check(Route::CreateAccount).is_allowed());

    logged_in(&ctx);
    assert_eq!(ctx.guard.navigate("/extract"), GuardDecision::Allowed(Route::Extract));
    assert_eq!(ctx.guard.navigate(""), GuardDecision::Allowed(Route::Dashboard));
}

#[tokio::test]
async fn test_login_then_dashboard_without_401() {
    let (_dir, ctx, bank) = context(money(1_254_789), Vec::new());

    let session = ctx
        .auth_service
        .login(&LoginForm::new("123.456.789-00", "secret"))
        .await
        .unwrap();
    assert_eq!(session.token, TOKEN);
    assert!(ctx.guard.check(Route::Dashboard).is_allowed());

    let view = ctx.dashboard().load().await.unwrap();

    assert_eq!(view.user_name.as_deref(), Some("Maria Silva"));
    assert_eq!(view.account.balance, money(1_254_789));
    assert_eq!(
        *bank.calls.lock().unwrap(),
        vec!["account:user-1".to_string(), "history:acc-1:0:5".to_string()]
    );
    assert!(ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_failed_login_keeps_guard_closed() {
    let (_dir, ctx, _bank) = context(Decimal::ZERO, Vec::new());

    let err = ctx
        .auth_service
        .login(&LoginForm::new("123.456.789-00", "wrong-password"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(ref m) if m == "Invalid credentials"));
    assert!(!ctx.guard.check(Route::Dashboard).is_allowed());
}

#[tokio::test]
async fn test_rejected_token_logs_out() {
    let (_dir, ctx, _bank) = context(Decimal::ZERO, Vec::new());
    ctx.session.establish(Session::new("stale", "user-1")).unwrap();

    let err = ctx.dashboard().load().await.unwrap_err();

    assert!(matches!(err, Error::Unauthorized));
    assert!(!ctx.session.is_authenticated());
    assert_eq!(
        ctx.guard.check(Route::Dashboard),
        GuardDecision::Denied { redirect: Route::Login }
    );
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_notifications_expire_and_dismiss() {
    let queue = NotificationQueue::new(Duration::from_millis(3000));

    let first = queue.success("Saved");
    let second = queue.error("Failed");
    assert_eq!(queue.len(), 2);

    assert!(queue.dismiss(&second));
    assert!(!queue.dismiss(&second));
    assert_eq!(queue.snapshot()[0].id, first);

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert_eq!(queue.len(), 1);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(queue.is_empty());
}

// ============================================================================
// Extract
// ============================================================================

fn october_history() -> Vec<TransactionHistory> {
    let mut history = Vec::new();
    for day in 1..=25u32 {
        let kind = match day % 3 {
            0 => TransactionType::Deposit,
            1 => TransactionType::Withdrawal,
            _ => TransactionType::Transfer,
        };
        history.push(record(day, &format!("2025-10-{:02} 09:30:00", day), kind, 1_000));
    }
    history.push(record(99, "2025-09-30 23:59:59", TransactionType::Deposit, 5_000));
    history
}

#[tokio::test]
async fn test_extract_follows_pages_and_filters_every_record() {
    let today = NaiveDate::from_ymd_opt(2025, 10, 25).unwrap();
    let (_dir, ctx, bank) = context(money(100_000), october_history());
    logged_in(&ctx);

    let mut extract = ctx.extract(today).with_fetch_size(10).with_page_size(4);
    assert_eq!(extract.load().await.unwrap(), 26);

    let history_calls = bank
        .calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with("history"))
        .count();
    assert_eq!(history_calls, 3);

    // Newest first
    assert_eq!(extract.records()[0].id, "h-25");

    // Walk to the last page, then narrow the range: the filter sees every
    // loaded record, not only the page on screen, and paging restarts.
    assert!(extract.go_to_page(extract.total_pages()));
    let mut filter = ExtractFilter::default_for(today);
    filter.initial_date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
    filter.final_date = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap();
    extract.set_filter(filter);

    assert_eq!(extract.current_page(), 1);
    assert_eq!(extract.filtered().len(), 10);
    assert_eq!(extract.total_pages(), 3);
    assert_eq!(extract.page_items().len(), 4);
    assert!(extract.go_to_page(3));
    assert_eq!(extract.page_items().len(), 2);
    assert!(!extract.go_to_page(4));
}

#[tokio::test]
async fn test_extract_range_includes_whole_final_day() {
    let today = NaiveDate::from_ymd_opt(2025, 10, 25).unwrap();
    let (_dir, ctx, _bank) = context(money(100_000), october_history());
    logged_in(&ctx);

    let mut extract = ctx.extract(today);
    extract.load().await.unwrap();

    let mut filter = extract.filter().clone();
    filter.initial_date = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
    filter.final_date = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
    filter.kind = Some(TransactionType::Deposit);
    extract.set_filter(filter);

    let items = extract.filtered();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "h-99");
}
