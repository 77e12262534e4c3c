//! Extract (statement) workflow
//!
//! The account's history is fetched once per load. Filtering, grouping by
//! day and pagination then happen locally, so a filter always sees every
//! loaded record regardless of the page being shown.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::money::format_signed;
use crate::domain::result::{Error, Result};
use crate::domain::{BankAccount, TransactionHistory, TransactionType};
use crate::ports::{AccountGateway, TransactionGateway};
use crate::services::{NotificationQueue, SessionContext};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page the history service serves
pub const DEFAULT_FETCH_SIZE: u32 = 100;

const SECONDS_PER_DAY_MINUS_ONE: i64 = 86_399;

/// Quick date ranges offered next to the date pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    All,
    Today,
    Last7Days,
    Last30Days,
}

impl Period {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "today" => Some(Self::Today),
            "7days" => Some(Self::Last7Days),
            "30days" => Some(Self::Last30Days),
            _ => None,
        }
    }

    /// First day of the period ending `today`
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::All => NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
            Self::Today => today,
            Self::Last7Days => today - Duration::days(7),
            Self::Last30Days => today - Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractFilter {
    pub initial_date: NaiveDate,
    pub final_date: NaiveDate,
    /// Case-insensitive, matched against the description
    pub search: String,
    /// `None` means every type
    pub kind: Option<TransactionType>,
}

impl ExtractFilter {
    /// January 1st of the current year up to today, every type
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            initial_date: today.with_ordinal(1).unwrap_or(today),
            final_date: today,
            search: String::new(),
            kind: None,
        }
    }

    pub fn with_period(mut self, period: Period, today: NaiveDate) -> Self {
        self.initial_date = period.start(today);
        self.final_date = today;
        self
    }

    /// `[initial 00:00:00, final 23:59:59]`
    pub fn range(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.initial_date.and_time(NaiveTime::MIN);
        let end = self.final_date.and_time(NaiveTime::MIN)
            + Duration::seconds(SECONDS_PER_DAY_MINUS_ONE);
        (start, end)
    }

    pub fn matches(&self, record: &TransactionHistory) -> bool {
        let (start, end) = self.range();
        if record.record_date < start || record.record_date > end {
            return false;
        }

        if let Some(kind) = self.kind {
            if record.transaction_type != kind {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || record
                .description_or_empty()
                .to_lowercase()
                .contains(&needle)
    }
}

/// Records matching `filter`, in the order given
pub fn filter_records<'a>(
    records: &'a [TransactionHistory],
    filter: &ExtractFilter,
) -> Vec<&'a TransactionHistory> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Category shown under a statement line
pub fn category(record: &TransactionHistory) -> &'static str {
    match record.transaction_type {
        TransactionType::Deposit => "Deposit",
        TransactionType::Withdrawal => {
            let description = record.description_or_empty().to_lowercase();
            if description.contains("cartão") || description.contains("card") {
                "Purchase"
            } else {
                "Withdrawal"
            }
        }
        TransactionType::Transfer => "Transfer",
    }
}

/// Material icon name and color for a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeIcon {
    pub name: &'static str,
    pub color: &'static str,
}

pub fn icon(kind: TransactionType) -> TypeIcon {
    match kind {
        TransactionType::Deposit => TypeIcon {
            name: "arrow_downward",
            color: "#4caf50",
        },
        TransactionType::Withdrawal => TypeIcon {
            name: "arrow_upward",
            color: "#f44336",
        },
        TransactionType::Transfer => TypeIcon {
            name: "swap_horiz",
            color: "#2196f3",
        },
    }
}

/// `+R$ 1.234,56` for deposits, `-R$ ...` otherwise
pub fn display_amount(record: &TransactionHistory) -> String {
    format_signed(record.transaction_amount, record.transaction_type)
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 transaction".to_string()
    } else {
        format!("{} transactions", count)
    }
}

/// "Today, 25 Oct", "Yesterday, 24 Oct" or "23 Oct"
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    let short = date.format("%d %b").to_string();
    if date == today {
        format!("Today, {}", short)
    } else if Some(date) == today.pred_opt() {
        format!("Yesterday, {}", short)
    } else {
        short
    }
}

/// Statement lines of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub label: String,
    pub items: Vec<TransactionHistory>,
    /// Sum of deposits
    pub total_positive: Decimal,
    /// Sum of everything else
    pub total_negative: Decimal,
}

/// Group by calendar day, newest day first. Order within a day is kept.
pub fn group_by_day(items: &[&TransactionHistory], today: NaiveDate) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for record in items {
        let date = record.record_date.date();
        let index = match groups.iter().position(|g| g.date == date) {
            Some(index) => index,
            None => {
                groups.push(DayGroup {
                    date,
                    label: day_label(date, today),
                    items: Vec::new(),
                    total_positive: Decimal::ZERO,
                    total_negative: Decimal::ZERO,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        if record.transaction_type.is_credit() {
            group.total_positive += record.transaction_amount;
        } else {
            group.total_negative += record.transaction_amount;
        }
        group.items.push((*record).clone());
    }

    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

pub struct ExtractWorkflow {
    accounts: Arc<dyn AccountGateway>,
    transactions: Arc<dyn TransactionGateway>,
    session: SessionContext,
    notifications: NotificationQueue,
    fetch_size: u32,
    page_size: usize,
    account: Option<BankAccount>,
    records: Vec<TransactionHistory>,
    filter: ExtractFilter,
    current_page: usize,
}

impl ExtractWorkflow {
    pub fn new(
        accounts: Arc<dyn AccountGateway>,
        transactions: Arc<dyn TransactionGateway>,
        session: SessionContext,
        notifications: NotificationQueue,
        today: NaiveDate,
    ) -> Self {
        Self {
            accounts,
            transactions,
            session,
            notifications,
            fetch_size: DEFAULT_FETCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            account: None,
            records: Vec::new(),
            filter: ExtractFilter::default_for(today),
            current_page: 1,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size.clamp(1, DEFAULT_FETCH_SIZE);
        self
    }

    /// Use an already loaded set of records (no network)
    pub fn with_records(mut self, mut records: Vec<TransactionHistory>) -> Self {
        records.sort_by(|a, b| b.record_date.cmp(&a.record_date));
        self.records = records;
        self
    }

    /// Fetch the account and its whole history, page by page
    pub async fn load(&mut self) -> Result<usize> {
        match self.fetch_all().await {
            Ok(count) => Ok(count),
            Err(e) => {
                warn!(error = %e, "loading statement failed");
                self.notifications.error(e.user_message());
                Err(e)
            }
        }
    }

    async fn fetch_all(&mut self) -> Result<usize> {
        let user_id = self.session.user_id().ok_or(Error::Unauthorized)?;
        let account = self.accounts.account_for_user(&user_id).await?;

        let mut records = Vec::new();
        let mut page = 0;
        loop {
            let batch = self
                .transactions
                .history(&account.id, page, self.fetch_size)
                .await?;
            // An empty page or the server's page count also ends the walk
            let done = batch.last
                || batch.content.is_empty()
                || (batch.total_pages > 0 && page + 1 >= batch.total_pages);
            records.extend(batch.content);
            page += 1;
            if done {
                break;
            }
        }

        debug!(records = records.len(), pages = page, "statement loaded");
        records.sort_by(|a, b| b.record_date.cmp(&a.record_date));
        self.records = records;
        self.account = Some(account);
        self.current_page = 1;
        Ok(self.records.len())
    }

    pub fn account(&self) -> Option<&BankAccount> {
        self.account.as_ref()
    }

    pub fn records(&self) -> &[TransactionHistory] {
        &self.records
    }

    pub fn filter(&self) -> &ExtractFilter {
        &self.filter
    }

    /// Replace the filter and go back to the first page
    pub fn set_filter(&mut self, filter: ExtractFilter) {
        self.filter = filter;
        self.current_page = 1;
    }

    pub fn apply_period(&mut self, period: Period, today: NaiveDate) {
        let filter = self.filter.clone().with_period(period, today);
        self.set_filter(filter);
    }

    pub fn filtered(&self) -> Vec<&TransactionHistory> {
        filter_records(&self.records, &self.filter)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size)
    }

    /// 1-based
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Jump to a page; out-of-range pages are ignored
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.current_page > 1 && self.go_to_page(self.current_page - 1)
    }

    /// Filtered records on the current page
    pub fn page_items(&self) -> Vec<&TransactionHistory> {
        let start = (self.current_page - 1) * self.page_size;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    pub fn page_groups(&self, today: NaiveDate) -> Vec<DayGroup> {
        group_by_day(&self.page_items(), today)
    }
}
