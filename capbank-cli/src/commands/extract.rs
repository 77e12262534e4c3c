//! Extract command - the account statement, filtered and paged

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use colored::Colorize;
use serde_json::json;

use capbank_core::domain::money::format_currency;
use capbank_core::services::extract::{category, count_label, display_amount, icon};
use capbank_core::services::Period;
use capbank_core::{BankEvent, LogEvent, Route, TransactionType};

use super::{enter, get_context, get_logger, log_event};
use crate::output;

#[derive(Args)]
pub struct ExtractArgs {
    /// Quick range: all, today, 7days, 30days
    #[arg(long)]
    period: Option<String>,
    /// First day, YYYY-MM-DD (defaults to January 1st)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Text to look for in descriptions
    #[arg(long, short)]
    search: Option<String>,
    /// Only one type: deposit, withdrawal, transfer
    #[arg(long = "type")]
    kind: Option<String>,
    /// Page to show, starting at 1
    #[arg(long, default_value = "1")]
    page: usize,
    /// Lines per page
    #[arg(long)]
    page_size: Option<usize>,
}

pub async fn run(args: ExtractArgs, json: bool) -> Result<()> {
    let ctx = get_context()?;
    enter(&ctx, Route::Extract)?;
    let today = Local::now().date_naive();

    let mut extract = ctx.extract(today);
    if let Some(size) = args.page_size {
        extract = extract.with_page_size(size);
    }

    let spinner = output::spinner("Loading statement...", json);
    let loaded = extract.load().await;
    spinner.finish_and_clear();
    loaded?;

    let mut filter = extract.filter().clone();
    if let Some(period) = &args.period {
        let period = Period::parse(period)
            .ok_or_else(|| anyhow!("Unknown period '{}': use all, today, 7days or 30days", period))?;
        filter = filter.with_period(period, today);
    }
    if let Some(from) = args.from {
        filter.initial_date = from;
    }
    if let Some(to) = args.to {
        filter.final_date = to;
    }
    if let Some(search) = args.search {
        filter.search = search;
    }
    if let Some(kind) = &args.kind {
        filter.kind = Some(
            TransactionType::parse(kind)
                .ok_or_else(|| anyhow!("Unknown type '{}': use deposit, withdrawal or transfer", kind))?,
        );
    }
    extract.set_filter(filter);

    if args.page > 1 && !extract.go_to_page(args.page) {
        output::warning(&format!(
            "Page {} does not exist, showing page 1 of {}",
            args.page,
            extract.total_pages().max(1)
        ));
    }

    log_event(&get_logger(), LogEvent::new(BankEvent::StatementViewed).with_route(Route::Extract));

    let total = extract.filtered().len();
    let groups = extract.page_groups(today);

    if json {
        return output::json(json!({
            "filter": extract.filter(),
            "total": total,
            "page": extract.current_page(),
            "total_pages": extract.total_pages(),
            "groups": groups,
        }));
    }

    let (start, end) = extract.filter().range();
    println!(
        "{}  {} to {}  ({})",
        "Statement".bold(),
        start.format("%d/%m/%Y"),
        end.format("%d/%m/%Y"),
        count_label(total)
    );
    if let Some(account) = extract.account() {
        println!("Balance: {}", format_currency(account.balance).bold());
    }
    println!();

    if groups.is_empty() {
        println!("No transactions found for this period.");
        output::notifications(&ctx.notifications);
        return Ok(());
    }

    for group in &groups {
        let totals = format!(
            "+{}  -{}",
            format_currency(group.total_positive),
            format_currency(group.total_negative)
        );
        println!("{}  {}", group.label.bold(), totals.dimmed());

        let mut table = output::create_table();
        for record in &group.items {
            let amount = display_amount(record);
            let amount = if record.transaction_type.is_credit() {
                amount.green()
            } else {
                amount.red()
            };
            table.add_row(vec![
                record.record_date.format("%H:%M").to_string(),
                icon(record.transaction_type).name.to_string(),
                record.description_or_empty().to_string(),
                category(record).to_string(),
                amount.to_string(),
            ]);
        }
        println!("{}", table);
        println!();
    }

    println!(
        "Page {} of {}",
        extract.current_page(),
        extract.total_pages().max(1)
    );
    output::notifications(&ctx.notifications);
    Ok(())
}
