//! Dashboard command - balance and latest transactions

use anyhow::Result;
use colored::Colorize;

use capbank_core::services::dashboard::QuickAction;
use capbank_core::services::extract::{category, display_amount};
use capbank_core::{BankEvent, LogEvent, Route, TransactionType};

use super::{enter, get_context, get_logger, log_event};
use crate::output;

pub async fn run(show_balance: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    enter(&ctx, Route::Dashboard)?;

    let mut dashboard = ctx.dashboard();
    let spinner = output::spinner("Loading your account...", json);
    let result = dashboard.load().await;
    spinner.finish_and_clear();
    let view = result?;

    log_event(&get_logger(), LogEvent::new(BankEvent::DashboardLoaded).with_route(Route::Dashboard));

    if json {
        return output::json(&view);
    }

    if show_balance {
        dashboard.toggle_balance();
    }

    let greeting = view.user_name.as_deref().unwrap_or("there");
    println!("{}", format!("Hello, {}", greeting).bold());
    println!();
    println!(
        "  Account {}  {}",
        view.account.account_number,
        dashboard.balance_display(&view.account).bold()
    );
    println!();

    println!("{}", "Recent transactions".bold());
    if view.recent.is_empty() {
        println!("  No transactions yet.");
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["Date", "Description", "Category", "Amount"]);
        for record in &view.recent {
            let amount = display_amount(record);
            let amount = if record.transaction_type == TransactionType::Deposit {
                amount.green()
            } else {
                amount.red()
            };
            table.add_row(vec![
                record.record_date.format("%d/%m/%Y %H:%M").to_string(),
                record.description_or_empty().to_string(),
                category(record).to_string(),
                amount.to_string(),
            ]);
        }
        println!("{}", table);
    }

    println!();
    let actions: Vec<String> = QuickAction::ALL
        .iter()
        .map(|a| format!("{} ({})", a.label(), a.route()))
        .collect();
    println!("{}", actions.join("   ").dimmed());

    output::notifications(&ctx.notifications);
    Ok(())
}
