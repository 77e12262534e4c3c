//! Deposit and withdraw commands

use anyhow::Result;

use capbank_core::services::NotificationQueue;
use capbank_core::{BankEvent, LogEvent, Route, TransactionResult};

use super::{enter, get_context, get_logger, log_event};
use crate::output;

fn report(result: TransactionResult, event: BankEvent, json: bool, queue: &NotificationQueue) -> Result<()> {
    log_event(&get_logger(), LogEvent::new(event).with_route(Route::Dashboard));
    if json {
        return output::json(&result);
    }
    output::notifications(queue);
    if let Some(message) = result.message.as_deref().filter(|m| !m.is_empty()) {
        output::info(message);
    }
    Ok(())
}

pub async fn deposit(amount: &str, description: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    enter(&ctx, Route::Dashboard)?;

    let spinner = output::spinner("Depositing...", json);
    let result = ctx.cash().deposit(amount, description).await;
    spinner.finish_and_clear();

    report(result?, BankEvent::DepositCompleted, json, &ctx.notifications)
}

pub async fn withdraw(amount: &str, description: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    enter(&ctx, Route::Dashboard)?;

    let spinner = output::spinner("Withdrawing...", json);
    let result = ctx.cash().withdraw(amount, description).await;
    spinner.finish_and_clear();

    report(result?, BankEvent::WithdrawalCompleted, json, &ctx.notifications)
}
