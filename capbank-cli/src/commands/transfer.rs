//! Transfer command

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use serde_json::json;

use capbank_core::domain::money::format_currency;
use capbank_core::services::masks::mask_account_number;
use capbank_core::{BankEvent, LogEvent, Route};

use super::{enter, get_context, get_logger, log_event};
use crate::output;

fn value_or_prompt(value: Option<String>, prompt: &str, json: bool) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if json => bail!("--{} is required with --json", prompt.to_lowercase()),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

pub async fn run(
    to: Option<String>,
    amount: Option<String>,
    description: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    enter(&ctx, Route::Transfers)?;
    let logger = get_logger();

    let mut workflow = ctx.transfer();
    let spinner = output::spinner("Loading your account...", json);
    let loaded = workflow.load_account().await.map(|a| a.balance);
    spinner.finish_and_clear();
    let balance = loaded?;

    if !json {
        println!("Available balance: {}", format_currency(balance).bold());
    }

    workflow.form.destination = mask_account_number(&value_or_prompt(to, "To", json)?);
    workflow.form.amount = value_or_prompt(amount, "Amount", json)?;
    workflow.form.description = description.unwrap_or_default();

    // Surface local problems before asking for confirmation
    if let Err(report) = workflow.validate() {
        return Err(capbank_core::Error::Validation(report).into());
    }

    if !json {
        let prompt = format!(
            "Transfer {} to account {}?",
            workflow.form.amount.trim(),
            workflow.form.destination
        );
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let spinner = output::spinner("Sending transfer...", json);
    let result = workflow.submit().await;
    spinner.finish_and_clear();

    match result {
        Ok(route) => {
            log_event(&logger, LogEvent::new(BankEvent::TransferCompleted).with_route(route));
            let balance = workflow.account().map(|a| a.balance);
            if json {
                return output::json(json!({
                    "destination": workflow.form.destination,
                    "balance": balance,
                    "redirect": route,
                }));
            }
            output::notifications(&ctx.notifications);
            if let Some(balance) = balance {
                println!("New balance: {}", format_currency(balance).bold());
            }
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new(BankEvent::TransferFailed)
                    .with_route(Route::Transfers)
                    .with_error(format!("{:?}", e.step)),
            );
            ctx.notifications.clear();
            Err(e.into())
        }
    }
}
