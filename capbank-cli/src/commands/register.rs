//! Register command - the three-step account creation wizard

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select};

use capbank_core::services::masks::{mask_cpf, mask_phone};
use capbank_core::services::{AccountCreationWorkflow, CreationStep};
use capbank_core::{BankEvent, Error, LogEvent, Route};

use super::{get_context, get_logger, log_event};
use crate::output;

/// What to do after a step failed on the server side
enum Retry {
    Again,
    Back,
    Quit,
}

fn header(wizard: &AccountCreationWorkflow) {
    let current = wizard.current_step();
    let steps: Vec<String> = CreationStep::ALL
        .iter()
        .map(|step| {
            if step.index() == current.index() {
                step.title().bold().to_string()
            } else if wizard.is_step_completed(step.index()) {
                format!("{} {}", "✔".green(), step.title())
            } else {
                step.title().dimmed().to_string()
            }
        })
        .collect();
    println!();
    println!("{}", steps.join("  ›  "));
    println!();
}

fn ask(prompt: &str, initial: &str) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if !initial.is_empty() {
        input = input.with_initial_text(initial);
    }
    Ok(input.interact_text()?)
}

fn ask_retry() -> Result<Retry> {
    let choice = Select::new()
        .with_prompt("What now?")
        .items(&["Try again", "Go back", "Quit"])
        .default(0)
        .interact()?;
    Ok(match choice {
        0 => Retry::Again,
        1 => Retry::Back,
        _ => Retry::Quit,
    })
}

pub async fn run() -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    let mut wizard = ctx.account_creation();

    println!("{}", "Open your CapBank account".bold());

    loop {
        header(&wizard);
        match wizard.current_step() {
            CreationStep::PersonalData => {
                let p = &mut wizard.personal;
                p.full_name = ask("Full name", &p.full_name)?;
                p.cpf = mask_cpf(&ask("CPF", &p.cpf)?);
                p.birth_date = ask("Birth date (YYYY-MM-DD)", &p.birth_date)?;
                p.phone = mask_phone(&ask("Phone", &p.phone)?);

                if let Err(Error::Validation(report)) = wizard.submit_personal_data() {
                    output::validation(&report);
                    if !Confirm::new().with_prompt("Fix and continue?").default(true).interact()? {
                        log_event(&logger, LogEvent::new(BankEvent::RegistrationCancelled).with_route(Route::Login));
                        println!("Cancelled.");
                        return Ok(());
                    }
                }
            }
            CreationStep::Access => {
                let a = &mut wizard.access;
                a.email = ask("E-mail", &a.email)?;
                a.password = Password::new().with_prompt("Password (min. 8 characters)").interact()?;
                a.confirm_password = Password::new().with_prompt("Confirm password").interact()?;
                a.accept_terms = Confirm::new()
                    .with_prompt("I accept the terms of use")
                    .default(false)
                    .interact()?;

                let spinner = output::spinner("Creating account...", false);
                let result = wizard.submit_access().await;
                spinner.finish_and_clear();

                match result {
                    Ok(_) => {
                        log_event(&logger, LogEvent::new(BankEvent::AccountRegistered).with_route(Route::CreateAccount));
                        output::notifications(&ctx.notifications);
                    }
                    Err(Error::Validation(report)) => output::validation(&report),
                    Err(_) => {
                        output::notifications(&ctx.notifications);
                        match ask_retry()? {
                            Retry::Again => {}
                            Retry::Back => {
                                wizard.go_back();
                            }
                            Retry::Quit => bail!("Account creation cancelled"),
                        }
                    }
                }
            }
            CreationStep::Confirmation => {
                let code = ask("Verification code (leave empty to resend)", "")?;
                if code.trim().is_empty() {
                    let result = wizard.resend_code().await;
                    output::notifications(&ctx.notifications);
                    if let Err(Error::Validation(report)) = result {
                        output::validation(&report);
                    }
                    continue;
                }

                wizard.confirmation.code = code;
                let spinner = output::spinner("Verifying...", false);
                let result = wizard.submit_confirmation().await;
                spinner.finish_and_clear();

                match result {
                    Ok(route) => {
                        log_event(&logger, LogEvent::new(BankEvent::EmailVerified).with_route(route));
                        output::notifications(&ctx.notifications);
                        output::info("Run `capbank login` to sign in.");
                        return Ok(());
                    }
                    Err(Error::Validation(report)) => output::validation(&report),
                    Err(_) => output::notifications(&ctx.notifications),
                }
            }
        }
    }
}
