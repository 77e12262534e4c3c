//! Login and logout commands

use anyhow::Result;
use capbank_core::services::forms::LoginForm;
use capbank_core::services::masks::mask_cpf;
use capbank_core::{BankEvent, LogEvent, Route};
use dialoguer::{Input, Password};
use serde_json::json;

use super::{get_context, get_logger, log_event};
use crate::output;

pub async fn run(cpf: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let cpf = match cpf {
        Some(cpf) => cpf,
        None => Input::<String>::new().with_prompt("CPF").interact_text()?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let form = LoginForm::new(cpf.as_str(), password.as_str());
    let spinner = output::spinner("Signing in...", json);
    let result = ctx.auth_service.login(&form).await;
    spinner.finish_and_clear();
    let session = result?;

    log_event(&logger, LogEvent::new(BankEvent::LoggedIn).with_route(Route::Dashboard));

    if json {
        return output::json(json!({
            "user_id": session.user_id,
            "user_name": session.user_name,
            "expires_at": session.expires_at,
            "redirect": Route::Dashboard,
        }));
    }

    let who = session
        .user_name
        .clone()
        .unwrap_or_else(|| mask_cpf(&cpf));
    output::success(&format!("Welcome, {}!", who));
    output::info("Run `capbank dashboard` to see your account.");
    Ok(())
}

pub fn logout(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let route = ctx.auth_service.logout()?;
    log_event(&get_logger(), LogEvent::new(BankEvent::LoggedOut).with_route(route));

    if json {
        return output::json(json!({ "redirect": route }));
    }
    output::success("Logged out.");
    Ok(())
}
