//! Status command - show session and connection settings

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde_json::json;

use capbank_core::Route;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let session = ctx.session.current();
    let reachable: Vec<Route> = Route::ALL
        .iter()
        .copied()
        .filter(|r| ctx.guard.check(*r).is_allowed())
        .collect();

    if json {
        return output::json(json!({
            "authenticated": session.is_some(),
            "user_id": session.as_ref().map(|s| s.user_id.clone()),
            "user_name": session.as_ref().and_then(|s| s.user_name.clone()),
            "expires_at": session.as_ref().and_then(|s| s.expires_at),
            "api_url": ctx.config.api_url,
            "data_dir": ctx.data_dir(),
            "routes": reachable,
        }));
    }

    println!("{}", "CapBank Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    match &session {
        Some(s) => {
            table.add_row(vec!["Session", &"active".green().to_string()]);
            table.add_row(vec!["User", s.user_name.as_deref().unwrap_or(&s.user_id)]);
            if let Some(expires) = s.expires_at {
                table.add_row(vec![
                    "Expires".to_string(),
                    expires.format("%Y-%m-%d %H:%M UTC").to_string(),
                ]);
            }
        }
        None => {
            table.add_row(vec!["Session", &"none".yellow().to_string()]);
        }
    }
    table.add_row(vec!["API", ctx.config.api_url.as_str()]);
    table.add_row(vec![
        "Timeout".to_string(),
        format!("{}s", ctx.config.request_timeout_secs),
    ]);
    table.add_row(vec!["Data".to_string(), ctx.data_dir().display().to_string()]);

    println!("{}", table);
    println!();

    println!("{}", "Screens".bold());
    for route in Route::ALL {
        let mark = if reachable.contains(&route) {
            "•".green()
        } else {
            "•".dimmed()
        };
        println!("  {} {}", mark, route);
    }

    Ok(())
}
