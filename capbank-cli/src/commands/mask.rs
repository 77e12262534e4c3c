//! Mask command - apply the form input masks

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use capbank_core::services::masks::{mask_account_number, mask_cpf, mask_phone};

use crate::output;

#[derive(Subcommand)]
pub enum MaskCommands {
    /// 12345678900 -> 123.456.789-00
    Cpf { value: String },
    /// 11987654321 -> (11) 98765-4321
    Phone { value: String },
    /// 12345678 -> 12345-678
    Account { value: String },
}

pub fn run(command: MaskCommands, json: bool) -> Result<()> {
    let (input, masked) = match command {
        MaskCommands::Cpf { value } => {
            let masked = mask_cpf(&value);
            (value, masked)
        }
        MaskCommands::Phone { value } => {
            let masked = mask_phone(&value);
            (value, masked)
        }
        MaskCommands::Account { value } => {
            let masked = mask_account_number(&value);
            (value, masked)
        }
    };

    if json {
        return output::json(json!({ "input": input, "masked": masked }));
    }
    println!("{}", masked);
    Ok(())
}
