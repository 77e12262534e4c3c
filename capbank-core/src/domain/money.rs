//! Money parsing and pt-BR formatting

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::transaction::TransactionType;

/// Format as `1.234,56`
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    let plain = format!("{:.2}", rounded);
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{},{}", sign, grouped, frac_part)
}

/// Format as `R$ 1.234,56`
pub fn format_currency(amount: Decimal) -> String {
    format!("R$ {}", format_brl(amount))
}

/// `+R$ 500,00` for deposits, `-R$ 150,75` otherwise
pub fn format_signed(amount: Decimal, kind: TransactionType) -> String {
    let sign = if kind.is_credit() { '+' } else { '-' };
    format!("{}R$ {}", sign, format_brl(amount.abs()))
}

/// Parse user input such as `100.00`, `100,00`, `1.234,56` or `R$ 50`
///
/// Amounts with more than two decimal places are rejected.
pub fn parse_amount(input: &str) -> Result<Decimal, String> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err("Amount is required".to_string());
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    let value = Decimal::from_str(&normalized)
        .map_err(|_| format!("Invalid amount: {}", input.trim()))?;

    if value.normalize().scale() > 2 {
        return Err("Amount cannot have more than two decimal places".to_string());
    }

    Ok(value)
}
