//! Form models and their validators
//!
//! Each form validates into a `ValidationReport` with at most one message
//! per field. Nothing here touches the network.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::parse_amount;
use crate::domain::ValidationReport;

const CPF_PATTERN: &str = r"^\d{3}\.\d{3}\.\d{3}-\d{2}$";
const PHONE_PATTERN: &str = r"^\(\d{2}\) \d{4,5}-\d{4}$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const CODE_PATTERN: &str = r"^\d{6}$";

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_LOGIN_PASSWORD_LENGTH: usize = 4;

// Field validators. Each returns the message to show when the check fails.

pub fn required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", label))
    } else {
        Ok(())
    }
}

pub fn min_length(value: &str, min: usize, label: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters", label, min))
    } else {
        Ok(())
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

pub fn cpf(value: &str) -> Result<(), String> {
    required(value, "CPF")?;
    if matches(CPF_PATTERN, value) {
        Ok(())
    } else {
        Err("CPF must use the format 000.000.000-00".to_string())
    }
}

pub fn phone(value: &str) -> Result<(), String> {
    required(value, "Phone")?;
    if matches(PHONE_PATTERN, value) {
        Ok(())
    } else {
        Err("Phone must use the format (00) 00000-0000".to_string())
    }
}

pub fn email(value: &str) -> Result<(), String> {
    required(value, "Email")?;
    if matches(EMAIL_PATTERN, value.trim()) {
        Ok(())
    } else {
        Err("Email is invalid".to_string())
    }
}

pub fn birth_date(value: &str) -> Result<(), String> {
    required(value, "Birth date")?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| "Birth date must be a valid date (YYYY-MM-DD)".to_string())
}

pub fn verification_code(value: &str) -> Result<(), String> {
    required(value, "Code")?;
    if matches(CODE_PATTERN, value.trim()) {
        Ok(())
    } else {
        Err("Code must have 6 digits".to_string())
    }
}

/// Parse a money amount that must be strictly positive
pub fn positive_amount(value: &str) -> Result<Decimal, String> {
    required(value, "Amount")?;
    let amount = parse_amount(value)?;
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than zero".to_string());
    }
    Ok(amount)
}

/// First step of account creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDataForm {
    pub full_name: String,
    /// Masked, `000.000.000-00`
    pub cpf: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    /// Masked, `(00) 00000-0000`
    pub phone: String,
}

impl PersonalDataForm {
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check("full_name", required(&self.full_name, "Full name"));
        report.check(
            "full_name",
            min_length(self.full_name.trim(), MIN_NAME_LENGTH, "Full name"),
        );
        report.check("cpf", cpf(&self.cpf));
        report.check("birth_date", birth_date(&self.birth_date));
        report.check("phone", phone(&self.phone));
        report
    }
}

/// Second step of account creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

impl AccessForm {
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check("email", email(&self.email));
        report.check("password", required(&self.password, "Password"));
        report.check(
            "password",
            min_length(&self.password, MIN_PASSWORD_LENGTH, "Password"),
        );
        report.check(
            "confirm_password",
            required(&self.confirm_password, "Password confirmation"),
        );
        if !self.accept_terms {
            report.push("accept_terms", "You must accept the terms of use");
        }
        if !self.password.is_empty()
            && !self.confirm_password.is_empty()
            && self.password != self.confirm_password
        {
            report.check("confirm_password", Err("Passwords do not match".to_string()));
        }
        report
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

/// Last step of account creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationForm {
    pub code: String,
}

impl ConfirmationForm {
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check("code", verification_code(&self.code));
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub cpf: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(cpf: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            cpf: cpf.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check("cpf", cpf(&self.cpf));
        report.check("password", required(&self.password, "Password"));
        report.check(
            "password",
            min_length(&self.password, MIN_LOGIN_PASSWORD_LENGTH, "Password"),
        );
        report
    }
}
