//! Account creation wizard
//!
//! Three steps: personal data, access credentials, e-mail confirmation.
//! Registration happens when the access step is submitted; the confirmation
//! step verifies the code sent by e-mail and ends on the login screen.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{RegisterUser, RegisteredUser, Route, VerifyCodeRequest};
use crate::ports::UserGateway;
use crate::services::forms::{self, AccessForm, ConfirmationForm, PersonalDataForm};
use crate::services::masks::only_digits;
use crate::services::NotificationQueue;

pub const DEFAULT_ACCOUNT_TYPE: &str = "CHECKING";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationStep {
    PersonalData,
    Access,
    Confirmation,
}

impl CreationStep {
    pub const ALL: [CreationStep; 3] = [
        CreationStep::PersonalData,
        CreationStep::Access,
        CreationStep::Confirmation,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::PersonalData => 0,
            Self::Access => 1,
            Self::Confirmation => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PersonalData => "Personal data",
            Self::Access => "Access",
            Self::Confirmation => "Confirmation",
        }
    }
}

pub struct AccountCreationWorkflow {
    users: Arc<dyn UserGateway>,
    notifications: NotificationQueue,
    account_type: String,
    pub personal: PersonalDataForm,
    pub access: AccessForm,
    pub confirmation: ConfirmationForm,
    current: usize,
    registered: Option<RegisteredUser>,
}

impl AccountCreationWorkflow {
    pub fn new(users: Arc<dyn UserGateway>, notifications: NotificationQueue) -> Self {
        Self {
            users,
            notifications,
            account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
            personal: PersonalDataForm::default(),
            access: AccessForm::default(),
            confirmation: ConfirmationForm::default(),
            current: 0,
            registered: None,
        }
    }

    /// Account type sent on registration
    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = account_type.into();
        self
    }

    pub fn current_step(&self) -> CreationStep {
        CreationStep::ALL[self.current.min(CreationStep::ALL.len() - 1)]
    }

    pub fn is_step_completed(&self, index: usize) -> bool {
        index < self.current
    }

    pub fn registered_user(&self) -> Option<&RegisteredUser> {
        self.registered.as_ref()
    }

    pub fn next_step(&mut self) -> CreationStep {
        if self.current + 1 < CreationStep::ALL.len() {
            self.current += 1;
        }
        self.current_step()
    }

    pub fn previous_step(&mut self) -> CreationStep {
        self.current = self.current.saturating_sub(1);
        self.current_step()
    }

    /// Step back, or leave the wizard (to login) from the first step
    pub fn go_back(&mut self) -> Option<Route> {
        if self.current > 0 {
            self.previous_step();
            None
        } else {
            Some(Route::Login)
        }
    }

    /// Validate the personal data and move on to the access step
    pub fn submit_personal_data(&mut self) -> Result<CreationStep> {
        self.personal.validate().into_result()?;
        if self.current_step() == CreationStep::PersonalData {
            self.next_step();
        }
        Ok(self.current_step())
    }

    /// The flattened registration payload built from both forms
    pub fn registration_payload(&self) -> RegisterUser {
        RegisterUser {
            full_name: self.personal.full_name.trim().to_string(),
            cpf: only_digits(&self.personal.cpf, 11),
            email: self.access.email.trim().to_string(),
            account_type: self.account_type.clone(),
            password: self.access.password.clone(),
            confirm_password: self.access.confirm_password.clone(),
        }
    }

    /// Register the user. On success the wizard moves to the confirmation
    /// step; on failure it stays where it is and the server message is shown.
    pub async fn submit_access(&mut self) -> Result<CreationStep> {
        let mut report = self.personal.validate();
        for error in self.access.validate().errors() {
            report.push(error.field.clone(), error.message.clone());
        }
        report.into_result()?;

        let payload = self.registration_payload();
        match self.users.register(&payload).await {
            Ok(registered) => {
                debug!(user_id = ?registered.user_id, "user registered");
                self.registered = Some(registered);
                self.notifications
                    .success("Account created! Check your e-mail for the verification code.");
                self.current = CreationStep::Confirmation.index();
                Ok(self.current_step())
            }
            Err(e) => Err(self.report(e, "registration failed")),
        }
    }

    /// Confirm the e-mail code and finish on the login screen
    pub async fn submit_confirmation(&mut self) -> Result<Route> {
        if self.current_step() != CreationStep::Confirmation {
            return Err(Error::Other(
                "Finish the previous steps before confirming".to_string(),
            ));
        }
        self.confirmation.validate().into_result()?;

        let request = VerifyCodeRequest {
            code: self.confirmation.code.trim().to_string(),
            user_id: self.registered.as_ref().and_then(|r| r.user_id.clone()),
        };
        match self.users.verify_code(&request).await {
            Ok(()) => {
                self.notifications
                    .success("E-mail confirmed. You can now log in.");
                Ok(Route::Login)
            }
            Err(e) => Err(self.report(e, "verification failed")),
        }
    }

    /// Ask for a new verification code
    pub async fn resend_code(&self) -> Result<()> {
        let mut report = crate::domain::ValidationReport::new();
        report.check("email", forms::email(&self.access.email));
        report.into_result()?;

        let email = self.access.email.trim();
        match self.users.send_verification_code(email).await {
            Ok(()) => {
                self.notifications
                    .info(format!("A new code was sent to {}", email));
                Ok(())
            }
            Err(e) => Err(self.report(e, "resending verification code failed")),
        }
    }

    fn report(&self, error: Error, context: &str) -> Error {
        warn!(error = %error, "{}", context);
        self.notifications.error(error.user_message());
        error
    }
}
