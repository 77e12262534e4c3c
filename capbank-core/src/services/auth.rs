//! Login and logout

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::result::Result;
use crate::domain::{LoginRequest, Route, Session};
use crate::ports::AuthGateway;
use crate::services::forms::LoginForm;
use crate::services::SessionContext;

pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    session: SessionContext,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn AuthGateway>, session: SessionContext) -> Self {
        Self { gateway, session }
    }

    /// Validate the form, exchange the credentials for a token and store
    /// the resulting session.
    ///
    /// Invalid forms fail with `Error::Validation` before any request.
    pub async fn login(&self, form: &LoginForm) -> Result<Session> {
        form.validate().into_result()?;

        let request = LoginRequest {
            cpf: form.cpf.trim().to_string(),
            password: form.password.clone(),
        };

        let response = self.gateway.login(&request).await.map_err(|e| {
            warn!(error = %e, "login failed");
            e
        })?;

        let mut session = Session::new(response.token.access_token, response.user.id)
            .expiring_in(response.token.expires_in);
        session.user_name = response.user.full_name;

        self.session.establish(session.clone())?;
        debug!(user_id = %session.user_id, "logged in");
        Ok(session)
    }

    /// Drop the session everywhere. Always lands on the login screen.
    pub fn logout(&self) -> Result<Route> {
        self.session.clear()?;
        Ok(Route::Login)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}
