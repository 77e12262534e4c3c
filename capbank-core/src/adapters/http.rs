//! CapBank REST client
//!
//! Implements every gateway port over HTTP with reqwest. Authenticated calls
//! carry `Authorization: Bearer <token>` from the shared session; a 401 on
//! any of them clears the session (forced logout).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{
    BankAccount, DepositRequest, LoginRequest, LoginResponse, Page, RegisterUser, RegisteredUser,
    Transaction, TransactionHistory, TransactionResult, TransferRequest, VerifyCodeRequest,
    WithdrawalRequest,
};
use crate::ports::{AccountGateway, AuthGateway, TransactionGateway, UserGateway};
use crate::services::SessionContext;

/// Default API gateway address
pub const DEFAULT_API_URL: &str = "http://localhost:8081";

/// Environment variable overriding the API address
pub const API_URL_ENV: &str = "CAPBANK_API_URL";

/// Whether a request goes out with the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Public,
    Bearer,
}

pub struct HttpGateway {
    client: Client,
    base_url: Url,
    timeout: Duration,
    session: SessionContext,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration, session: SessionContext) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", trimmed, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Invalid API URL '{}': not a base URL",
                trimmed
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, auth: Auth) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match (auth, self.session.token()) {
            (Auth::Bearer, Some(token)) => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, auth: Auth) -> Result<Response> {
        let request = builder
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build request: {}", e)))?;
        debug!(method = %request.method(), url = %request.url(), "capbank request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(response, auth).await
    }

    /// Turn a non-2xx answer into an error, applying the 401 policy
    async fn check_response_status(&self, response: Response, auth: Auth) -> Result<Response> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "capbank response");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            warn!("session rejected by the server, logging out");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "failed to clear session after 401");
            }
            return Err(Error::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::api(
            status.as_u16(),
            extract_error_message(status.as_u16(), &body),
        ))
    }

    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Transport(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::Transport(format!(
                "Unable to connect to CapBank services at {}",
                self.base_url()
            ))
        } else {
            Error::Transport(format!("Request failed: {}", error))
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let builder = self.request(Method::GET, url, Auth::Bearer).query(query);
        let response = self.send(builder, Auth::Bearer).await?;
        Self::read_json(response).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
        auth: Auth,
    ) -> Result<Response> {
        let url = self.endpoint(segments)?;
        let builder = self.request(Method::POST, url, auth).json(body);
        self.send(builder, auth).await
    }
}

/// Pull a human message out of an error body.
///
/// Looks at `error.message`, then `message`, then a string `error`, and falls
/// back to `Error: <status>`.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let fallback = || format!("Error: {}", status);

    let Ok(json) = serde_json::from_str::<JsonValue>(body) else {
        return fallback();
    };

    let non_blank = |v: Option<&JsonValue>| {
        v.and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    non_blank(json.get("error").and_then(|e| e.get("message")))
        .or_else(|| non_blank(json.get("message")))
        .or_else(|| non_blank(json.get("error")))
        .unwrap_or_else(fallback)
}

/// Registration answer. Some deployments send 201 with an empty body; a body
/// that does not parse is logged and treated the same way.
pub fn parse_registered_user(body: &str) -> RegisteredUser {
    if body.trim().is_empty() {
        return RegisteredUser::default();
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        warn!(error = %e, "unreadable register response, continuing without a user id");
        RegisteredUser::default()
    })
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let response = match self
            .post(&["api", "user", "validate"], request, Auth::Public)
            .await
        {
            Ok(response) => response,
            Err(Error::Api { message, .. }) => return Err(Error::Auth(message)),
            Err(e) => return Err(e),
        };
        Self::read_json(response).await
    }
}

#[async_trait]
impl UserGateway for HttpGateway {
    async fn register(&self, payload: &RegisterUser) -> Result<RegisteredUser> {
        let response = self
            .post(&["api", "user", "register"], payload, Auth::Public)
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))?;

        Ok(parse_registered_user(&body))
    }

    async fn send_verification_code(&self, email: &str) -> Result<()> {
        let body = serde_json::json!({ "email": email });
        self.post(&["accounts", "send-verification"], &body, Auth::Public)
            .await?;
        Ok(())
    }

    async fn verify_code(&self, request: &VerifyCodeRequest) -> Result<()> {
        self.post(&["accounts", "verify-code"], request, Auth::Public)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountGateway for HttpGateway {
    async fn account_for_user(&self, user_id: &str) -> Result<BankAccount> {
        self.get_json(&["api", "bankaccount", "userId", user_id], &[])
            .await
    }

    async fn account_by_number(&self, account_number: &str) -> Result<BankAccount> {
        self.get_json(&["api", "bankaccount", "number", account_number.trim()], &[])
            .await
    }
}

#[async_trait]
impl TransactionGateway for HttpGateway {
    async fn deposit(&self, request: &DepositRequest) -> Result<TransactionResult> {
        let response = self
            .post(&["api", "transaction", "deposit"], request, Auth::Bearer)
            .await?;
        Self::read_json(response).await
    }

    async fn withdraw(&self, request: &WithdrawalRequest) -> Result<TransactionResult> {
        let response = self
            .post(&["api", "transaction", "withdrawal"], request, Auth::Bearer)
            .await?;
        Self::read_json(response).await
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransactionResult> {
        let response = self
            .post(&["api", "transaction", "transfer"], request, Auth::Bearer)
            .await?;
        Self::read_json(response).await
    }

    async fn transactions(
        &self,
        account_id: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<Transaction>> {
        self.get_json(
            &["api", "transaction", "account", account_id],
            &[("page", page.to_string()), ("size", size.to_string())],
        )
        .await
    }

    async fn history(
        &self,
        account_id: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<TransactionHistory>> {
        self.get_json(
            &["api", "transaction-history", "account", account_id],
            &[("page", page.to_string()), ("size", size.to_string())],
        )
        .await
    }
}
