//! The portal login handshake.
//!
//! Four strictly sequential round-trips, each feeding the next:
//!
//! 1. login page → request verification token
//! 2. credential POST → primary `ScWebToken`
//! 3. login completion → secondary `ScWebToken` cookie
//! 4. JWT issuance → `ScJwtToken` cookie, the bearer credential
//!
//! Nothing is retried. The first failure aborts the chain and leaves the
//! credential cache empty.

use std::fmt;
use std::sync::Arc;

use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::extract::{self, SessionCookie};
use super::{AuthError, HandshakeStep};
use crate::api::error::truncate_body;
use crate::api::Endpoints;

/// Credential POST body, shaped like the portal's own login form submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    target_page: u8,
    params: LoginParams,
}

#[derive(Debug, Serialize)]
struct LoginParams {
    #[serde(rename = "ReturnUrl")]
    return_url: &'static str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginResponseData,
}

#[derive(Debug, Deserialize)]
struct LoginResponseData {
    html: String,
}

/// Performs the login handshake and caches the resulting bearer credential.
///
/// Clone is cheap and clones share the cache. The cache lock is held for the
/// whole handshake, so concurrent callers wait for the in-flight login and
/// then reuse its credential instead of logging in again.
#[derive(Clone)]
pub struct Authenticator {
    client: Client,
    endpoints: Endpoints,
    username: String,
    password: String,
    credential: Arc<Mutex<Option<String>>>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("endpoints", &self.endpoints)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(client: Client, endpoints: Endpoints, username: &str, password: &str) -> Self {
        Self {
            client,
            endpoints,
            username: username.to_string(),
            password: password.to_string(),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Return the bearer credential, logging in first if none is cached.
    pub async fn acquire_credential(&self) -> Result<String, AuthError> {
        let mut cached = self.credential.lock().await;
        if let Some(ref token) = *cached {
            debug!("Using cached bearer credential");
            return Ok(token.clone());
        }

        let token = self.handshake().await?;
        info!(username = %self.username, "Authenticated with Southern Company");
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Whether a bearer credential has been acquired
    pub async fn is_authenticated(&self) -> bool {
        self.credential.lock().await.is_some()
    }

    async fn handshake(&self) -> Result<String, AuthError> {
        let verification_token = self.fetch_verification_token().await?;
        let primary = self.fetch_primary_session_token(&verification_token).await?;
        let secondary = self.fetch_secondary_session_cookie(&primary).await?;
        self.fetch_bearer_credential(&secondary).await
    }

    async fn fetch_verification_token(&self) -> Result<String, AuthError> {
        let step = HandshakeStep::VerificationToken;
        let url = self.endpoints.login_page();
        debug!(%step, url = %url, "Fetching login page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| network_error(step, &url, source))?;

        if response.status() != StatusCode::OK {
            return Err(status_error_with_body(step, &url, response).await);
        }

        let page = response
            .text()
            .await
            .map_err(|source| network_error(step, &url, source))?;

        let token = extract::verification_token(&page)
            .map_err(|source| AuthError::Extraction { step, source })?;
        debug!(%step, len = token.len(), "Extracted token");
        Ok(token)
    }

    async fn fetch_primary_session_token(&self, verification_token: &str) -> Result<String, AuthError> {
        let step = HandshakeStep::PrimarySessionToken;
        let url = self.endpoints.login_api();
        debug!(%step, url = %url, "Submitting credentials");

        let body = LoginRequest {
            username: &self.username,
            password: &self.password,
            target_page: 1,
            params: LoginParams { return_url: "null" },
        };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .header("RequestVerificationToken", verification_token)
            .json(&body)
            .send()
            .await
            .map_err(|source| network_error(step, &url, source))?;

        if response.status() != StatusCode::OK {
            return Err(status_error_with_body(step, &url, response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|source| network_error(step, &url, source))?;
        let parsed: LoginResponse = serde_json::from_str(&text)
            .map_err(|source| AuthError::InvalidResponse { step, source })?;

        let token = extract::primary_session_token(&parsed.data.html)
            .map_err(|source| AuthError::Extraction { step, source })?;
        debug!(%step, len = token.len(), "Extracted token");
        Ok(token)
    }

    async fn fetch_secondary_session_cookie(&self, primary: &str) -> Result<String, AuthError> {
        let step = HandshakeStep::SecondarySessionCookie;
        let url = self.endpoints.login_complete();
        debug!(%step, url = %url, "Completing login");

        let response = self
            .client
            .post(&url)
            .form(&[(SessionCookie::ScWebToken.name(), primary)])
            .send()
            .await
            .map_err(|source| network_error(step, &url, source))?;

        let cookies = set_cookie_values(&response);

        if response.status() != StatusCode::OK {
            let detail = if cookies.is_empty() {
                "no cookies".to_string()
            } else {
                cookies.join(", ")
            };
            return Err(status_error(step, &url, response.status(), detail));
        }

        let token = extract::cookie_token(cookies.iter().map(String::as_str), SessionCookie::ScWebToken)
            .map_err(|source| AuthError::Extraction { step, source })?;
        debug!(%step, len = token.len(), "Extracted token");
        Ok(token)
    }

    async fn fetch_bearer_credential(&self, secondary: &str) -> Result<String, AuthError> {
        let step = HandshakeStep::BearerCredential;
        let url = self.endpoints.jwt_token();
        debug!(%step, url = %url, "Requesting JWT");

        let response = self
            .client
            .get(&url)
            .header(
                header::COOKIE,
                format!("{}={}", SessionCookie::ScWebToken.name(), secondary),
            )
            .send()
            .await
            .map_err(|source| network_error(step, &url, source))?;

        if response.status() != StatusCode::OK {
            return Err(status_error_with_body(step, &url, response).await);
        }

        let cookies = set_cookie_values(&response);
        let token = extract::cookie_token(cookies.iter().map(String::as_str), SessionCookie::ScJwtToken)
            .map_err(|source| AuthError::Extraction { step, source })?;
        debug!(%step, len = token.len(), "Extracted token");
        Ok(token)
    }
}

fn set_cookie_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

fn network_error(step: HandshakeStep, url: &str, source: reqwest::Error) -> AuthError {
    AuthError::Network {
        step,
        url: url.to_string(),
        source,
    }
}

fn status_error(step: HandshakeStep, url: &str, status: StatusCode, detail: String) -> AuthError {
    AuthError::Status {
        step,
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        url: url.to_string(),
        detail,
    }
}

/// Build a status error, including the response body when it can be read.
async fn status_error_with_body(step: HandshakeStep, url: &str, response: Response) -> AuthError {
    let status = response.status();
    let detail = match response.text().await {
        Ok(body) => truncate_body(&body),
        Err(e) => {
            warn!(%step, error = %e, "Failed to read response body");
            String::new()
        }
    };
    status_error(step, url, status, detail)
}
