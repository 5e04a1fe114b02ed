//! API client for the Southern Company customer service API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests and resolving which accounts a configuration refers to.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ApiError, Endpoints};
use crate::auth::Authenticator;
use crate::config::Config;
use crate::models::{AccountsResponse, ResolvedAccounts};

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Content type the portal's own client sends on data requests
const DATA_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// API client for the Southern Company portal.
/// Clone is cheap and clones share the connection pool and the cached credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    auth: Authenticator,
}

impl ApiClient {
    /// Create a client for the production portal
    pub fn new(username: &str, password: &str) -> Result<Self, ApiError> {
        Self::with_endpoints(username, password, Endpoints::default())
    }

    /// Create a client against the given endpoints
    pub fn with_endpoints(username: &str, password: &str, endpoints: Endpoints) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| ApiError::Network {
                url: endpoints.api_base.clone(),
                source,
            })?;

        let auth = Authenticator::new(client.clone(), endpoints.clone(), username, password);

        Ok(Self {
            client,
            endpoints,
            auth,
        })
    }

    /// Create a client from a configuration's credentials
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.username, &config.password)
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// GET `url` with the bearer credential and parse the JSON body.
    ///
    /// The first call triggers the login handshake; later calls reuse the
    /// cached credential.
    pub async fn request<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let token = self.auth.acquire_credential().await?;
        debug!(url = url, "GET");

        let response = self
            .client
            .get(url)
            .header(header::CONTENT_TYPE, DATA_CONTENT_TYPE)
            .header(header::AUTHORIZATION, format!("bearer {}", token))
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(url = url, error = %e, "Failed to read response body");
                    None
                }
            };
            return Err(ApiError::from_status(status, url, body.as_deref()));
        }

        let text = response.text().await.map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Untyped variant of [`ApiClient::request`]
    pub async fn request_value(&self, url: &str) -> Result<serde_json::Value, ApiError> {
        self.request(url).await
    }

    // ===== Account Resolution =====

    /// Fetch every account visible to the login and select the ones `config` names
    pub async fn resolve_accounts(&self, config: &Config) -> Result<ResolvedAccounts, ApiError> {
        let listing: AccountsResponse = self.request(&self.endpoints.all_accounts()).await?;
        let accounts = listing.data.iter().map(|r| r.to_account()).collect::<Vec<_>>();
        debug!(count = accounts.len(), "Fetched account listing");

        let resolved = ResolvedAccounts::from_listing(accounts, config);
        debug!(selected = resolved.accounts.len(), "Resolved accounts");
        Ok(resolved)
    }

    /// Account numbers to work with.
    ///
    /// When `config` names accounts they are returned as-is without any
    /// request; otherwise the account listing is fetched and every number on
    /// it is returned.
    pub async fn login(&self, config: &Config) -> Result<Vec<String>, ApiError> {
        if config.account_filter().is_some() {
            return Ok(config.configured_account_numbers());
        }
        Ok(self.resolve_accounts(config).await?.account_numbers)
    }
}
