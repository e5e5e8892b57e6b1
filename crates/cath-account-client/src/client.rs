//! HTTP implementation of the account collaborator port.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use cath_core::{ListType, PublicationError, RequesterId, Sensitivity};
use cath_publication::{AccountService, IdentityContext, Role};

use crate::error::AccountApiError;
use crate::retry::retry_send;

/// Configuration for the account service HTTP client.
#[derive(Debug, Clone)]
pub struct AccountClientConfig {
    /// Base URL of the account service (e.g. `https://accounts.internal/api/v1`).
    pub base_url: String,
    /// Bearer token for service-to-service authentication, if required.
    pub api_token: Option<String>,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl AccountClientConfig {
    /// Create a configuration with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout_secs: 10,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    requester_id: RequesterId,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct VerdictResponse {
    authorised: bool,
}

/// Account collaborator client over `reqwest`, shareable via `Arc`
/// across async tasks. Transport failures retry with backoff; response
/// statuses are handled per call.
#[derive(Debug)]
pub struct HttpAccountService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAccountService {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AccountApiError::Config`] when the base URL does not
    /// parse, the token contains bytes that cannot form a header value,
    /// or the HTTP client cannot build.
    pub fn new(config: AccountClientConfig) -> Result<Self, AccountApiError> {
        url::Url::parse(&config.base_url)
            .map_err(|e| AccountApiError::Config(format!("invalid base URL: {e}")))?;

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| {
                    AccountApiError::Config("invalid API token characters".to_string())
                })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AccountApiError::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    async fn get(&self, endpoint: String) -> Result<reqwest::Response, AccountApiError> {
        retry_send(|| self.client.get(&endpoint).send())
            .await
            .map_err(|source| AccountApiError::Http {
                endpoint: endpoint.clone(),
                source,
            })
    }

    async fn non_success(endpoint: String, resp: reqwest::Response) -> AccountApiError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        AccountApiError::Api {
            endpoint,
            status,
            body,
        }
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn resolve_identity(
        &self,
        requester_id: &RequesterId,
    ) -> Result<Option<IdentityContext>, PublicationError> {
        let endpoint = format!("{}/account/{}", self.base_url, requester_id);
        let resp = self.get(endpoint.clone()).await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::non_success(endpoint, resp).await.into());
        }
        let account: AccountResponse =
            resp.json()
                .await
                .map_err(|source| AccountApiError::Deserialization {
                    endpoint,
                    source,
                })?;
        Ok(Some(IdentityContext {
            requester_id: account.requester_id,
            role: account.role,
        }))
    }

    async fn is_authorised(
        &self,
        requester_id: &RequesterId,
        list_type: ListType,
        sensitivity: Sensitivity,
    ) -> Result<bool, PublicationError> {
        let endpoint = format!(
            "{}/account/{}/authorised?listType={}&sensitivity={}",
            self.base_url,
            requester_id,
            list_type.as_str(),
            sensitivity.as_str()
        );
        let resp = self.get(endpoint.clone()).await?;

        // An unknown account cannot be authorised for a gated tier.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(Self::non_success(endpoint, resp).await.into());
        }
        let verdict: VerdictResponse =
            resp.json()
                .await
                .map_err(|source| AccountApiError::Deserialization {
                    endpoint,
                    source,
                })?;
        Ok(verdict.authorised)
    }
}
