//! Shared HTTP plumbing for the collaborator endpoints.
//!
//! Wraps `reqwest` with base-URL handling, JSON request/response helpers, and
//! the status/body checks every endpoint needs. Endpoint-specific logic lives
//! in [`crate::parse`], [`crate::search`], and [`crate::route`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use talkmap_core::AppConfig;

use crate::error::ClientError;
use crate::parse::ParseClient;
use crate::route::RouteClient;
use crate::search::SearchClient;
use crate::types::HealthResponse;

const DEFAULT_USER_AGENT: &str = "talkmap/0.1 (nl-navigation)";

/// HTTP client bound to one collaborator base URL.
///
/// Cheap to clone; clones share the connection pool. Use
/// [`ApiClient::from_config`] in the binary or [`ApiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if the
    /// configured URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_user_agent(
            &config.api_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Builds a client with the default user agent.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::from_config`].
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        Self::with_user_agent(base_url, timeout_secs, DEFAULT_USER_AGENT)
    }

    /// Builds a client with an explicit user agent.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::from_config`].
    pub fn with_user_agent(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so that `join` appends to any path
        // prefix instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn parser(&self) -> ParseClient {
        ParseClient::new(self.clone())
    }

    #[must_use]
    pub fn searcher(&self) -> SearchClient {
        SearchClient::new(self.clone())
    }

    #[must_use]
    pub fn router(&self) -> RouteClient {
        RouteClient::new(self.clone())
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Probes `GET /health` and returns the reported status string.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] on network failure,
    /// [`ClientError::UnexpectedStatus`] on a non-2xx status, and
    /// [`ClientError::Deserialize`] if the body lacks a `status` field.
    pub async fn health(&self) -> Result<String, ClientError> {
        let url = self.endpoint("health")?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let body = Self::read_json(response, &url).await?;
        let health: HealthResponse = decode(body, "health")?;
        Ok(health.status)
    }

    /// Resolves `path` (no leading slash) against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// POSTs `body` as JSON and returns the parsed JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] on network failure or timeout,
    /// [`ClientError::UnexpectedStatus`] on a non-2xx status, and
    /// [`ClientError::InvalidBody`] if the body is not JSON.
    pub(crate) async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let response = self.client.post(url.clone()).json(body).send().await?;
        Self::read_json(response, &url).await
    }

    async fn read_json(
        response: reqwest::Response,
        url: &Url,
    ) -> Result<serde_json::Value, ClientError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // FastAPI-style error bodies carry a `detail` string.
            let detail = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("detail")
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_owned)
                });
            tracing::warn!(
                %url,
                status = status.as_u16(),
                ?detail,
                "collaborator returned error status"
            );
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                detail,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::InvalidBody {
            context: url.to_string(),
            source: e,
        })
    }
}

/// Decodes an already-parsed JSON value into a wire type.
pub(crate) fn decode<T: DeserializeOwned>(
    body: serde_json::Value,
    context: &str,
) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Decodes the `data` payload of an envelope whose `success` flag was set.
pub(crate) fn decode_data<T: DeserializeOwned>(
    data: Option<serde_json::Value>,
    context: &'static str,
) -> Result<T, ClientError> {
    let data = data.ok_or(ClientError::MissingField {
        context,
        field: "data",
    })?;
    decode(data, context)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
