//! HTTP client for the clinic API
//!
//! Endpoint methods live in [`crate::api`]; this module owns transport,
//! status mapping and the business-error envelope check.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::response::MutationReply;
use std::time::Duration;

use crate::{ClientConfig, ClientError, ClientResult};

/// Query string pairs
pub type Query<'a> = &'a [(&'a str, String)];

/// HTTP client for the remote PHP endpoints
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, query: Query<'_>) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> ClientResult<T> {
        tracing::debug!(path, ?query, "GET");
        let body = Self::send(self.request(Method::GET, path, query)).await?;
        Self::decode(path, &body)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        query: Query<'_>,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, ?query, "POST");
        let text = Self::send(self.request(Method::POST, path, query).json(body)).await?;
        Self::decode(path, &text)
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        query: Query<'_>,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, ?query, "PUT");
        let text = Self::send(self.request(Method::PUT, path, query).json(body)).await?;
        Self::decode(path, &text)
    }

    /// POST and return the raw body without interpreting it
    pub async fn post_raw<B: Serialize>(
        &self,
        path: &str,
        query: Query<'_>,
        body: &B,
    ) -> ClientResult<String> {
        tracing::debug!(path, ?query, "POST (raw)");
        Self::send(self.request(Method::POST, path, query).json(body)).await
    }

    /// Send the request and map non-2xx statuses
    async fn send(request: RequestBuilder) -> ClientResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, body = %text, "Request failed");
            let reason = Self::failure_text(&text);
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(reason)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(reason)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(reason))
                }
                _ => Err(ClientError::Internal(reason)),
            };
        }

        Ok(text)
    }

    /// Prefer the envelope's `error`/`message` over a raw error body
    fn failure_text(text: &str) -> String {
        serde_json::from_str::<MutationReply>(text)
            .ok()
            .and_then(|r| r.error.or(r.message))
            .unwrap_or_else(|| text.to_string())
    }

    /// Parse a 2xx body, surfacing business errors reported inside it
    fn decode<T: DeserializeOwned>(path: &str, text: &str) -> ClientResult<T> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            tracing::warn!(path, error = %e, "Response is not JSON");
            ClientError::InvalidResponse(format!("{path}: {e}"))
        })?;

        if value.is_object()
            && let Ok(reply) = serde_json::from_value::<MutationReply>(value.clone())
            && let Some(reason) = reply.failure()
        {
            tracing::warn!(path, %reason, "API reported failure");
            return Err(ClientError::Server(reason));
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::warn!(path, error = %e, "Unexpected response shape");
            ClientError::InvalidResponse(format!("{path}: {e}"))
        })
    }
}
