//! REST client for the orchard backend.
//!
//! Wraps the collection endpoints (`GET`/`POST /<Collection>`,
//! `GET`/`PUT`/`DELETE /<Collection>/<id>`) using [`reqwest`].

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Url};
use serde_json::Value;

use crate::backend::CollectionBackend;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for one backend.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl RestClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Self::with_client(client, config)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across several controllers).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }
        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a collection, or of one record when `id` is given.
    ///
    /// Segments are percent-encoded, so identifiers containing `/` or
    /// spaces stay a single path segment.
    pub fn url_for(&self, collection: &str, id: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push(collection);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    // ---- private helpers ----

    /// Attach the correlation id and, when configured, the bearer token.
    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let request_id = uuid::Uuid::now_v7().to_string();
        let builder = builder.header(REQUEST_ID_HEADER, request_id);
        match &self.api_token {
            Some(token) => match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => builder.header(AUTHORIZATION, value),
                Err(_) => {
                    tracing::warn!("API token contains invalid header characters; not sent");
                    builder
                }
            },
            None => builder,
        }
    }

    /// Send a request, turning non-2xx responses into
    /// [`ApiError::Status`] and returning the body text on success.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = self.prepare(builder).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Backend returned an error status");
            return Err(ApiError::from_body(status.as_u16(), &body));
        }
        Ok(body)
    }

    /// Parse a body that must be JSON; an empty body is `null`.
    fn parse_required(body: &str) -> Result<Value, ApiError> {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Parse an echoed record. Empty or non-JSON bodies mean "not echoed".
    fn parse_echo(body: &str) -> Option<Value> {
        if body.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "Mutation response is not JSON; treating as not echoed");
                None
            }
        }
    }
}

#[async_trait]
impl CollectionBackend for RestClient {
    async fn list(&self, collection: &str) -> Result<Value, ApiError> {
        let url = self.url_for(collection, None)?;
        let body = self.send(self.client.get(url)).await?;
        Self::parse_required(&body)
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Value, ApiError> {
        let url = self.url_for(collection, Some(id))?;
        let body = self.send(self.client.get(url)).await?;
        Self::parse_required(&body)
    }

    async fn create(&self, collection: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        let url = self.url_for(collection, None)?;
        let text = self.send(self.client.post(url).json(body)).await?;
        Ok(Self::parse_echo(&text))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.url_for(collection, Some(id))?;
        let text = self.send(self.client.put(url).json(body)).await?;
        Ok(Self::parse_echo(&text))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let url = self.url_for(collection, Some(id))?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
