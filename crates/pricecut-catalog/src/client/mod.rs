//! HTTP client for the Shopify Admin GraphQL API.

mod pages;

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::CatalogError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{GraphqlResponse, ResponseExtensions};

/// Shopify caps connection page size at 250 nodes.
pub const DEFAULT_PAGE_SIZE: u32 = 250;

/// Below this many available cost points, each response logs a warning.
const LOW_THROTTLE_POINTS: f64 = 100.0;

/// HTTP client for the Admin GraphQL endpoint.
///
/// Every request is a `POST` of `{query, variables}` authenticated with the
/// `X-Shopify-Access-Token` header. Rate limiting (HTTP 429 or a GraphQL
/// `THROTTLED` error) and connectivity failures are retried with exponential
/// backoff up to `max_retries` additional attempts. GraphQL errors and other
/// non-2xx statuses fail on the first attempt.
pub struct CatalogClient {
    client: Client,
    endpoint: Url,
    access_token: String,
    /// `first:` argument for paginated connections.
    page_size: u32,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in milliseconds: `backoff_base_ms * 2^(retry - 1)`.
    backoff_base_ms: u64,
}

impl CatalogClient {
    /// Creates a client with the configured timeout and `User-Agent`, three
    /// retries with a 2 s backoff base, and 250-node pages.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute URL, or [`CatalogError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        endpoint: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        let endpoint = Url::parse(endpoint).map_err(|e| CatalogError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            access_token: access_token.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: 3,
            backoff_base_ms: 2_000,
        })
    }

    /// Builds a client from the process configuration.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::new`].
    pub fn from_app_config(config: &pricecut_core::AppConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(
            &config.graphql_endpoint,
            &config.shopify_access_token,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retries(config.max_retries, config.retry_backoff_base_ms)
        .with_page_size(config.page_size))
    }

    /// `max_retries` is the number of additional attempts after the first
    /// failure. Set to `0` to disable retries.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Runs one GraphQL operation and decodes its `data`, retrying transient
    /// failures.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::RetriesExhausted`]: rate limiting or connectivity
    ///   failures outlasted the retry budget.
    /// - [`CatalogError::Query`]: the response carried GraphQL errors (not retried).
    /// - [`CatalogError::HttpStatus`]: any non-2xx status other than 429 (not retried).
    /// - [`CatalogError::Deserialize`]: the body did not match `T` (not retried).
    /// - [`CatalogError::MissingData`]: `data` was `null` without errors.
    pub async fn execute<T>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let body = &body;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || {
            self.send_once::<T>(operation, body)
        })
        .await
    }

    async fn send_once<T>(&self, operation: &str, body: &serde_json::Value) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("X-Shopify-Access-Token", &self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(CatalogError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        operation,
                        status = status.as_u16(),
                        error = %e,
                        "failed to read error response body"
                    );
                    format!("<unreadable response body: {e}>")
                }
            };
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: GraphqlResponse<T> =
            serde_json::from_str(&text).map_err(|e| CatalogError::Deserialize {
                context: format!("{operation} response"),
                source: e,
            })?;

        if let Some(extensions) = &parsed.extensions {
            warn_on_low_throttle(operation, extensions);
        }

        if !parsed.errors.is_empty() {
            if parsed.errors.iter().any(|e| e.is_throttled()) {
                return Err(CatalogError::RateLimited {
                    retry_after_secs: None,
                });
            }
            let messages = parsed
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::error!(operation, %messages, "GraphQL errors in catalog response");
            return Err(CatalogError::Query { messages });
        }

        parsed.data.ok_or_else(|| CatalogError::MissingData {
            context: operation.to_owned(),
        })
    }
}

fn warn_on_low_throttle(operation: &str, extensions: &ResponseExtensions) {
    let Some(cost) = &extensions.cost else {
        return;
    };
    let status = &cost.throttle_status;
    if status.currently_available < LOW_THROTTLE_POINTS {
        tracing::warn!(
            operation,
            currently_available = status.currently_available,
            maximum_available = status.maximum_available,
            restore_rate = status.restore_rate,
            "catalog API throttle budget running low"
        );
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
