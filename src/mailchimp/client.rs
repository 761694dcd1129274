//! Mailchimp API client
//!
//! Thin wrapper over `reqwest` that authenticates every call, retries
//! transient failures (429, 5xx, connection errors) and decodes JSON.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, ConfigError, Result};
use crate::mailchimp::retry::RetryConfig;

/// Result of a single logical API operation
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Mailchimp Marketing API client
///
/// Read-only after construction; share it behind an `Arc`.
pub struct MailchimpClient {
    /// HTTP client carrying the auth and content-type headers
    http_client: reqwest::Client,

    /// API root, without a trailing slash
    base_url: String,

    /// Retry budget and backoff
    retry: RetryConfig,
}

impl MailchimpClient {
    /// Create a client for the account described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(
            config.api_base_url(),
            &config.api_key,
            config.retry,
            config.request_timeout,
        )
    }

    /// Create a client against an explicit API root
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: &str,
        retry: RetryConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, basic_auth_header(api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Perform one logical operation, retrying transient failures.
    ///
    /// 429 and 5xx responses and connection-level errors are retried up to
    /// `max_retries` times; any other non-2xx response fails on the spot.
    /// A connection that drops while a 2xx body is being read counts as a
    /// connection-level error. A `Retry-After` header on a 429 replaces the
    /// computed backoff.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let url = self.build_url(path);
        let max_retries = self.retry.max_retries();
        let mut attempt: u32 = 0;

        loop {
            debug!(method = %method, url = %url, attempt, "Mailchimp request");

            let mut request = self.http_client.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(body);
            }

            let network_error = match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(text) => return decode_json(&text),
                            Err(e) => e,
                        }
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        if attempt >= max_retries {
                            let body = response.text().await.unwrap_or_default();
                            return Err(ApiError::RateLimitExceeded { body });
                        }
                        let delay = retry_after_delay(response.headers())
                            .unwrap_or_else(|| self.retry.delay_for_attempt(attempt));
                        self.wait_before_retry(attempt, delay, "Rate limited, retrying")
                            .await;
                        attempt += 1;
                        continue;
                    } else if status.is_server_error() {
                        if attempt >= max_retries {
                            let body = response.text().await.unwrap_or_default();
                            return Err(ApiError::ServerError {
                                status: status.as_u16(),
                                body,
                            });
                        }
                        let delay = self.retry.delay_for_attempt(attempt);
                        debug!(status = status.as_u16(), "Mailchimp server error");
                        self.wait_before_retry(attempt, delay, "Server error, retrying")
                            .await;
                        attempt += 1;
                        continue;
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        return Err(ApiError::RequestFailed {
                            status: status.as_u16(),
                            body,
                        });
                    }
                }
                Err(e) => e,
            };

            if attempt >= max_retries {
                return Err(ApiError::Network(network_error));
            }
            debug!(error = %network_error, "Mailchimp request failed");
            let delay = self.retry.delay_for_attempt(attempt);
            self.wait_before_retry(attempt, delay, "Request failed, retrying")
                .await;
            attempt += 1;
        }
    }

    async fn wait_before_retry(&self, attempt: u32, delay: Duration, message: &str) {
        warn!(
            attempt = attempt + 1,
            max_attempts = self.retry.total_attempts(),
            delay_ms = delay.as_millis() as u64,
            "{}",
            message
        );
        tokio::time::sleep(delay).await;
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, path, None).await
    }
}

/// `Basic base64(key:key)`
fn basic_auth_header(api_key: &str) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{}:{}", api_key, api_key));
    let mut value = HeaderValue::from_str(&format!("Basic {}", encoded)).map_err(|_| {
        ConfigError::InvalidConfig {
            message: "API key cannot be used in an Authorization header".to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// `Retry-After` as whole seconds; HTTP-date values are ignored
pub fn retry_after_delay(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Decode a 2xx body; an empty body (204 No Content) becomes `null`
fn decode_json(text: &str) -> ApiResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::InvalidJson {
        message: e.to_string(),
    })
}
