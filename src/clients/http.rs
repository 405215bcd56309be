//! Session-bound HTTP client for the Admin API.
//!
//! Wraps `reqwest` with the headers and retry behavior every Admin API
//! request needs: the access token header, a library user agent, and a
//! retry loop for rate-limited (429) and server-error (500) responses that
//! honors `Retry-After`.

use std::collections::HashMap;
use std::time::Duration;

use crate::auth::Session;
use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::config::ApiConfig;

/// Fixed retry wait time in seconds when the response carries no
/// `Retry-After` header.
pub const RETRY_WAIT_TIME: u64 = 1;

/// A parsed Admin API response.
///
/// Headers are lower-cased; the body is parsed as JSON, with empty bodies
/// represented as an empty object.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lower-cased, with repeated headers collected.
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed JSON body.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Returns the first value of the given header, matched
    /// case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header, used in error references.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the `Retry-After` header parsed as seconds.
    #[must_use]
    pub fn retry_after(&self) -> Option<f64> {
        self.header("retry-after").and_then(|v| v.parse().ok())
    }
}

/// HTTP client bound to a session's shop and access token.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async
/// tasks.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_uri: String,
    default_headers: Vec<(String, String)>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client for the given session.
    ///
    /// The base URI is the shop's own domain unless the config carries an
    /// [`api_host`](ApiConfig::api_host) override, in which case requests go
    /// to the override with a `Host` header naming the shop.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created, which only
    /// happens when TLS initialization fails.
    #[must_use]
    pub fn new(session: &Session, config: &ApiConfig) -> Self {
        let base_uri = config.api_origin(&session.shop);

        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!("{} | Rust {rust_version}", config.user_agent_prefix());

        let mut default_headers = vec![
            ("User-Agent".to_string(), user_agent),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if config.api_host().is_some() {
            // Proxy scenario: keep the logical shop host on the request
            default_headers.push(("Host".to_string(), session.shop.as_ref().to_string()));
        }
        if !session.access_token.is_empty() {
            default_headers.push((
                "X-Shopify-Access-Token".to_string(),
                session.access_token.clone(),
            ));
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_uri,
            default_headers,
        }
    }

    /// Returns the base URI requests are sent to.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Sends a JSON POST to `path` (relative to the base URI), retrying
    /// rate-limited and server-error responses up to `tries` attempts.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Network`] for transport failures
    /// - [`HttpError::Response`] for non-retryable error responses
    /// - [`HttpError::MaxRetries`] when attempts are exhausted on 429/500
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        tries: u32,
    ) -> Result<HttpResponse, HttpError> {
        let url = format!("{}{}", self.base_uri, path);
        let tries = tries.max(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let mut request = self.client.post(&url).json(body);
            for (name, value) in &self.default_headers {
                request = request.header(name.as_str(), value.as_str());
            }

            let res = request.send().await?;
            let code = res.status().as_u16();
            let headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();
            let body_json = if body_text.is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&body_text)
                    .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
            };

            let response = HttpResponse::new(code, headers, body_json);
            if response.is_ok() {
                return Ok(response);
            }

            let message = Self::serialize_error(&response);
            let should_retry = code == 429 || code == 500;
            if !should_retry {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message,
                    error_reference: response.request_id().map(String::from),
                }));
            }

            if attempt >= tries {
                if tries == 1 {
                    return Err(HttpError::Response(HttpResponseError {
                        code,
                        message,
                        error_reference: response.request_id().map(String::from),
                    }));
                }
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries,
                    message,
                    error_reference: response.request_id().map(String::from),
                }));
            }

            let delay = Self::retry_delay(&response, code);
            tracing::warn!(
                status = code,
                attempt,
                "retrying Admin API request after error response"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn retry_delay(response: &HttpResponse, status: u16) -> Duration {
        // 429 responses advertise how long to back off; 500s get the
        // fixed wait
        if status == 429 {
            if let Some(retry_after) = response.retry_after() {
                return Duration::from_secs_f64(retry_after);
            }
        }
        Duration::from_secs(RETRY_WAIT_TIME)
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for field in ["errors", "error", "error_description"] {
            if let Some(value) = response.body.get(field) {
                error_body.insert(field.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}
