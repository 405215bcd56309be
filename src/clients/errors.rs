//! Error types for the Admin API clients.

use thiserror::Error;

/// Error returned when an API request receives a non-successful response.
///
/// The message field carries the serialized error body from the response
/// (the `errors`/`error` fields Shopify returns), plus a reporting
/// reference when an `X-Request-Id` header was present.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Serialized error message in JSON format.
    pub message: String,
    /// Reference ID for error reporting (from the X-Request-Id header).
    pub error_reference: Option<String>,
}

/// Error returned when retry attempts have been exhausted.
///
/// Raised when a request keeps failing with 429 or 500 responses after all
/// configured attempts.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of attempts that were made.
    pub tries: u32,
    /// Serialized error message from the last response.
    pub message: String,
    /// Reference ID for error reporting (from the X-Request-Id header).
    pub error_reference: Option<String>,
}

/// Unified error type for HTTP operations against the Admin API.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A network-level error from the underlying HTTP client.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// A non-2xx response that is not retried.
    #[error(transparent)]
    Response(HttpResponseError),

    /// Retry attempts were exhausted on a retryable status.
    #[error(transparent)]
    MaxRetries(MaxHttpRetriesExceededError),
}

/// Errors from the GraphQL Admin API client.
///
/// GraphQL-level errors (user errors, validation errors) arrive with HTTP
/// 200 and live in the response body; this type only covers transport-level
/// failures.
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// An underlying HTTP error.
    #[error(transparent)]
    Http(#[from] HttpError),
}
