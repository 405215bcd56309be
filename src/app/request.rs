//! Framework-neutral request and response values.
//!
//! The handlers in this crate never touch a web framework directly.
//! Integrators convert their framework's request into an [`AppRequest`],
//! call a handler, and convert the returned [`AppResponse`] back. This
//! keeps the crate usable from any server, the same way webhook deliveries
//! are modeled as plain values for verification.

use std::fmt;

/// HTTP methods the handlers distinguish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
    /// PUT request.
    Put,
    /// DELETE request.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// An incoming HTTP request, as seen by the handlers.
///
/// The URL may be absolute (`https://host/path?query`) or origin-relative
/// (`/path?query`); only the path and query are interpreted. Header lookup
/// is case-insensitive. The body is raw bytes so webhook signatures can be
/// verified over the exact payload.
///
/// # Example
///
/// ```rust
/// use shopify_app::{AppRequest, HttpMethod};
///
/// let request = AppRequest::builder(HttpMethod::Get, "/auth?shop=my-store.myshopify.com")
///     .header("Accept", "text/html")
///     .build();
///
/// assert_eq!(request.path(), "/auth");
/// assert_eq!(request.query_param("shop").as_deref(), Some("my-store.myshopify.com"));
/// ```
#[derive(Clone, Debug)]
pub struct AppRequest {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl AppRequest {
    /// Creates a builder for a request.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> AppRequestBuilder {
        AppRequestBuilder {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the URL as given.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        let without_query = self.url.split(['?', '#']).next().unwrap_or("");

        // Strip scheme://authority from absolute URLs
        without_query.find("://").map_or(without_query, |scheme_end| {
            let after_scheme = &without_query[scheme_end + 3..];
            after_scheme
                .find('/')
                .map_or("/", |path_start| &after_scheme[path_start..])
        })
    }

    /// Returns the raw query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        let (_, query) = self.url.split_once('?')?;
        Some(query.split('#').next().unwrap_or(""))
    }

    /// Returns the decoded query parameters in order of appearance.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query().map_or_else(Vec::new, decode_form_pairs)
    }

    /// Returns the first decoded value of the named query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Returns the first value of the named header, matched
    /// case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body parsed as `application/x-www-form-urlencoded`
    /// pairs.
    #[must_use]
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        std::str::from_utf8(&self.body).map_or_else(|_| Vec::new(), decode_form_pairs)
    }

    /// Returns the bearer token from the `Authorization` header, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("Authorization")?
            .strip_prefix("Bearer ")
            .map(str::trim)
    }

    /// Returns the named cookie's value from the `Cookie` header.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.header("Cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }

    /// Returns `true` when the request is a browser document load rather
    /// than a data (fetch/XHR) request.
    ///
    /// Document requests get redirected through HTML bounce pages; data
    /// requests get `401` responses with reauthorization headers instead.
    #[must_use]
    pub fn is_document_request(&self) -> bool {
        if let Some(dest) = self.header("Sec-Fetch-Dest") {
            return dest.eq_ignore_ascii_case("document");
        }
        self.header("Accept")
            .is_some_and(|accept| accept.contains("text/html"))
    }
}

/// Builder for [`AppRequest`] values.
#[derive(Debug)]
pub struct AppRequestBuilder {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl AppRequestBuilder {
    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> AppRequest {
        AppRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

fn decode_form_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(name), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw).map_or_else(|_| raw.clone(), |decoded| decoded.into_owned())
}

/// An outgoing HTTP response produced by the handlers.
///
/// Integrators translate the status, headers, and body into their
/// framework's response type.
#[derive(Clone, Debug)]
pub struct AppResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl AppResponse {
    /// Creates an empty response with the given status.
    #[must_use]
    pub const fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Creates a `302 Found` redirect to `location`.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::with_status(302).header("Location", location)
    }

    /// Creates a `200 OK` HTML response.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_status(200)
            .header("Content-Type", "text/html;charset=utf-8")
            .body(body.into().into_bytes())
    }

    /// Creates a `400 Bad Request` response with a plain text reason.
    #[must_use]
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::with_status(400)
            .header("Content-Type", "text/plain;charset=utf-8")
            .body(reason.into().into_bytes())
    }

    /// Creates an empty `401 Unauthorized` response.
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self::with_status(401)
    }

    /// Creates an empty `404 Not Found` response.
    #[must_use]
    pub const fn not_found() -> Self {
        Self::with_status(404)
    }

    /// Adds a header (builder form).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body (builder form).
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Adds a header in place.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns all headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first value of the named header, matched
    /// case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the response body.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}
