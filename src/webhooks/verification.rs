//! Webhook delivery verification.
//!
//! Shopify signs every webhook delivery with HMAC-SHA256 over the raw
//! request body, base64-encoded in the `X-Shopify-Hmac-SHA256` header.
//! [`verify_webhook`] checks that signature (constant-time, with old-key
//! fallback for rotation) and returns the delivery's verified metadata.

use crate::auth::oauth::hmac::{compute_signature_base64, constant_time_compare};
use crate::config::ApiConfig;
use crate::webhooks::{WebhookError, WebhookTopic};

/// HTTP header carrying the base64 HMAC-SHA256 signature of the body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-SHA256";

/// HTTP header carrying the topic string (e.g. "orders/create").
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// HTTP header carrying the delivering shop's myshopify.com domain.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// HTTP header carrying the API version the payload was serialized with.
pub const HEADER_API_VERSION: &str = "X-Shopify-API-Version";

/// HTTP header carrying the unique delivery ID, useful for idempotency.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

/// An incoming webhook delivery, before verification.
///
/// The body is kept as raw bytes so the exact payload Shopify signed is
/// what gets verified.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    body: Vec<u8>,
    hmac_header: String,
    topic: Option<String>,
    shop_domain: Option<String>,
    api_version: Option<String>,
    webhook_id: Option<String>,
}

impl WebhookRequest {
    /// Creates a webhook request from the raw body and header values.
    #[must_use]
    pub fn new(
        body: Vec<u8>,
        hmac_header: String,
        topic: Option<String>,
        shop_domain: Option<String>,
        api_version: Option<String>,
        webhook_id: Option<String>,
    ) -> Self {
        Self {
            body,
            hmac_header,
            topic,
            shop_domain,
            api_version,
            webhook_id,
        }
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the received HMAC signature.
    #[must_use]
    pub fn hmac_header(&self) -> &str {
        &self.hmac_header
    }

    /// Returns the topic header value, if present.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Returns the shop domain header value, if present.
    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }
}

/// Verified webhook metadata, returned after signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookContext {
    topic: Option<WebhookTopic>,
    topic_raw: String,
    shop_domain: Option<String>,
    api_version: Option<String>,
    webhook_id: Option<String>,
}

impl WebhookContext {
    /// Returns the parsed topic, when it is one this crate knows.
    #[must_use]
    pub const fn topic(&self) -> Option<WebhookTopic> {
        self.topic
    }

    /// Returns the raw topic string, always available.
    #[must_use]
    pub fn topic_raw(&self) -> &str {
        &self.topic_raw
    }

    /// Returns the delivering shop's domain, if present.
    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    /// Returns the API version of the payload, if present.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Returns the unique delivery ID, if present.
    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}

/// Verifies the HMAC signature of a webhook body against a single secret.
///
/// Most callers want [`verify_webhook`], which takes the config and handles
/// key rotation.
#[must_use]
pub fn verify_hmac(raw_body: &[u8], hmac_header: &str, secret: &str) -> bool {
    let computed = compute_signature_base64(raw_body, secret);
    constant_time_compare(&computed, hmac_header)
}

/// Verifies a webhook delivery and returns its verified metadata.
///
/// The primary API secret key is tried first, then the old secret key when
/// one is configured.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidHmac`] when neither key verifies the
/// signature.
pub fn verify_webhook(
    config: &ApiConfig,
    request: &WebhookRequest,
) -> Result<WebhookContext, WebhookError> {
    let body = request.body();
    let hmac_header = request.hmac_header();

    let mut verified = verify_hmac(body, hmac_header, config.api_secret_key().as_ref());
    if !verified {
        if let Some(old_secret) = config.old_api_secret_key() {
            verified = verify_hmac(body, hmac_header, old_secret.as_ref());
        }
    }

    if !verified {
        tracing::debug!(
            shop = request.shop_domain().unwrap_or("<unknown>"),
            "webhook delivery failed signature verification"
        );
        return Err(WebhookError::InvalidHmac);
    }

    let topic_raw = request.topic().unwrap_or("").to_string();
    let topic = if topic_raw.is_empty() {
        None
    } else {
        WebhookTopic::parse(&topic_raw)
    };

    Ok(WebhookContext {
        topic,
        topic_raw,
        shop_domain: request.shop_domain().map(String::from),
        api_version: request.api_version.clone(),
        webhook_id: request.webhook_id.clone(),
    })
}
