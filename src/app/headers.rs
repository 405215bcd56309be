//! Document response headers.
//!
//! Embedded apps render inside the Shopify admin iframe, which requires a
//! `Content-Security-Policy` allowing exactly that shop's admin (and the
//! unified admin) as frame ancestors. Non-embedded apps must never be
//! framed at all.

use crate::app::request::AppResponse;
use crate::config::ApiConfig;

/// Returns the `Content-Security-Policy` value for a document response.
///
/// For embedded apps the policy allows the current shop's admin and the
/// unified `admin.shopify.com` as frame ancestors; when the shop is not
/// known yet, any `*.myshopify.com` admin is allowed so the page can boot
/// App Bridge and discover it. Non-embedded apps deny framing entirely.
///
/// # Example
///
/// ```rust
/// use shopify_app::app::headers::content_security_policy;
/// use shopify_app::{ApiKey, ApiSecretKey, AppConfig, MemorySessionStorage};
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .app_url("https://app.example.com")
///     .session_storage(MemorySessionStorage::new())
///     .build()
///     .unwrap();
///
/// let policy = content_security_policy(config.api(), Some("my-store.myshopify.com"));
/// assert_eq!(
///     policy,
///     "frame-ancestors https://my-store.myshopify.com https://admin.shopify.com;"
/// );
/// ```
#[must_use]
pub fn content_security_policy(config: &ApiConfig, shop: Option<&str>) -> String {
    if config.is_embedded() {
        let ancestor = shop.map_or_else(
            || "https://*.myshopify.com".to_string(),
            |shop| format!("https://{shop}"),
        );
        format!("frame-ancestors {ancestor} https://admin.shopify.com;")
    } else {
        "frame-ancestors 'none';".to_string()
    }
}

/// Adds the document response headers for the given shop to a response.
pub fn add_document_response_headers(
    config: &ApiConfig,
    shop: Option<&str>,
    response: &mut AppResponse,
) {
    response.add_header(
        "Content-Security-Policy",
        content_security_policy(config, shop),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, AppConfig};
    use crate::storage::MemorySessionStorage;

    fn config(embedded: bool) -> ApiConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .app_url("https://app.example.com")
            .is_embedded(embedded)
            .session_storage(MemorySessionStorage::new())
            .build()
            .unwrap()
            .api()
            .clone()
    }

    #[test]
    fn test_embedded_policy_names_the_shop() {
        let policy = content_security_policy(&config(true), Some("my-store.myshopify.com"));
        assert_eq!(
            policy,
            "frame-ancestors https://my-store.myshopify.com https://admin.shopify.com;"
        );
    }

    #[test]
    fn test_embedded_policy_without_shop_uses_wildcard() {
        let policy = content_security_policy(&config(true), None);
        assert_eq!(
            policy,
            "frame-ancestors https://*.myshopify.com https://admin.shopify.com;"
        );
    }

    #[test]
    fn test_non_embedded_policy_denies_framing() {
        let policy = content_security_policy(&config(false), Some("my-store.myshopify.com"));
        assert_eq!(policy, "frame-ancestors 'none';");
    }

    #[test]
    fn test_headers_are_added_to_response() {
        let mut response = AppResponse::html("<p>page</p>");
        add_document_response_headers(&config(true), Some("s.myshopify.com"), &mut response);
        assert!(response
            .header_value("Content-Security-Policy")
            .unwrap()
            .contains("s.myshopify.com"));
    }
}
