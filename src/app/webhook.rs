//! Webhook request authentication for the assembled app.
//!
//! Bridges the framework-neutral [`AppRequest`] to webhook delivery
//! verification: headers are lifted into a [`WebhookRequest`], the
//! signature is verified, the payload parsed, and the shop's stored
//! offline session attached when one exists.

use crate::app::admin::AdminContext;
use crate::app::request::AppRequest;
use crate::auth::Session;
use crate::config::{ApiConfig, ShopDomain};
use crate::webhooks::verification::{
    HEADER_API_VERSION, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID,
};
use crate::webhooks::{verify_webhook, WebhookContext, WebhookError, WebhookRequest};

/// A verified webhook delivery.
///
/// The session is the shop's stored offline session; it is `None` when no
/// session exists, which is normal for deliveries that arrive after the
/// shop uninstalled the app (`app/uninstalled` itself, and the mandatory
/// privacy topics).
#[derive(Debug)]
pub struct WebhookAuth {
    context: WebhookContext,
    payload: serde_json::Value,
    session: Option<Session>,
    config: ApiConfig,
}

impl WebhookAuth {
    /// Returns the verified delivery metadata.
    #[must_use]
    pub const fn context(&self) -> &WebhookContext {
        &self.context
    }

    /// Returns the parsed JSON payload.
    #[must_use]
    pub const fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Returns the shop's stored offline session, if one exists.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns an admin context for the delivering shop, when a session is
    /// stored.
    #[must_use]
    pub fn admin(&self) -> Option<AdminContext> {
        self.session
            .as_ref()
            .map(|session| AdminContext::new(session.clone(), self.config.clone()))
    }
}

pub(crate) fn webhook_request_from(
    request: &AppRequest,
) -> Result<WebhookRequest, WebhookError> {
    let hmac_header = request
        .header(HEADER_HMAC)
        .ok_or(WebhookError::MissingHmacHeader)?
        .to_string();

    Ok(WebhookRequest::new(
        request.body().to_vec(),
        hmac_header,
        request.header(HEADER_TOPIC).map(String::from),
        request.header(HEADER_SHOP_DOMAIN).map(String::from),
        request.header(HEADER_API_VERSION).map(String::from),
        request.header(HEADER_WEBHOOK_ID).map(String::from),
    ))
}

pub(crate) async fn authenticate<S: crate::storage::SessionStorage>(
    config: &ApiConfig,
    storage: &S,
    request: &AppRequest,
) -> Result<WebhookAuth, crate::app::error::AuthError> {
    let webhook_request = webhook_request_from(request)?;
    let context = verify_webhook(config, &webhook_request)?;

    let payload: serde_json::Value = serde_json::from_slice(request.body()).map_err(|e| {
        WebhookError::InvalidPayload {
            message: e.to_string(),
        }
    })?;

    let session = match context.shop_domain().and_then(ShopDomain::sanitize) {
        Some(shop) => storage.load_session(&Session::offline_id(&shop)).await?,
        None => None,
    };

    tracing::debug!(
        topic = context.topic_raw(),
        shop = context.shop_domain().unwrap_or("<unknown>"),
        has_session = session.is_some(),
        "webhook delivery verified"
    );

    Ok(WebhookAuth {
        context,
        payload,
        session,
        config: config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::request::{AppRequest, HttpMethod};
    use crate::auth::oauth::compute_signature_base64;
    use crate::auth::AuthScopes;
    use crate::config::{ApiKey, ApiSecretKey, AppConfig};
    use crate::storage::{MemorySessionStorage, SessionStorage};
    use crate::webhooks::WebhookTopic;

    fn config() -> ApiConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .app_url("https://app.example.com")
            .session_storage(MemorySessionStorage::new())
            .build()
            .unwrap()
            .api()
            .clone()
    }

    fn delivery(body: &[u8], secret: &str, topic: &str) -> AppRequest {
        AppRequest::builder(HttpMethod::Post, "/webhooks")
            .header(HEADER_HMAC, compute_signature_base64(body, secret))
            .header(HEADER_TOPIC, topic)
            .header(HEADER_SHOP_DOMAIN, "test-shop.myshopify.com")
            .header(HEADER_WEBHOOK_ID, "delivery-1")
            .body(body.to_vec())
            .build()
    }

    #[tokio::test]
    async fn test_authenticates_valid_delivery() {
        let storage = MemorySessionStorage::new();
        let request = delivery(br#"{"id": 1}"#, "secret", "orders/create");

        let auth = authenticate(&config(), &storage, &request).await.unwrap();
        assert_eq!(auth.context().topic(), Some(WebhookTopic::OrdersCreate));
        assert_eq!(auth.payload()["id"], 1);
        assert!(auth.session().is_none());
        assert!(auth.admin().is_none());
    }

    #[tokio::test]
    async fn test_attaches_offline_session_when_stored() {
        let storage = MemorySessionStorage::new();
        let shop = ShopDomain::new("test-shop").unwrap();
        storage
            .store_session(Session::new(
                Session::offline_id(&shop),
                shop,
                "token".to_string(),
                AuthScopes::new(),
                false,
                None,
            ))
            .await
            .unwrap();

        let request = delivery(br#"{}"#, "secret", "app/uninstalled");
        let auth = authenticate(&config(), &storage, &request).await.unwrap();
        assert!(auth.session().is_some());
        assert!(auth.admin().is_some());
    }

    #[tokio::test]
    async fn test_rejects_missing_signature_header() {
        let storage = MemorySessionStorage::new();
        let request = AppRequest::builder(HttpMethod::Post, "/webhooks")
            .body(br#"{}"#.to_vec())
            .build();

        let result = authenticate(&config(), &storage, &request).await;
        assert!(matches!(
            result,
            Err(crate::app::error::AuthError::Webhook(
                WebhookError::MissingHmacHeader
            ))
        ));
    }

    #[tokio::test]
    async fn test_rejects_bad_signature() {
        let storage = MemorySessionStorage::new();
        let request = delivery(br#"{}"#, "wrong-secret", "orders/create");

        let result = authenticate(&config(), &storage, &request).await;
        assert!(matches!(
            result,
            Err(crate::app::error::AuthError::Webhook(
                WebhookError::InvalidHmac
            ))
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_json_payload() {
        let storage = MemorySessionStorage::new();
        let request = delivery(b"not json", "secret", "orders/create");

        let result = authenticate(&config(), &storage, &request).await;
        assert!(matches!(
            result,
            Err(crate::app::error::AuthError::Webhook(
                WebhookError::InvalidPayload { .. }
            ))
        ));
    }
}
