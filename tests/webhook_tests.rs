//! Integration tests for webhook subscription sync and delivery
//! authentication.

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopify_app::auth::oauth::compute_signature_base64;
use shopify_app::webhooks::verification::{
    HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID,
};
use shopify_app::{
    ApiKey, ApiSecretKey, AppConfig, AppRequest, HttpMethod, MemorySessionStorage, Session,
    SessionStorage, ShopDomain, ShopifyApp, WebhookRegistrationResult, WebhookSubscription,
    WebhookTopic,
};

const API_SECRET: &str = "test-api-secret";
const SHOP: &str = "test-shop.myshopify.com";
const GRAPHQL_PATH: &str = "/admin/api/2025-10/graphql.json";

fn build_app(api_host: &str) -> ShopifyApp<MemorySessionStorage> {
    ShopifyApp::new(
        AppConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new(API_SECRET).unwrap())
            .app_url("https://my-app.example.com")
            .api_version("2025-10".parse().unwrap())
            .webhook(WebhookSubscription::new(
                WebhookTopic::AppUninstalled,
                "/webhooks",
            ))
            .api_host(api_host)
            .session_storage(MemorySessionStorage::new())
            .build()
            .unwrap(),
    )
}

fn offline_session() -> Session {
    let shop = ShopDomain::new(SHOP).unwrap();
    Session::new(
        Session::offline_id(&shop),
        shop,
        "access-token".to_string(),
        "read_products".parse().unwrap(),
        false,
        None,
    )
}

fn delivery_request(body: &[u8], secret: &str, topic: &str) -> AppRequest {
    AppRequest::builder(HttpMethod::Post, "/webhooks")
        .header(HEADER_HMAC, compute_signature_base64(body, secret))
        .header(HEADER_TOPIC, topic)
        .header(HEADER_SHOP_DOMAIN, SHOP)
        .header(HEADER_WEBHOOK_ID, "delivery-1")
        .body(body.to_vec())
        .build()
}

#[tokio::test]
async fn test_register_creates_missing_subscription() {
    let server = MockServer::start().await;

    // No existing subscription for the topic
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AppWebhookSubscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "webhookSubscriptions": { "edges": [] } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AppWebhookSubscriptionCreate"))
        .and(body_string_contains("APP_UNINSTALLED"))
        .and(body_string_contains("https://my-app.example.com/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "webhookSubscriptionCreate": {
                    "webhookSubscription": { "id": "gid://shopify/WebhookSubscription/1" },
                    "userErrors": []
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = build_app(&server.uri());
    let results = app.register_webhooks(&offline_session()).await;

    assert_eq!(results.len(), 1);
    match &results[0] {
        WebhookRegistrationResult::Created { topic, id } => {
            assert_eq!(*topic, WebhookTopic::AppUninstalled);
            assert_eq!(id, "gid://shopify/WebhookSubscription/1");
        }
        other => panic!("expected Created, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_leaves_matching_subscription_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AppWebhookSubscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "webhookSubscriptions": {
                    "edges": [{
                        "node": {
                            "id": "gid://shopify/WebhookSubscription/7",
                            "endpoint": {
                                "__typename": "WebhookHttpEndpoint",
                                "callbackUrl": "https://my-app.example.com/webhooks"
                            }
                        }
                    }]
                }
            }
        })))
        .mount(&server)
        .await;

    let app = build_app(&server.uri());
    let results = app.register_webhooks(&offline_session()).await;

    match &results[0] {
        WebhookRegistrationResult::Unchanged { id, .. } => {
            assert_eq!(id, "gid://shopify/WebhookSubscription/7");
        }
        other => panic!("expected Unchanged, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_updates_subscription_with_stale_callback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AppWebhookSubscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "webhookSubscriptions": {
                    "edges": [{
                        "node": {
                            "id": "gid://shopify/WebhookSubscription/7",
                            "endpoint": {
                                "__typename": "WebhookHttpEndpoint",
                                "callbackUrl": "https://old-host.example.com/webhooks"
                            }
                        }
                    }]
                }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AppWebhookSubscriptionUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "webhookSubscriptionUpdate": {
                    "webhookSubscription": { "id": "gid://shopify/WebhookSubscription/7" },
                    "userErrors": []
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = build_app(&server.uri());
    let results = app.register_webhooks(&offline_session()).await;
    assert!(matches!(
        results[0],
        WebhookRegistrationResult::Updated { .. }
    ));
}

#[tokio::test]
async fn test_register_surfaces_user_errors_as_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AppWebhookSubscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "webhookSubscriptions": { "edges": [] } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AppWebhookSubscriptionCreate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "webhookSubscriptionCreate": {
                    "webhookSubscription": null,
                    "userErrors": [{ "field": "callbackUrl", "message": "is invalid" }]
                }
            }
        })))
        .mount(&server)
        .await;

    let app = build_app(&server.uri());
    let results = app.register_webhooks(&offline_session()).await;
    assert!(!results[0].is_success());
}

#[tokio::test]
async fn test_delivery_authentication_end_to_end() {
    let server = MockServer::start().await;
    let app = build_app(&server.uri());

    // Store the shop's offline session so the delivery gets an admin handle
    app.session_storage()
        .store_session(offline_session())
        .await
        .unwrap();

    let body = br#"{"id": 123, "domain": "test-shop.myshopify.com"}"#;
    let request = delivery_request(body, API_SECRET, "app/uninstalled");

    let auth = app.authenticate_webhook(&request).await.unwrap();
    assert_eq!(auth.context().topic(), Some(WebhookTopic::AppUninstalled));
    assert_eq!(auth.context().shop_domain(), Some(SHOP));
    assert_eq!(auth.payload()["id"], 123);
    assert!(auth.session().is_some());
    assert!(auth.admin().is_some());
}

#[tokio::test]
async fn test_delivery_with_wrong_signature_is_rejected() {
    let server = MockServer::start().await;
    let app = build_app(&server.uri());

    let request = delivery_request(br#"{}"#, "wrong-secret", "orders/create");
    assert!(app.authenticate_webhook(&request).await.is_err());
}

#[tokio::test]
async fn test_mandatory_privacy_topic_verifies_without_session() {
    let server = MockServer::start().await;
    let app = build_app(&server.uri());

    let body = br#"{"shop_domain": "test-shop.myshopify.com"}"#;
    let request = delivery_request(body, API_SECRET, "customers/data_request");

    let auth = app.authenticate_webhook(&request).await.unwrap();
    let topic = auth.context().topic().unwrap();
    assert!(topic.is_mandatory());
    assert!(auth.session().is_none());
}
