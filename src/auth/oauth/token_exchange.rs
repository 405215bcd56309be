//! OAuth 2.0 Token Exchange (RFC 8693) for embedded apps.
//!
//! Embedded apps receive a session token (JWT) from App Bridge on every
//! load. Token exchange trades that session token for an access token
//! without any redirect, which is how embedded apps install and repair
//! sessions in place:
//!
//! - [`exchange_online_token`]: user-specific token, expires, carries user info
//! - [`exchange_offline_token`]: app-level token, does not expire
//!
//! Shopify-specific token types on top of RFC 8693:
//!
//! - Grant type: `urn:ietf:params:oauth:grant-type:token-exchange`
//! - Subject token type: `urn:ietf:params:oauth:token-type:id_token`
//! - Requested token types:
//!   `urn:shopify:params:oauth:token-type:online-access-token` /
//!   `urn:shopify:params:oauth:token-type:offline-access-token`

use crate::auth::oauth::jwt_payload::JwtPayload;
use crate::auth::oauth::OAuthError;
use crate::auth::session::AccessTokenResponse;
use crate::auth::Session;
use crate::config::{ApiConfig, ShopDomain};
use serde::Serialize;

const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
const ID_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:id_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestedTokenType {
    Online,
    Offline,
}

impl RequestedTokenType {
    const fn as_urn(self) -> &'static str {
        match self {
            Self::Online => "urn:shopify:params:oauth:token-type:online-access-token",
            Self::Offline => "urn:shopify:params:oauth:token-type:offline-access-token",
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    subject_token: &'a str,
    subject_token_type: &'a str,
    requested_token_type: &'a str,
}

/// Exchanges a session token for an online (user-specific) access token.
///
/// The resulting session expires and carries the authorizing user's
/// information.
///
/// # Errors
///
/// - [`OAuthError::NotEmbeddedApp`] if the config is not for an embedded app
/// - [`OAuthError::InvalidJwt`] if the session token fails validation
/// - [`OAuthError::TokenExchangeFailed`] if the token endpoint rejects the
///   request or cannot be reached
pub async fn exchange_online_token(
    config: &ApiConfig,
    shop: &ShopDomain,
    session_token: &str,
) -> Result<Session, OAuthError> {
    exchange_token(config, shop, session_token, RequestedTokenType::Online).await
}

/// Exchanges a session token for an offline (app-level) access token.
///
/// The resulting session does not expire and is suitable for background
/// work and webhook processing.
///
/// # Errors
///
/// Same failure modes as [`exchange_online_token`].
pub async fn exchange_offline_token(
    config: &ApiConfig,
    shop: &ShopDomain,
    session_token: &str,
) -> Result<Session, OAuthError> {
    exchange_token(config, shop, session_token, RequestedTokenType::Offline).await
}

async fn exchange_token(
    config: &ApiConfig,
    shop: &ShopDomain,
    session_token: &str,
    requested: RequestedTokenType,
) -> Result<Session, OAuthError> {
    if !config.is_embedded() {
        return Err(OAuthError::NotEmbeddedApp);
    }

    // Validate the session token before sending it anywhere
    JwtPayload::decode(session_token, config)?;

    let token_url = format!("{}/admin/oauth/access_token", config.api_origin(shop));
    let request_body = TokenExchangeRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        grant_type: TOKEN_EXCHANGE_GRANT_TYPE,
        subject_token: session_token,
        subject_token_type: ID_TOKEN_TYPE,
        requested_token_type: requested.as_urn(),
    };

    let client = reqwest::Client::new();
    let response = client
        .post(&token_url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| OAuthError::TokenExchangeFailed {
            status: 0,
            message: format!("Network error: {e}"),
        })?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        tracing::debug!(shop = shop.as_ref(), status, "token exchange rejected");
        return Err(OAuthError::TokenExchangeFailed {
            status,
            message: error_body,
        });
    }

    let token_response: AccessTokenResponse =
        response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status,
                message: format!("Failed to parse token response: {e}"),
            })?;

    Ok(Session::from_access_token_response(
        shop.clone(),
        &token_response,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, AppConfig};
    use crate::storage::MemorySessionStorage;

    fn standalone_config() -> ApiConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .app_url("https://app.example.com")
            .is_embedded(false)
            .session_storage(MemorySessionStorage::new())
            .build()
            .unwrap()
            .api()
            .clone()
    }

    #[tokio::test]
    async fn test_exchange_rejects_non_embedded_apps() {
        let config = standalone_config();
        let shop = ShopDomain::new("test-shop").unwrap();

        let result = exchange_offline_token(&config, &shop, "any-token").await;
        assert!(matches!(result, Err(OAuthError::NotEmbeddedApp)));
    }

    #[tokio::test]
    async fn test_exchange_rejects_garbage_session_token() {
        let config = AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .app_url("https://app.example.com")
            .session_storage(MemorySessionStorage::new())
            .build()
            .unwrap()
            .api()
            .clone();
        let shop = ShopDomain::new("test-shop").unwrap();

        let result = exchange_online_token(&config, &shop, "not-a-jwt").await;
        assert!(matches!(result, Err(OAuthError::InvalidJwt { .. })));
    }

    #[test]
    fn test_requested_token_type_urns() {
        assert_eq!(
            RequestedTokenType::Online.as_urn(),
            "urn:shopify:params:oauth:token-type:online-access-token"
        );
        assert_eq!(
            RequestedTokenType::Offline.as_urn(),
            "urn:shopify:params:oauth:token-type:offline-access-token"
        );
    }
}
