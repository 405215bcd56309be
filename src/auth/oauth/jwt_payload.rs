//! Session token (JWT) handling for embedded apps.
//!
//! When an embedded app loads in the Shopify admin, App Bridge provides a
//! session token identifying the shop and user. This module decodes and
//! validates those tokens before they are trusted or exchanged for an
//! access token.
//!
//! # Claims
//!
//! - `iss`: issuer, the shop's admin URL (e.g. `https://shop.myshopify.com/admin`)
//! - `dest`: the shop origin (e.g. `https://shop.myshopify.com`)
//! - `aud`: the app's API key
//! - `sub`: the user ID, when present
//! - `exp` / `nbf` / `iat`: time-based claims, validated with 10 s leeway
//! - `jti`: unique token ID
//! - `sid`: the admin session ID, when present

use crate::auth::oauth::OAuthError;
use crate::config::{ApiConfig, ShopDomain};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Leeway for time-based claims, in seconds.
const JWT_LEEWAY_SECS: u64 = 10;

/// The decoded claims of an App Bridge session token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JwtPayload {
    /// Issuer - the shop's admin URL.
    pub iss: String,
    /// Destination - the shop origin.
    pub dest: String,
    /// Audience - the app's API key.
    pub aud: String,
    /// Subject - the user ID, for tokens issued in a user context.
    pub sub: Option<String>,
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
    /// Not-before timestamp (Unix seconds).
    pub nbf: i64,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
    /// The Shopify admin session ID, when present.
    pub sid: Option<String>,
}

impl JwtPayload {
    /// Decodes and validates a session token.
    ///
    /// Validation checks the HS256 signature (primary API secret key with
    /// old-key fallback for rotation), the time-based claims with 10 s
    /// leeway, and that the audience matches the app's API key.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidJwt`] when the token cannot be decoded
    /// or any claim fails validation.
    pub fn decode(token: &str, config: &ApiConfig) -> Result<Self, OAuthError> {
        let payload = match Self::decode_with_key(token, config.api_secret_key().as_ref()) {
            Ok(payload) => payload,
            Err(primary_err) => match config.old_api_secret_key() {
                Some(old_key) => Self::decode_with_key(token, old_key.as_ref())
                    .map_err(|_| primary_err)?,
                None => return Err(primary_err),
            },
        };

        if payload.aud != config.api_key().as_ref() {
            return Err(OAuthError::InvalidJwt {
                reason: "audience does not match the app's API key".to_string(),
            });
        }

        Ok(payload)
    }

    fn decode_with_key(token: &str, secret: &str) -> Result<Self, OAuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = JWT_LEEWAY_SECS;
        validation.validate_nbf = true;
        // The audience claim is checked against the API key afterwards
        validation.validate_aud = false;

        let key = DecodingKey::from_secret(secret.as_bytes());
        decode::<Self>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| OAuthError::InvalidJwt {
                reason: e.to_string(),
            })
    }

    /// Returns the shop domain the token was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidJwt`] when the `dest` claim does not
    /// contain a valid shop domain.
    pub fn shop(&self) -> Result<ShopDomain, OAuthError> {
        let host = self
            .dest
            .strip_prefix("https://")
            .or_else(|| self.dest.strip_prefix("http://"))
            .unwrap_or(&self.dest);

        ShopDomain::new(host.trim_end_matches('/')).map_err(|_| OAuthError::InvalidJwt {
            reason: format!("invalid shop in dest claim: {}", self.dest),
        })
    }

    /// Returns the user ID from the `sub` claim, when it is numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.sub.as_deref().and_then(|sub| sub.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, AppConfig};
    use crate::storage::MemorySessionStorage;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        iss: String,
        dest: String,
        aud: String,
        sub: Option<String>,
        exp: i64,
        nbf: i64,
        iat: i64,
        jti: String,
        sid: Option<String>,
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn make_token(shop: &str, aud: &str, secret: &str, exp_offset: i64) -> String {
        let claims = TestClaims {
            iss: format!("https://{shop}/admin"),
            dest: format!("https://{shop}"),
            aud: aud.to_string(),
            sub: Some("42".to_string()),
            exp: now() + exp_offset,
            nbf: now() - 5,
            iat: now(),
            jti: "token-id".to_string(),
            sid: Some("session-id".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn config(secret: &str, old_secret: Option<&str>) -> ApiConfig {
        let mut builder = AppConfig::builder()
            .api_key(ApiKey::new("the-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new(secret).unwrap())
            .app_url("https://app.example.com");
        if let Some(old) = old_secret {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old).unwrap());
        }
        builder
            .session_storage(MemorySessionStorage::new())
            .build()
            .unwrap()
            .api()
            .clone()
    }

    #[test]
    fn test_decode_accepts_valid_token() {
        let token = make_token("test-shop.myshopify.com", "the-api-key", "secret", 300);
        let payload = JwtPayload::decode(&token, &config("secret", None)).unwrap();

        assert_eq!(payload.aud, "the-api-key");
        assert_eq!(payload.shop().unwrap().as_ref(), "test-shop.myshopify.com");
        assert_eq!(payload.user_id(), Some(42));
        assert_eq!(payload.sid.as_deref(), Some("session-id"));
    }

    #[test]
    fn test_decode_rejects_wrong_signature() {
        let token = make_token("test-shop.myshopify.com", "the-api-key", "wrong", 300);
        let result = JwtPayload::decode(&token, &config("secret", None));
        assert!(matches!(result, Err(OAuthError::InvalidJwt { .. })));
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let token = make_token("test-shop.myshopify.com", "the-api-key", "secret", -60);
        let result = JwtPayload::decode(&token, &config("secret", None));
        assert!(matches!(result, Err(OAuthError::InvalidJwt { .. })));
    }

    #[test]
    fn test_decode_rejects_wrong_audience() {
        let token = make_token("test-shop.myshopify.com", "someone-else", "secret", 300);
        let result = JwtPayload::decode(&token, &config("secret", None));
        assert!(matches!(result, Err(OAuthError::InvalidJwt { .. })));
    }

    #[test]
    fn test_decode_falls_back_to_old_secret() {
        let token = make_token("test-shop.myshopify.com", "the-api-key", "old-secret", 300);
        let payload = JwtPayload::decode(&token, &config("new-secret", Some("old-secret")));
        assert!(payload.is_ok());
    }

    #[test]
    fn test_shop_rejects_foreign_dest() {
        let payload = JwtPayload {
            iss: "https://evil.example.com/admin".to_string(),
            dest: "https://evil.example.com".to_string(),
            aud: "the-api-key".to_string(),
            sub: None,
            exp: now() + 300,
            nbf: now(),
            iat: now(),
            jti: "id".to_string(),
            sid: None,
        };
        assert!(matches!(
            payload.shop(),
            Err(OAuthError::InvalidJwt { .. })
        ));
    }

    #[test]
    fn test_user_id_requires_numeric_sub() {
        let token = make_token("test-shop.myshopify.com", "the-api-key", "secret", 300);
        let mut payload = JwtPayload::decode(&token, &config("secret", None)).unwrap();
        payload.sub = Some("not-a-number".to_string());
        assert_eq!(payload.user_id(), None);
    }
}
