//! The OAuth core: authorization code grant and token exchange.
//!
//! Two ways of obtaining an access token, sharing the same validation
//! primitives:
//!
//! - **Authorization code grant**: the redirect flow used at install time
//!   and by non-embedded apps: [`begin_auth`] produces the authorization
//!   URL and CSRF state, [`validate_auth_callback`] validates the callback
//!   (HMAC, state, shop) and exchanges the code.
//! - **Token exchange**: embedded apps trade an App Bridge session token
//!   for an access token without leaving the admin:
//!   [`exchange_online_token`] / [`exchange_offline_token`].
//!
//! # Security
//!
//! - Callback HMACs are verified with constant-time comparison
//! - The state parameter guards against CSRF
//! - Session tokens are validated (signature, expiry, audience) before use
//! - A configured old API secret key is tried as a fallback everywhere,
//!   so key rotation does not break in-flight flows

mod auth_query;
mod begin_auth;
mod error;
pub mod hmac;
mod jwt_payload;
mod state;
mod token_exchange;
mod validate_callback;

pub use auth_query::AuthQuery;
pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::OAuthError;
pub use hmac::{compute_signature, compute_signature_base64, constant_time_compare};
pub use jwt_payload::JwtPayload;
pub use state::StateParam;
pub use token_exchange::{exchange_offline_token, exchange_online_token};
pub use validate_callback::validate_auth_callback;
