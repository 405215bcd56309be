//! The merchant-facing login handler.
//!
//! Apps distributed through the App Store or to a single merchant expose a
//! login form where a merchant enters their shop to start installation.
//! This handler takes the submitted `shop` value (from the query string or
//! a form body), sanitizes it, and redirects into the OAuth entry point.
//! Custom store apps never expose this surface.

use thiserror::Error;

use crate::app::request::{AppRequest, AppResponse};
use crate::config::{ApiConfig, ShopDomain};

/// Errors the login handler reports back to the form.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    /// No `shop` value was submitted.
    #[error("A shop is required to log in")]
    MissingShop,

    /// The submitted value is not a valid shop.
    #[error("The shop provided is not a valid Shopify shop domain")]
    InvalidShop,
}

/// Handles a login form submission.
///
/// Reads `shop` from the query string or, for POSTs, the urlencoded form
/// body. On success returns a redirect into the OAuth entry point for that
/// shop; the form re-renders the error otherwise.
///
/// # Errors
///
/// - [`LoginError::MissingShop`] when no shop was submitted
/// - [`LoginError::InvalidShop`] when the value cannot be normalized into a
///   shop domain
pub fn login(config: &ApiConfig, request: &AppRequest) -> Result<AppResponse, LoginError> {
    let submitted = request.query_param("shop").or_else(|| {
        request
            .form_pairs()
            .into_iter()
            .find(|(name, _)| name == "shop")
            .map(|(_, value)| value)
    });

    let raw = submitted.ok_or(LoginError::MissingShop)?;
    if raw.trim().is_empty() {
        return Err(LoginError::MissingShop);
    }

    let shop = ShopDomain::sanitize(&raw).ok_or(LoginError::InvalidShop)?;

    tracing::debug!(shop = shop.as_ref(), "login redirecting into OAuth");

    Ok(AppResponse::redirect(format!(
        "{}?shop={}",
        config.auth().path(),
        shop.as_ref()
    )))
}
