//! The query parameters carried by an OAuth callback.

use std::collections::BTreeMap;

/// The query parameters of an OAuth callback request.
///
/// Shopify redirects back to the app's callback URL with an authorization
/// `code`, the `shop` domain, a `timestamp`, the CSRF `state`, a base64
/// `host` handle for the embedded admin, and an `hmac` signature computed
/// over every other parameter.
///
/// Unknown parameters are retained so the signable string reproduces the
/// exact query Shopify signed.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::AuthQuery;
///
/// let query = AuthQuery::from_pairs(vec![
///     ("code".to_string(), "auth-code".to_string()),
///     ("shop".to_string(), "my-store.myshopify.com".to_string()),
///     ("state".to_string(), "nonce".to_string()),
///     ("timestamp".to_string(), "1700000000".to_string()),
///     ("hmac".to_string(), "signature".to_string()),
/// ])
/// .unwrap();
///
/// assert_eq!(query.code(), "auth-code");
/// assert_eq!(
///     query.to_signable_string(),
///     "code=auth-code&shop=my-store.myshopify.com&state=nonce&timestamp=1700000000"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthQuery {
    code: String,
    shop: String,
    timestamp: String,
    state: String,
    host: Option<String>,
    hmac: String,
    extra: BTreeMap<String, String>,
}

impl AuthQuery {
    /// Creates an auth query from its individual parameters.
    #[must_use]
    pub const fn new(
        code: String,
        shop: String,
        timestamp: String,
        state: String,
        host: Option<String>,
        hmac: String,
    ) -> Self {
        Self {
            code,
            shop,
            timestamp,
            state,
            host,
            hmac,
            extra: BTreeMap::new(),
        }
    }

    /// Builds an auth query from decoded query string pairs.
    ///
    /// Returns `None` when the `code`, `shop`, or `state` parameters are
    /// missing: a callback without them cannot be completed.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Option<Self> {
        let mut code = None;
        let mut shop = None;
        let mut timestamp = None;
        let mut state = None;
        let mut host = None;
        let mut hmac = None;
        let mut extra = BTreeMap::new();

        for (name, value) in pairs {
            match name.as_str() {
                "code" => code = Some(value),
                "shop" => shop = Some(value),
                "timestamp" => timestamp = Some(value),
                "state" => state = Some(value),
                "host" => host = Some(value),
                "hmac" => hmac = Some(value),
                _ => {
                    extra.insert(name, value);
                }
            }
        }

        Some(Self {
            code: code?,
            shop: shop?,
            timestamp: timestamp.unwrap_or_default(),
            state: state?,
            host,
            hmac: hmac.unwrap_or_default(),
            extra,
        })
    }

    /// The authorization code to exchange for an access token.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The shop domain the authorization is for.
    #[must_use]
    pub fn shop(&self) -> &str {
        &self.shop
    }

    /// The CSRF state parameter.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// The base64 host handle for redirecting into the embedded admin.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The received HMAC signature.
    #[must_use]
    pub fn hmac(&self) -> &str {
        &self.hmac
    }

    pub(crate) fn set_hmac(&mut self, hmac: String) {
        self.hmac = hmac;
    }

    /// Returns the string the HMAC signature is computed over.
    ///
    /// Every parameter except `hmac`, sorted by name, joined as
    /// `name=value` pairs with `&`.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        let mut params: BTreeMap<&str, &str> = BTreeMap::new();
        params.insert("code", &self.code);
        params.insert("shop", &self.shop);
        if !self.timestamp.is_empty() {
            params.insert("timestamp", &self.timestamp);
        }
        params.insert("state", &self.state);
        if let Some(host) = &self.host {
            params.insert("host", host);
        }
        for (name, value) in &self.extra {
            params.insert(name, value);
        }

        params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_requires_code_shop_and_state() {
        let missing_code = AuthQuery::from_pairs(vec![
            ("shop".to_string(), "s.myshopify.com".to_string()),
            ("state".to_string(), "n".to_string()),
        ]);
        assert!(missing_code.is_none());

        let missing_state = AuthQuery::from_pairs(vec![
            ("code".to_string(), "c".to_string()),
            ("shop".to_string(), "s.myshopify.com".to_string()),
        ]);
        assert!(missing_state.is_none());
    }

    #[test]
    fn test_signable_string_sorts_parameters() {
        let query = AuthQuery::new(
            "the-code".to_string(),
            "shop.myshopify.com".to_string(),
            "1700000000".to_string(),
            "the-state".to_string(),
            Some("aG9zdA".to_string()),
            "sig".to_string(),
        );

        assert_eq!(
            query.to_signable_string(),
            "code=the-code&host=aG9zdA&shop=shop.myshopify.com&state=the-state&timestamp=1700000000"
        );
    }

    #[test]
    fn test_signable_string_excludes_hmac_and_keeps_unknown_params() {
        let query = AuthQuery::from_pairs(vec![
            ("code".to_string(), "c".to_string()),
            ("shop".to_string(), "s.myshopify.com".to_string()),
            ("state".to_string(), "n".to_string()),
            ("timestamp".to_string(), "1".to_string()),
            ("hmac".to_string(), "sig".to_string()),
            ("locale".to_string(), "en".to_string()),
        ])
        .unwrap();

        let signable = query.to_signable_string();
        assert!(!signable.contains("hmac"));
        assert!(signable.contains("locale=en"));
    }

    #[test]
    fn test_signable_string_omits_absent_optional_params() {
        let query = AuthQuery::new(
            "c".to_string(),
            "s.myshopify.com".to_string(),
            String::new(),
            "n".to_string(),
            None,
            String::new(),
        );

        assert_eq!(query.to_signable_string(), "code=c&shop=s.myshopify.com&state=n");
    }
}
