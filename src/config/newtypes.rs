//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Shopify API key.
///
/// This newtype ensures the API key is non-empty and provides type safety
/// to prevent accidental misuse of raw strings.
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Shopify API secret key.
///
/// This newtype ensures the secret key is non-empty and masks its value
/// in debug output to prevent accidental exposure in logs.
///
/// # Security
///
/// The `Debug` implementation masks the secret value, displaying only
/// `ApiSecretKey(*****)` instead of the actual key.
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated Shopify shop domain.
///
/// This newtype validates and normalizes shop domains to the full
/// `shop.myshopify.com` format.
///
/// # Accepted Formats
///
/// - `shop-name` - normalized to `shop-name.myshopify.com`
/// - `shop-name.myshopify.com` - used as-is
///
/// # Serialization
///
/// `ShopDomain` serializes to and deserializes from the full domain string:
///
/// ```rust
/// use shopify_app::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// let json = serde_json::to_string(&domain).unwrap();
/// assert_eq!(json, r#""my-store.myshopify.com""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is invalid.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into();
        let domain = domain.trim().to_lowercase();

        if domain.is_empty() {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        let (shop_name, full_domain) = if let Some(shop_name) = domain.strip_suffix(Self::SUFFIX) {
            (shop_name.to_string(), domain)
        } else if domain.contains('.') {
            // Contains a dot but not the myshopify.com suffix
            return Err(ConfigError::InvalidShopDomain { domain });
        } else {
            (domain.clone(), format!("{}{}", domain, Self::SUFFIX))
        };

        if !Self::is_valid_shop_name(&shop_name) {
            return Err(ConfigError::InvalidShopDomain {
                domain: full_domain,
            });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain,
        })
    }

    /// Sanitizes a user-provided shop value into a validated domain.
    ///
    /// Login forms and query parameters arrive in several shapes. This
    /// accepts, in addition to the formats [`ShopDomain::new`] takes:
    ///
    /// - `https://shop-name.myshopify.com` or `http://...` - scheme stripped
    /// - `shop-name.myshopify.com/` - trailing slashes stripped
    /// - `admin.shopify.com/store/shop-name` - unified admin URL form
    ///
    /// Returns `None` for values that cannot be normalized into a valid
    /// shop domain.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shopify_app::ShopDomain;
    ///
    /// let shop = ShopDomain::sanitize("https://my-store.myshopify.com/").unwrap();
    /// assert_eq!(shop.as_ref(), "my-store.myshopify.com");
    ///
    /// let shop = ShopDomain::sanitize("admin.shopify.com/store/my-store").unwrap();
    /// assert_eq!(shop.as_ref(), "my-store.myshopify.com");
    ///
    /// assert!(ShopDomain::sanitize("https://example.com").is_none());
    /// ```
    #[must_use]
    pub fn sanitize(value: &str) -> Option<Self> {
        let mut value = value.trim();
        for scheme in ["https://", "http://"] {
            if let Some(rest) = value.strip_prefix(scheme) {
                value = rest;
                break;
            }
        }
        let value = value.trim_end_matches('/');

        // Unified admin URLs name the store without the myshopify suffix
        if let Some(store) = value.strip_prefix("admin.shopify.com/store/") {
            return Self::new(store).ok();
        }

        Self::new(value).ok()
    }

    /// Returns the shop name portion of the domain.
    ///
    /// For `my-store.myshopify.com`, this returns `my-store`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    fn is_valid_shop_name(name: &str) -> bool {
        if name.is_empty() {
            return false;
        }

        // Shop names can contain lowercase letters, numbers, and hyphens,
        // and cannot start or end with a hyphen
        if name.starts_with('-') || name.ends_with('-') {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// The validated URL the application is served from.
///
/// The URL is reduced to its origin (scheme, host, optional port); any path,
/// query, or fragment is dropped. The origin is what OAuth redirect URIs and
/// webhook callback URLs are built from.
///
/// # Example
///
/// ```rust
/// use shopify_app::AppUrl;
///
/// let url = AppUrl::new("https://my-app.example.com/ignored/path").unwrap();
/// assert_eq!(url.as_ref(), "https://my-app.example.com");
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), "my-app.example.com");
/// assert_eq!(url.port(), None);
///
/// let url = AppUrl::new("http://localhost:3000").unwrap();
/// assert_eq!(url.host(), "localhost:3000");
/// assert_eq!(url.port(), Some(3000));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppUrl {
    origin: String,
    scheme: String,
    host_name: String,
    port: Option<u16>,
}

impl AppUrl {
    /// Creates a new validated application URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAppUrl`] if the URL has no scheme, an
    /// empty host, or an unparseable port.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim();

        let invalid = || ConfigError::InvalidAppUrl {
            url: url.to_string(),
        };

        let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        // Authority ends at the first path, query, or fragment delimiter
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        if authority.is_empty() {
            return Err(invalid());
        }

        let (host_name, port) = match authority.split_once(':') {
            Some((host, port_str)) => {
                let port: u16 = port_str.parse().map_err(|_| invalid())?;
                (host, Some(port))
            }
            None => (authority, None),
        };
        if host_name.is_empty() {
            return Err(invalid());
        }

        let scheme = scheme.to_lowercase();
        let host_name = host_name.to_lowercase();
        let origin = match port {
            Some(port) => format!("{scheme}://{host_name}:{port}"),
            None => format!("{scheme}://{host_name}"),
        };

        Ok(Self {
            origin,
            scheme,
            host_name,
            port,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the host including the port when one is present.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.origin[self.scheme.len() + 3..]
    }

    /// Returns the host name without the port.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Returns the explicit port, if one was given.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns a copy of this URL with the given port.
    #[must_use]
    pub fn with_port(&self, port: u16) -> Self {
        Self {
            origin: format!("{}://{}:{}", self.scheme, self.host_name, port),
            scheme: self.scheme.clone(),
            host_name: self.host_name.clone(),
            port: Some(port),
        }
    }
}

impl AsRef<str> for AppUrl {
    fn as_ref(&self) -> &str {
        &self.origin
    }
}

impl fmt::Display for AppUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.origin)
    }
}
