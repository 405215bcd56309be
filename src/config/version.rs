//! Shopify Admin API version definitions.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Shopify Admin API version.
///
/// Shopify releases new API versions quarterly (January, April, July,
/// October). This enum provides variants for known stable versions, an
/// `Unstable` variant for development, and a `Custom` variant for versions
/// released after this crate.
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiVersion;
///
/// let version = ApiVersion::latest();
/// assert!(version.is_stable());
///
/// let version: ApiVersion = "2025-01".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2025_01);
/// assert_eq!(format!("{}", version), "2025-01");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2024-10 (October 2024)
    V2024_10,
    /// API version 2025-01 (January 2025)
    V2025_01,
    /// API version 2025-04 (April 2025)
    V2025_04,
    /// API version 2025-07 (July 2025)
    V2025_07,
    /// API version 2025-10 (October 2025)
    V2025_10,
    /// Unstable API version for development and testing.
    Unstable,
    /// Custom version string for future or unrecognized versions.
    Custom(String),
}

impl ApiVersion {
    /// Returns the latest stable API version.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2025_10
    }

    /// Returns `true` if this is a known stable version.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        !matches!(self, Self::Unstable | Self::Custom(_))
    }

    /// Returns the version string used in API paths (e.g., "2025-10").
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::V2024_10 => "2024-10",
            Self::V2025_01 => "2025-01",
            Self::V2025_04 => "2025-04",
            Self::V2025_07 => "2025-07",
            Self::V2025_10 => "2025-10",
            Self::Unstable => "unstable",
            Self::Custom(version) => version,
        }
    }

    fn is_valid_version_format(value: &str) -> bool {
        // Expected: YYYY-MM
        let bytes = value.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return false;
        }
        value[..4].chars().all(|c| c.is_ascii_digit())
            && value[5..].chars().all(|c| c.is_ascii_digit())
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2024-10" => Ok(Self::V2024_10),
            "2025-01" => Ok(Self::V2025_01),
            "2025-04" => Ok(Self::V2025_04),
            "2025-07" => Ok(Self::V2025_07),
            "2025-10" => Ok(Self::V2025_10),
            "unstable" => Ok(Self::Unstable),
            other if Self::is_valid_version_format(other) => {
                Ok(Self::Custom(other.to_string()))
            }
            other => Err(ConfigError::InvalidApiVersion {
                version: other.to_string(),
            }),
        }
    }
}
