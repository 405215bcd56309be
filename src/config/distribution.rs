//! App distribution modes.

/// How the app is distributed to merchants.
///
/// The distribution determines which authentication surfaces the app exposes.
/// Apps distributed through the Shopify admin (custom store apps) are
/// installed directly by the merchant, never go through the OAuth redirect
/// flow, and have no merchant-facing login form.
///
/// # Example
///
/// ```rust
/// use shopify_app::AppDistribution;
///
/// let distribution = AppDistribution::default();
/// assert_eq!(distribution, AppDistribution::AppStore);
/// assert!(distribution.can_use_login_form());
///
/// assert!(!AppDistribution::ShopifyAdmin.can_use_login_form());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppDistribution {
    /// Distributed through the Shopify App Store.
    #[default]
    AppStore,
    /// Distributed directly to a single merchant.
    SingleMerchant,
    /// Installed through the Shopify admin (custom store app).
    ShopifyAdmin,
}

impl AppDistribution {
    /// Returns `true` if apps with this distribution expose a merchant-facing
    /// login form.
    #[must_use]
    pub const fn can_use_login_form(self) -> bool {
        !matches!(self, Self::ShopifyAdmin)
    }

    /// Returns `true` if this distribution is a custom store app.
    ///
    /// Custom store apps use admin-issued tokens rather than the OAuth
    /// redirect flow.
    #[must_use]
    pub const fn is_custom_store_app(self) -> bool {
        matches!(self, Self::ShopifyAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_distribution_is_app_store() {
        assert_eq!(AppDistribution::default(), AppDistribution::AppStore);
    }

    #[test]
    fn test_login_form_availability() {
        assert!(AppDistribution::AppStore.can_use_login_form());
        assert!(AppDistribution::SingleMerchant.can_use_login_form());
        assert!(!AppDistribution::ShopifyAdmin.can_use_login_form());
    }

    #[test]
    fn test_custom_store_app_detection() {
        assert!(AppDistribution::ShopifyAdmin.is_custom_store_app());
        assert!(!AppDistribution::AppStore.is_custom_store_app());
        assert!(!AppDistribution::SingleMerchant.is_custom_store_app());
    }
}
