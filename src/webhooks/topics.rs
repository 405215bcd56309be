//! Webhook topic definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A webhook topic that triggers notifications.
///
/// Topics serialize to the `resource/event` strings used in webhook headers
/// and subscription APIs.
///
/// # Example
///
/// ```rust
/// use shopify_app::WebhookTopic;
///
/// let topic = WebhookTopic::OrdersCreate;
/// assert_eq!(serde_json::to_string(&topic).unwrap(), "\"orders/create\"");
/// assert_eq!(topic.to_graphql(), "ORDERS_CREATE");
/// assert!(!topic.is_mandatory());
/// assert!(WebhookTopic::CustomersDataRequest.is_mandatory());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookTopic {
    /// Triggered when the app is uninstalled from a shop.
    #[serde(rename = "app/uninstalled")]
    AppUninstalled,
    /// Triggered when the app's granted scopes change.
    #[serde(rename = "app/scopes_update")]
    AppScopesUpdate,

    // Order topics
    /// Triggered when an order is created.
    #[serde(rename = "orders/create")]
    OrdersCreate,
    /// Triggered when an order is updated.
    #[serde(rename = "orders/updated")]
    OrdersUpdated,
    /// Triggered when an order is paid.
    #[serde(rename = "orders/paid")]
    OrdersPaid,
    /// Triggered when an order is cancelled.
    #[serde(rename = "orders/cancelled")]
    OrdersCancelled,
    /// Triggered when an order is fulfilled.
    #[serde(rename = "orders/fulfilled")]
    OrdersFulfilled,
    /// Triggered when an order is deleted.
    #[serde(rename = "orders/delete")]
    OrdersDelete,

    // Product topics
    /// Triggered when a product is created.
    #[serde(rename = "products/create")]
    ProductsCreate,
    /// Triggered when a product is updated.
    #[serde(rename = "products/update")]
    ProductsUpdate,
    /// Triggered when a product is deleted.
    #[serde(rename = "products/delete")]
    ProductsDelete,

    // Customer topics
    /// Triggered when a customer is created.
    #[serde(rename = "customers/create")]
    CustomersCreate,
    /// Triggered when a customer is updated.
    #[serde(rename = "customers/update")]
    CustomersUpdate,
    /// Triggered when a customer is deleted.
    #[serde(rename = "customers/delete")]
    CustomersDelete,

    // Mandatory privacy topics. Every published app must handle these;
    // they are configured in the Partner Dashboard, not registered over
    // the API.
    /// A customer requested their data.
    #[serde(rename = "customers/data_request")]
    CustomersDataRequest,
    /// A customer requested deletion of their data.
    #[serde(rename = "customers/redact")]
    CustomersRedact,
    /// A shop requested deletion of its data.
    #[serde(rename = "shop/redact")]
    ShopRedact,
}

impl WebhookTopic {
    /// Parses a `resource/event` topic string.
    ///
    /// Returns `None` for topics this crate has no variant for.
    #[must_use]
    pub fn parse(topic: &str) -> Option<Self> {
        // The serde rename attributes are the single source of the
        // string forms
        serde_json::from_value(serde_json::Value::String(topic.to_string())).ok()
    }

    /// Returns the `resource/event` string form of the topic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AppUninstalled => "app/uninstalled",
            Self::AppScopesUpdate => "app/scopes_update",
            Self::OrdersCreate => "orders/create",
            Self::OrdersUpdated => "orders/updated",
            Self::OrdersPaid => "orders/paid",
            Self::OrdersCancelled => "orders/cancelled",
            Self::OrdersFulfilled => "orders/fulfilled",
            Self::OrdersDelete => "orders/delete",
            Self::ProductsCreate => "products/create",
            Self::ProductsUpdate => "products/update",
            Self::ProductsDelete => "products/delete",
            Self::CustomersCreate => "customers/create",
            Self::CustomersUpdate => "customers/update",
            Self::CustomersDelete => "customers/delete",
            Self::CustomersDataRequest => "customers/data_request",
            Self::CustomersRedact => "customers/redact",
            Self::ShopRedact => "shop/redact",
        }
    }

    /// Returns the GraphQL enum form of the topic (e.g. `ORDERS_CREATE`).
    #[must_use]
    pub fn to_graphql(self) -> String {
        self.as_str()
            .chars()
            .map(|c| match c {
                '/' | '.' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }

    /// Returns `true` for the mandatory privacy topics every app must
    /// accept deliveries for.
    #[must_use]
    pub const fn is_mandatory(self) -> bool {
        matches!(
            self,
            Self::CustomersDataRequest | Self::CustomersRedact | Self::ShopRedact
        )
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
