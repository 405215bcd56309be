//! Webhook subscription declaration types.

use crate::webhooks::{WebhookError, WebhookTopic};

/// A declared webhook subscription.
///
/// Subscriptions are declared in the app configuration and synced with the
/// platform after each shop authenticates. The `path` is joined with the
/// app URL to form the delivery callback URL.
///
/// # Example
///
/// ```rust
/// use shopify_app::{WebhookSubscription, WebhookTopic};
///
/// let subscription = WebhookSubscription::builder(
///     WebhookTopic::OrdersCreate,
///     "/webhooks/orders/create",
/// )
/// .include_fields(vec!["id".to_string(), "email".to_string()])
/// .filter("status:active")
/// .build();
///
/// assert_eq!(subscription.topic, WebhookTopic::OrdersCreate);
/// assert_eq!(subscription.path, "/webhooks/orders/create");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookSubscription {
    /// The topic to subscribe to.
    pub topic: WebhookTopic,

    /// The path portion of the delivery callback URL.
    pub path: String,

    /// Restricts the payload to these fields, when set.
    pub include_fields: Option<Vec<String>>,

    /// Server-side filter for which events are delivered (e.g.
    /// `"status:active"`), when set.
    pub filter: Option<String>,
}

impl WebhookSubscription {
    /// Creates a builder for a subscription on `topic`, delivered to `path`.
    #[must_use]
    pub fn builder(topic: WebhookTopic, path: impl Into<String>) -> WebhookSubscriptionBuilder {
        WebhookSubscriptionBuilder {
            topic,
            path: path.into(),
            include_fields: None,
            filter: None,
        }
    }

    /// Creates a plain subscription with no payload restrictions.
    #[must_use]
    pub fn new(topic: WebhookTopic, path: impl Into<String>) -> Self {
        Self::builder(topic, path).build()
    }
}

/// Builder for [`WebhookSubscription`] instances.
#[derive(Debug)]
pub struct WebhookSubscriptionBuilder {
    topic: WebhookTopic,
    path: String,
    include_fields: Option<Vec<String>>,
    filter: Option<String>,
}

impl WebhookSubscriptionBuilder {
    /// Restricts the delivered payload to the given fields.
    #[must_use]
    pub fn include_fields(mut self, fields: Vec<String>) -> Self {
        self.include_fields = Some(fields);
        self
    }

    /// Sets a server-side event filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Builds the subscription.
    #[must_use]
    pub fn build(self) -> WebhookSubscription {
        WebhookSubscription {
            topic: self.topic,
            path: self.path,
            include_fields: self.include_fields,
            filter: self.filter,
        }
    }
}

/// Outcome of syncing one subscription with the platform.
#[derive(Debug)]
pub enum WebhookRegistrationResult {
    /// A new subscription was created.
    Created {
        /// The topic that was synced.
        topic: WebhookTopic,
        /// The platform's subscription ID.
        id: String,
    },
    /// An existing subscription was updated to the declared configuration.
    Updated {
        /// The topic that was synced.
        topic: WebhookTopic,
        /// The platform's subscription ID.
        id: String,
    },
    /// The existing subscription already matches the declaration.
    Unchanged {
        /// The topic that was synced.
        topic: WebhookTopic,
        /// The platform's subscription ID.
        id: String,
    },
    /// The sync failed for this topic.
    Failed {
        /// The topic that failed.
        topic: WebhookTopic,
        /// The failure.
        error: WebhookError,
    },
}

impl WebhookRegistrationResult {
    /// Returns the topic this result is for.
    #[must_use]
    pub const fn topic(&self) -> WebhookTopic {
        match self {
            Self::Created { topic, .. }
            | Self::Updated { topic, .. }
            | Self::Unchanged { topic, .. }
            | Self::Failed { topic, .. } => *topic,
        }
    }

    /// Returns `true` unless the sync failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}
