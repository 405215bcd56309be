//! Webhook subscription registry and platform sync.
//!
//! The registry follows a two-phase pattern: subscriptions are declared
//! locally when the app is configured, then synced with the platform once a
//! session is available (after OAuth completes). Sync is conservative: the
//! existing subscription is queried first and only created or updated when
//! the declared configuration differs.

use std::collections::HashMap;

use crate::auth::Session;
use crate::clients::GraphqlClient;
use crate::config::ApiConfig;
use crate::webhooks::types::{WebhookRegistrationResult, WebhookSubscription};
use crate::webhooks::{WebhookError, WebhookTopic};

const EXISTING_SUBSCRIPTION_QUERY: &str = r"
query AppWebhookSubscriptions($topics: [WebhookSubscriptionTopic!]) {
  webhookSubscriptions(first: 1, topics: $topics) {
    edges {
      node {
        id
        endpoint {
          __typename
          ... on WebhookHttpEndpoint {
            callbackUrl
          }
        }
      }
    }
  }
}";

const CREATE_SUBSCRIPTION_MUTATION: &str = r"
mutation AppWebhookSubscriptionCreate($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}";

const UPDATE_SUBSCRIPTION_MUTATION: &str = r"
mutation AppWebhookSubscriptionUpdate($id: ID!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionUpdate(id: $id, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}";

/// Registry of declared webhook subscriptions, keyed by topic.
///
/// # Thread Safety
///
/// `WebhookRegistry` is `Send + Sync`, making it safe to share across async
/// tasks.
#[derive(Debug, Default)]
pub struct WebhookRegistry {
    subscriptions: HashMap<WebhookTopic, WebhookSubscription>,
}

// Verify WebhookRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WebhookRegistry>();
};

impl WebhookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from declared subscriptions.
    ///
    /// A later declaration for the same topic replaces the earlier one.
    #[must_use]
    pub fn from_subscriptions(subscriptions: Vec<WebhookSubscription>) -> Self {
        let mut registry = Self::new();
        for subscription in subscriptions {
            registry.add_subscription(subscription);
        }
        registry
    }

    /// Adds a subscription, replacing any declaration for the same topic.
    pub fn add_subscription(&mut self, subscription: WebhookSubscription) -> &mut Self {
        self.subscriptions
            .insert(subscription.topic, subscription);
        self
    }

    /// Returns the declared subscription for `topic`, if any.
    #[must_use]
    pub fn get_subscription(&self, topic: WebhookTopic) -> Option<&WebhookSubscription> {
        self.subscriptions.get(&topic)
    }

    /// Returns all declared subscriptions.
    #[must_use]
    pub fn list_subscriptions(&self) -> Vec<&WebhookSubscription> {
        self.subscriptions.values().collect()
    }

    /// Returns `true` when no subscriptions are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Syncs a single topic's subscription with the platform.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::SubscriptionNotDeclared`] when the topic has no
    ///   declaration in this registry
    /// - [`WebhookError::Graphql`] for transport failures
    /// - [`WebhookError::Rejected`] when the platform reports user errors
    pub async fn register(
        &self,
        session: &Session,
        config: &ApiConfig,
        topic: WebhookTopic,
    ) -> Result<WebhookRegistrationResult, WebhookError> {
        let subscription = self
            .get_subscription(topic)
            .ok_or(WebhookError::SubscriptionNotDeclared { topic })?;

        let client = GraphqlClient::new(session, config);
        let callback_url = Self::callback_url(config, subscription);

        match self.query_existing(&client, topic).await? {
            Some((id, existing_callback)) => {
                if existing_callback.as_deref() == Some(callback_url.as_str()) {
                    Ok(WebhookRegistrationResult::Unchanged { topic, id })
                } else {
                    let id = self
                        .mutate_subscription(
                            &client,
                            UPDATE_SUBSCRIPTION_MUTATION,
                            "webhookSubscriptionUpdate",
                            serde_json::json!({
                                "id": id,
                                "webhookSubscription":
                                    Self::subscription_input(subscription, &callback_url),
                            }),
                        )
                        .await?;
                    Ok(WebhookRegistrationResult::Updated { topic, id })
                }
            }
            None => {
                let id = self
                    .mutate_subscription(
                        &client,
                        CREATE_SUBSCRIPTION_MUTATION,
                        "webhookSubscriptionCreate",
                        serde_json::json!({
                            "topic": topic.to_graphql(),
                            "webhookSubscription":
                                Self::subscription_input(subscription, &callback_url),
                        }),
                    )
                    .await?;
                Ok(WebhookRegistrationResult::Created { topic, id })
            }
        }
    }

    /// Syncs every declared subscription, continuing past individual
    /// failures.
    pub async fn register_all(
        &self,
        session: &Session,
        config: &ApiConfig,
    ) -> Vec<WebhookRegistrationResult> {
        let mut results = Vec::with_capacity(self.subscriptions.len());

        for topic in self.subscriptions.keys().copied() {
            let result = match self.register(session, config, topic).await {
                Ok(result) => result,
                Err(error) => {
                    tracing::warn!(
                        topic = %topic,
                        shop = session.shop.as_ref(),
                        error = %error,
                        "webhook subscription sync failed"
                    );
                    WebhookRegistrationResult::Failed { topic, error }
                }
            };
            results.push(result);
        }

        results
    }

    fn callback_url(config: &ApiConfig, subscription: &WebhookSubscription) -> String {
        format!("{}{}", config.app_url().as_ref(), subscription.path)
    }

    fn subscription_input(
        subscription: &WebhookSubscription,
        callback_url: &str,
    ) -> serde_json::Value {
        let mut input = serde_json::json!({ "callbackUrl": callback_url });
        if let Some(fields) = &subscription.include_fields {
            input["includeFields"] = serde_json::json!(fields);
        }
        if let Some(filter) = &subscription.filter {
            input["filter"] = serde_json::json!(filter);
        }
        input
    }

    async fn query_existing(
        &self,
        client: &GraphqlClient,
        topic: WebhookTopic,
    ) -> Result<Option<(String, Option<String>)>, WebhookError> {
        let response = client
            .query(
                EXISTING_SUBSCRIPTION_QUERY,
                Some(serde_json::json!({ "topics": [topic.to_graphql()] })),
            )
            .await?;

        let node = &response.body["data"]["webhookSubscriptions"]["edges"][0]["node"];
        let Some(id) = node["id"].as_str() else {
            return Ok(None);
        };

        let callback_url = node["endpoint"]["callbackUrl"]
            .as_str()
            .map(String::from);
        Ok(Some((id.to_string(), callback_url)))
    }

    async fn mutate_subscription(
        &self,
        client: &GraphqlClient,
        mutation: &str,
        result_field: &str,
        variables: serde_json::Value,
    ) -> Result<String, WebhookError> {
        let response = client.query(mutation, Some(variables)).await?;
        let result = &response.body["data"][result_field];

        if let Some(message) = result["userErrors"][0]["message"].as_str() {
            return Err(WebhookError::Rejected {
                message: message.to_string(),
            });
        }

        result["webhookSubscription"]["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| WebhookError::UnexpectedResponse {
                message: format!("{result_field} returned no subscription id"),
            })
    }
}
