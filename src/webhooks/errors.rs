//! Webhook-specific error types.

use crate::clients::GraphqlError;
use crate::webhooks::WebhookTopic;
use thiserror::Error;

/// Error type for webhook verification and registration operations.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request carries no `X-Shopify-Hmac-SHA256` header.
    ///
    /// Requests without a signature cannot be webhook deliveries and are
    /// rejected before any verification work.
    #[error("Request is missing the webhook signature header")]
    MissingHmacHeader,

    /// Webhook signature verification failed.
    ///
    /// The message is intentionally generic to avoid leaking
    /// security details.
    #[error("Webhook signature verification failed")]
    InvalidHmac,

    /// The delivery body is not valid JSON.
    #[error("Webhook payload could not be parsed: {message}")]
    InvalidPayload {
        /// Description of the parse failure.
        message: String,
    },

    /// No subscription is declared for the topic.
    #[error("No webhook subscription declared for topic: {topic}")]
    SubscriptionNotDeclared {
        /// The topic that was looked up.
        topic: WebhookTopic,
    },

    /// An underlying GraphQL transport error occurred.
    #[error(transparent)]
    Graphql(#[from] GraphqlError),

    /// The platform rejected the subscription mutation.
    ///
    /// Returned when the mutation succeeds at the HTTP level but the
    /// response body carries `userErrors`.
    #[error("Webhook subscription rejected: {message}")]
    Rejected {
        /// The user error message from the response.
        message: String,
    },

    /// The mutation response did not have the expected shape.
    #[error("Unexpected webhook subscription response: {message}")]
    UnexpectedResponse {
        /// Description of what was missing.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_hmac_message_leaks_no_detail() {
        let message = WebhookError::InvalidHmac.to_string();
        assert_eq!(message, "Webhook signature verification failed");
        assert!(!message.contains("key"));
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_subscription_not_declared_names_topic() {
        let error = WebhookError::SubscriptionNotDeclared {
            topic: WebhookTopic::OrdersCreate,
        };
        assert!(error.to_string().contains("orders/create"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error: &dyn std::error::Error = &WebhookError::MissingHmacHeader;
        let _ = error;
    }
}
