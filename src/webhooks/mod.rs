//! Webhook subscriptions and delivery verification.
//!
//! Two halves, matching the lifecycle of a webhook:
//!
//! - **Declaration and sync** ([`WebhookRegistry`], [`WebhookSubscription`]):
//!   subscriptions are declared with the app configuration and synced with
//!   the platform per shop after OAuth completes. Sync queries the existing
//!   subscription first and only mutates when the declaration differs.
//! - **Delivery verification** ([`verification`]): every incoming delivery
//!   is authenticated by its base64 HMAC-SHA256 signature over the raw body
//!   before the payload is trusted.

mod errors;
mod registry;
mod topics;
mod types;
pub mod verification;

pub use errors::WebhookError;
pub use registry::WebhookRegistry;
pub use topics::WebhookTopic;
pub use types::{WebhookRegistrationResult, WebhookSubscription, WebhookSubscriptionBuilder};
pub use verification::{verify_webhook, WebhookContext, WebhookRequest};
