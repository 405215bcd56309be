//! User information carried by online sessions.

use serde::{Deserialize, Serialize};

/// The Shopify admin user associated with an online session.
///
/// When an app uses online access tokens, the token response includes
/// information about the user who authorized the app. Storage adapters
/// persist this alongside the session.
///
/// # Example
///
/// ```rust
/// use shopify_app::AssociatedUser;
///
/// let user: AssociatedUser = serde_json::from_str(
///     r#"{
///         "id": 12345,
///         "first_name": "Jane",
///         "last_name": "Doe",
///         "email": "jane@example.com",
///         "email_verified": true,
///         "account_owner": true,
///         "locale": "en",
///         "collaborator": false
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(user.id, 12345);
/// assert!(user.account_owner);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedUser {
    /// The user's ID in the Shopify admin.
    pub id: i64,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's email address.
    pub email: String,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Whether the user owns the store.
    pub account_owner: bool,
    /// The user's locale (e.g., "en").
    pub locale: String,
    /// Whether the user is a collaborator rather than a staff member.
    pub collaborator: bool,
}

// Verify AssociatedUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AssociatedUser>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_from_token_response_shape() {
        let json = r#"{
            "id": 902541635,
            "first_name": "John",
            "last_name": "Smith",
            "email": "john@example.com",
            "email_verified": true,
            "account_owner": true,
            "locale": "en",
            "collaborator": false
        }"#;

        let user: AssociatedUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 902_541_635);
        assert_eq!(user.email, "john@example.com");
        assert!(!user.collaborator);
    }

    #[test]
    fn test_serializes_round_trip() {
        let user = AssociatedUser {
            id: 1,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            email_verified: true,
            account_owner: false,
            locale: "fr".to_string(),
            collaborator: true,
        };

        let json = serde_json::to_string(&user).unwrap();
        let restored: AssociatedUser = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, user);
    }
}
