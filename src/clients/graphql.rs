//! GraphQL client for the Admin API.
//!
//! GraphQL is the recommended Admin API surface; webhook subscription sync
//! and the handle given to lifecycle hooks both use this client.

use crate::auth::Session;
use crate::clients::errors::GraphqlError;
use crate::clients::http::{HttpClient, HttpResponse};
use crate::config::{ApiConfig, ApiVersion};

/// GraphQL Admin API client bound to a session.
///
/// # Example
///
/// ```rust,ignore
/// let client = GraphqlClient::new(&session, &config);
///
/// let response = client
///     .query(
///         "query GetShop { shop { name } }",
///         None,
///     )
///     .await?;
///
/// println!("{}", response.body["data"]["shop"]["name"]);
/// ```
#[derive(Debug)]
pub struct GraphqlClient {
    http_client: HttpClient,
    api_version: ApiVersion,
}

// Verify GraphqlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Default attempts for GraphQL requests; one retry on 429/500.
    const TRIES: u32 = 2;

    /// Creates a client for the given session, using the configured API
    /// version.
    #[must_use]
    pub fn new(session: &Session, config: &ApiConfig) -> Self {
        Self {
            http_client: HttpClient::new(session, config),
            api_version: config.api_version().clone(),
        }
    }

    /// Returns the API version requests are made against.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Executes a GraphQL query against the Admin API.
    ///
    /// Returns the raw [`HttpResponse`]; GraphQL-level errors (user errors,
    /// validation errors) arrive with HTTP 200 in `response.body["errors"]`
    /// and are the caller's to inspect.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlError::Http`] for transport-level failures.
    pub async fn query(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<HttpResponse, GraphqlError> {
        let mut body = serde_json::json!({ "query": query });
        if let Some(variables) = variables {
            body["variables"] = variables;
        }

        let path = format!("/admin/api/{}/graphql.json", self.api_version);
        let response = self.http_client.post_json(&path, &body, Self::TRIES).await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScopes;
    use crate::config::{ApiKey, ApiSecretKey, AppConfig, ShopDomain};
    use crate::storage::MemorySessionStorage;

    fn test_config() -> ApiConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .app_url("https://app.example.com")
            .api_version(ApiVersion::V2025_01)
            .session_storage(MemorySessionStorage::new())
            .build()
            .unwrap()
            .api()
            .clone()
    }

    fn test_session() -> Session {
        Session::new(
            "id".to_string(),
            ShopDomain::new("test-shop").unwrap(),
            "token".to_string(),
            AuthScopes::new(),
            false,
            None,
        )
    }

    #[test]
    fn test_client_uses_configured_api_version() {
        let client = GraphqlClient::new(&test_session(), &test_config());
        assert_eq!(client.api_version(), &ApiVersion::V2025_01);
    }

    #[test]
    fn test_client_targets_shop_domain() {
        let client = GraphqlClient::new(&test_session(), &test_config());
        assert_eq!(
            client.http_client.base_uri(),
            "https://test-shop.myshopify.com"
        );
    }
}
