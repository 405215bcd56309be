//! Derived authentication route paths.

/// The set of routes the app reserves for authentication.
///
/// All five paths are derived from a single configurable prefix. The
/// defaults, with the `/auth` prefix:
///
/// | Route | Purpose |
/// |---|---|
/// | `/auth` | OAuth entry point, starts the authorization redirect |
/// | `/auth/callback` | OAuth callback, exchanges the code for a token |
/// | `/auth/session-token` | App Bridge bounce page that refreshes the session token |
/// | `/auth/exit-iframe` | Escapes the admin iframe before a top-level redirect |
/// | `/auth/login` | Merchant-facing shop login form handler |
///
/// # Example
///
/// ```rust
/// use shopify_app::AuthPaths;
///
/// let paths = AuthPaths::new("/auth");
/// assert_eq!(paths.path(), "/auth");
/// assert_eq!(paths.callback_path(), "/auth/callback");
/// assert_eq!(paths.patch_session_token_path(), "/auth/session-token");
/// assert_eq!(paths.exit_iframe_path(), "/auth/exit-iframe");
/// assert_eq!(paths.login_path(), "/auth/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthPaths {
    path: String,
    callback_path: String,
    patch_session_token_path: String,
    exit_iframe_path: String,
    login_path: String,
}

impl AuthPaths {
    /// Derives the auth route set from a path prefix.
    ///
    /// The prefix is normalized to start with `/` and not end with one, so
    /// `"auth"`, `"/auth"`, and `"/auth/"` all produce the same routes.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        let path = if trimmed.is_empty() {
            "/auth".to_string()
        } else {
            format!("/{trimmed}")
        };

        Self {
            callback_path: format!("{path}/callback"),
            patch_session_token_path: format!("{path}/session-token"),
            exit_iframe_path: format!("{path}/exit-iframe"),
            login_path: format!("{path}/login"),
            path,
        }
    }

    /// The OAuth entry point path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The OAuth callback path.
    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// The session token bounce page path.
    #[must_use]
    pub fn patch_session_token_path(&self) -> &str {
        &self.patch_session_token_path
    }

    /// The iframe escape page path.
    #[must_use]
    pub fn exit_iframe_path(&self) -> &str {
        &self.exit_iframe_path
    }

    /// The merchant login handler path.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl Default for AuthPaths {
    fn default() -> Self {
        Self::new("/auth")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix_derives_all_five_paths() {
        let paths = AuthPaths::default();
        assert_eq!(paths.path(), "/auth");
        assert_eq!(paths.callback_path(), "/auth/callback");
        assert_eq!(paths.patch_session_token_path(), "/auth/session-token");
        assert_eq!(paths.exit_iframe_path(), "/auth/exit-iframe");
        assert_eq!(paths.login_path(), "/auth/login");
    }

    #[test]
    fn test_custom_prefix() {
        let paths = AuthPaths::new("/shopify/auth");
        assert_eq!(paths.path(), "/shopify/auth");
        assert_eq!(paths.callback_path(), "/shopify/auth/callback");
        assert_eq!(paths.login_path(), "/shopify/auth/login");
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(AuthPaths::new("auth").path(), "/auth");
        assert_eq!(AuthPaths::new("/auth/").path(), "/auth");
        assert_eq!(AuthPaths::new("").path(), "/auth");
    }
}
