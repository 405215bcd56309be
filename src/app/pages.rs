//! App Bridge helper pages.
//!
//! Two tiny HTML documents the auth flow serves inside the admin iframe:
//!
//! - the **exit-iframe page** breaks out of the iframe before a top-level
//!   redirect (OAuth grant screens refuse to render framed)
//! - the **session token bounce page** asks App Bridge for a fresh
//!   `id_token` and retries the original request with it
//!
//! Both load App Bridge from the Shopify CDN with the app's API key.

use crate::config::ApiConfig;

const APP_BRIDGE_URL: &str = "https://cdn.shopify.com/shopifycloud/app-bridge.js";

/// Renders the page that escapes the admin iframe and redirects the top
/// window to `destination`.
#[must_use]
pub fn exit_iframe_page(config: &ApiConfig, destination: &str) -> String {
    let api_key = html_escape(config.api_key().as_ref());
    let destination = html_escape(destination);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <script data-api-key="{api_key}" src="{APP_BRIDGE_URL}"></script>
  </head>
  <body>
    <script>
      window.open("{destination}", "_top");
    </script>
  </body>
</html>"#
    )
}

/// Renders the bounce page that fetches a fresh session token and reloads
/// the URL named by the `shopify-reload` query parameter with an
/// `id_token` attached.
#[must_use]
pub fn session_token_bounce_page(config: &ApiConfig) -> String {
    let api_key = html_escape(config.api_key().as_ref());
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <script data-api-key="{api_key}" src="{APP_BRIDGE_URL}"></script>
  </head>
  <body>
    <script>
      document.addEventListener("DOMContentLoaded", async () => {{
        const params = new URLSearchParams(window.location.search);
        const reloadTarget = params.get("shopify-reload");
        if (!reloadTarget) return;

        const url = new URL(reloadTarget, window.location.origin);
        url.searchParams.set("id_token", await window.shopify.idToken());
        window.location.replace(url.toString());
      }});
    </script>
  </body>
</html>"#
    )
}

// Minimal escaping for values interpolated into the pages above
fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
