//! HTTP client for storefront product and shop JSON endpoints.

use std::time::Duration;

use reqwest::Client;

use storelens_core::{Product, ShopInfo};

use crate::error::ScrapeError;
use crate::normalize::{normalize_product, normalize_shop_info};

/// Fixed timeout for shop metadata fetches. Shop info is decorative, so it
/// gets a shorter window than product fetches and degrades instead of failing.
const SHOP_INFO_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for a storefront's public product JSON endpoint
/// (`/products/{handle}.js`) and its `shop.json` metadata endpoint.
///
/// Non-2xx responses, elapsed deadlines, connection failures, and unparseable
/// bodies surface as typed [`ScrapeError`] variants; retry policy lives in the
/// caller, not here.
pub struct StorefrontClient {
    client: Client,
    default_currency: String,
}

impl StorefrontClient {
    /// Creates a `StorefrontClient` with the configured `User-Agent`.
    ///
    /// Per-request timeouts are supplied at call time so each retry attempt
    /// gets a fresh window; only the connect timeout is fixed here.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Network`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(user_agent: &str, default_currency: &str) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(ScrapeError::Network)?;
        Ok(Self {
            client,
            default_currency: default_currency.to_owned(),
        })
    }

    /// Fetches and normalizes one product from a storefront.
    ///
    /// Issues a single GET to `{origin}/products/{handle}.js` with `timeout`
    /// as the total request deadline. The 2xx body is parsed as untyped JSON
    /// and handed to [`normalize_product`]; malformed fields degrade to
    /// defaults there rather than failing here.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Timeout`] — the request exceeded `timeout`.
    /// - [`ScrapeError::Http`] — upstream responded with a non-2xx status.
    /// - [`ScrapeError::Network`] — connection-level failure.
    /// - [`ScrapeError::MalformedResponse`] — 2xx body that is not JSON, or
    ///   whose top level is not an object.
    pub async fn fetch_product(
        &self,
        shop_domain: &str,
        product_handle: &str,
        timeout: Duration,
    ) -> Result<Product, ScrapeError> {
        let url = product_url(shop_domain, product_handle);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::from_reqwest(e, &url))?;
        let payload =
            serde_json::from_str::<serde_json::Value>(&body).map_err(|e| {
                ScrapeError::MalformedResponse {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            })?;

        normalize_product(&payload, shop_domain, product_handle, &self.default_currency)
    }

    /// Fetches shop-level metadata from `{origin}/shop.json`.
    ///
    /// Never fails: any error (timeout, network, non-2xx, unparseable body)
    /// is absorbed into [`ShopInfo::degraded`] after a warning.
    pub async fn fetch_shop_info(&self, shop_domain: &str) -> ShopInfo {
        let url = shop_json_url(shop_domain);

        let payload = async {
            let response = self
                .client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .timeout(SHOP_INFO_TIMEOUT)
                .send()
                .await
                .map_err(|e| ScrapeError::from_reqwest(e, &url))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScrapeError::Http {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| ScrapeError::from_reqwest(e, &url))?;
            serde_json::from_str::<serde_json::Value>(&body).map_err(|e| {
                ScrapeError::MalformedResponse {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            })
        }
        .await;

        match payload {
            Ok(value) => normalize_shop_info(&value, shop_domain),
            Err(err) => {
                tracing::warn!(
                    shop_domain,
                    error = %err,
                    "could not fetch shop info — returning domain-derived defaults"
                );
                ShopInfo::degraded(shop_domain)
            }
        }
    }
}

/// Resolves the request origin for a shop domain.
///
/// Bare domains get `https://` prepended; inputs that already carry a scheme
/// are used as-is (test servers speak plain HTTP on loopback).
pub(crate) fn origin_for(shop_domain: &str) -> String {
    let trimmed = shop_domain.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}

/// Builds the product JSON URL for the given shop and handle.
pub(crate) fn product_url(shop_domain: &str, product_handle: &str) -> String {
    format!("{}/products/{product_handle}.js", origin_for(shop_domain))
}

/// Builds the shop metadata URL for the given shop.
fn shop_json_url(shop_domain: &str) -> String {
    format!("{}/shop.json", origin_for(shop_domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_for_prepends_https_to_bare_domain() {
        assert_eq!(
            origin_for("example-shoes.myshopify.com"),
            "https://example-shoes.myshopify.com"
        );
    }

    #[test]
    fn origin_for_keeps_explicit_scheme() {
        assert_eq!(origin_for("http://127.0.0.1:9090"), "http://127.0.0.1:9090");
        assert_eq!(origin_for("https://shop.example.com"), "https://shop.example.com");
    }

    #[test]
    fn origin_for_strips_trailing_slash() {
        assert_eq!(origin_for("shop.example.com/"), "https://shop.example.com");
        assert_eq!(
            origin_for("https://shop.example.com/"),
            "https://shop.example.com"
        );
    }

    #[test]
    fn product_url_shape() {
        assert_eq!(
            product_url("shop.example.com", "red-canvas-low"),
            "https://shop.example.com/products/red-canvas-low.js"
        );
    }

    #[test]
    fn shop_json_url_shape() {
        assert_eq!(
            shop_json_url("shop.example.com"),
            "https://shop.example.com/shop.json"
        );
    }
}
