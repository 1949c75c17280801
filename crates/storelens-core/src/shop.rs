use serde::{Deserialize, Serialize};

/// Shop-level metadata fetched from a storefront's `shop.json` endpoint.
///
/// Shop metadata is decorative, not transactional: callers always receive a
/// usable value, degraded to domain-derived defaults when the fetch fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopInfo {
    /// Display name of the shop. Falls back to the domain.
    pub name: String,

    /// Shop description, empty when unknown.
    pub description: String,

    /// Shop currency code, `"USD"` when unknown.
    pub currency: String,

    /// The storefront domain this metadata describes.
    pub domain: String,

    /// Shop logo URL, when the storefront exposes one.
    pub logo: Option<String>,
}

impl ShopInfo {
    /// The fallback value returned when shop metadata cannot be fetched.
    #[must_use]
    pub fn degraded(shop_domain: &str) -> Self {
        Self {
            name: shop_domain.to_string(),
            description: String::new(),
            currency: "USD".to_string(),
            domain: shop_domain.to_string(),
            logo: None,
        }
    }
}
