use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product scraped from a third-party storefront, normalized into the
/// canonical shape shared by every consumer of the scraping core.
///
/// A `Product` is created by normalization on every successful fetch and is
/// never mutated afterwards; a re-fetch replaces the whole value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Source-system product ID, stored as a string to avoid precision loss.
    /// Synthesized as `"{shop_domain}:{handle}"` when the source omits it.
    pub id: String,

    /// URL slug used on the storefront, e.g. `"red-canvas-low"`.
    pub handle: String,

    /// Display name of the product.
    pub title: String,

    /// Product description. May contain HTML markup; treated as opaque.
    pub description: String,

    /// Current price. Non-negative; passed through in the source's own units.
    pub price: f64,

    /// List/compare price, present only when it exceeds [`Self::price`].
    pub original_price: Option<f64>,

    /// ISO-4217-style currency code, inferred during normalization when the
    /// source omits it.
    pub currency: String,

    /// Image URLs in storefront order. May be empty.
    pub images: Vec<String>,

    /// All purchasable variants for this product.
    pub variants: Vec<Variant>,

    /// Vendor / brand name. Defaults to the shop domain when absent.
    pub vendor: String,

    /// Free-form tags. Insertion order carries no meaning.
    pub tags: Vec<String>,

    /// Whether the product is currently available for purchase.
    pub available: bool,

    /// The storefront domain this product was fetched from (the cache key).
    pub shop_domain: String,

    /// When normalization of this snapshot completed.
    pub scraped_at: DateTime<Utc>,
}

impl Product {
    /// Returns the first variant, which storefronts treat as the default
    /// selection.
    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Returns `true` if at least one variant is currently purchasable.
    #[must_use]
    pub fn has_available_variants(&self) -> bool {
        self.variants.iter().any(|v| v.available)
    }

    /// Returns `true` when a compare price above the current price exists.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.original_price.is_some_and(|orig| orig > self.price)
    }
}

/// A single purchasable variant of a [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// Source-system variant ID as a string. Empty when the source omits it.
    pub id: String,

    /// Display title. Storefronts use the sentinel `"Default Title"` for a
    /// product with a single unnamed variant.
    pub title: String,

    /// Current variant price.
    pub price: f64,

    /// Pre-sale comparison price, when set and positive.
    pub compare_at_price: Option<f64>,

    /// Whether this variant is currently in stock and purchasable.
    pub available: bool,

    /// First option value (e.g. color).
    pub option1: Option<String>,

    /// Second option value (e.g. size).
    pub option2: Option<String>,

    /// Third option value.
    pub option3: Option<String>,

    /// Stock-keeping unit, when the source provides a non-empty one.
    pub sku: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_variant(id: &str, available: bool) -> Variant {
        Variant {
            id: id.to_string(),
            title: "Default Title".to_string(),
            price: 29.99,
            compare_at_price: None,
            available,
            option1: None,
            option2: None,
            option3: None,
            sku: Some("SKU-001".to_string()),
        }
    }

    fn make_product(variants: Vec<Variant>) -> Product {
        Product {
            id: "123456789".to_string(),
            handle: "red-canvas-low".to_string(),
            title: "Red Canvas Low".to_string(),
            description: "<p>A classic low-top.</p>".to_string(),
            price: 29.99,
            original_price: None,
            currency: "USD".to_string(),
            images: vec!["https://cdn.example.com/red-canvas-low.jpg".to_string()],
            variants,
            vendor: "Example Shoes".to_string(),
            tags: vec!["sneakers".to_string(), "canvas".to_string()],
            available: true,
            shop_domain: "example-shoes.myshopify.com".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn default_variant_none_when_no_variants() {
        let product = make_product(vec![]);
        assert!(product.default_variant().is_none());
    }

    #[test]
    fn default_variant_is_first_variant() {
        let product = make_product(vec![make_variant("10", true), make_variant("11", false)]);
        let default = product.default_variant().expect("expected a variant");
        assert_eq!(default.id, "10");
    }

    #[test]
    fn has_available_variants_false_when_all_sold_out() {
        let product = make_product(vec![make_variant("1", false), make_variant("2", false)]);
        assert!(!product.has_available_variants());
    }

    #[test]
    fn has_available_variants_true_when_one_in_stock() {
        let product = make_product(vec![make_variant("1", false), make_variant("2", true)]);
        assert!(product.has_available_variants());
    }

    #[test]
    fn on_sale_false_without_original_price() {
        let product = make_product(vec![make_variant("1", true)]);
        assert!(!product.on_sale());
    }

    #[test]
    fn on_sale_true_when_original_price_exceeds_price() {
        let mut product = make_product(vec![make_variant("1", true)]);
        product.original_price = Some(39.99);
        assert!(product.on_sale());
    }

    #[test]
    fn serde_roundtrip_product() {
        let product = make_product(vec![make_variant("1", true)]);
        let json = serde_json::to_string(&product).expect("serialization failed");
        let decoded: Product = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded.id, product.id);
        assert_eq!(decoded.shop_domain, product.shop_domain);
        assert_eq!(decoded.variants.len(), 1);
        assert_eq!(decoded.variants[0].sku.as_deref(), Some("SKU-001"));
    }
}
