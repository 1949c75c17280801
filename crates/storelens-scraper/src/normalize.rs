//! Normalization from untrusted storefront JSON to the canonical
//! [`Product`] and [`ShopInfo`] shapes.
//!
//! Storefront payloads are third-party and uncontrolled, so every field is
//! read defensively: a missing or wrongly-typed field degrades to its
//! default instead of failing normalization. The full table:
//!
//! | payload field              | type read as        | default              |
//! |----------------------------|---------------------|----------------------|
//! | `id`                       | number or string    | `"{domain}:{handle}"`|
//! | `title`                    | string              | `""`                 |
//! | `description`              | string              | `""`                 |
//! | `price`                    | number or num-string| `0`                  |
//! | `compare_at_price`         | number or num-string| absent               |
//! | `currency`                 | string              | inferred (see below) |
//! | `images[]`                 | string or `{src}`   | `[]`                 |
//! | `variants[]`               | array of objects    | `[]`                 |
//! | `variants[].id`            | number or string    | `""`                 |
//! | `variants[].title`         | string              | `"Default Title"`    |
//! | `variants[].price`         | number or num-string| `0`                  |
//! | `variants[].compare_at_price` | number or num-string | absent          |
//! | `variants[].available`     | boolean             | `false`              |
//! | `variants[].option1..3`    | string              | absent               |
//! | `variants[].sku`           | string              | absent               |
//! | `vendor`                   | string              | the shop domain      |
//! | `tags`                     | array or CSV string | `[]`                 |
//! | `available`                | boolean             | `false`              |
//!
//! Currency inference: an explicit non-empty `currency` field wins;
//! otherwise a positive `price` implies `"USD"`; otherwise the configured
//! default currency. `original_price` is kept only when the payload's
//! compare price actually exceeds the current price.
//!
//! The single hard failure is a payload whose top level is not a JSON
//! object — that raises [`ScrapeError::MalformedResponse`].

use chrono::Utc;
use serde_json::{Map, Value};

use storelens_core::{Product, ShopInfo, Variant};

use crate::client::product_url;
use crate::error::ScrapeError;

/// Normalizes one untyped product payload into a [`Product`].
///
/// `scraped_at` is stamped when field mapping completes, not at request
/// start; two normalizations of the same payload differ only in that field.
///
/// # Errors
///
/// Returns [`ScrapeError::MalformedResponse`] when the payload's top level
/// is not a JSON object. Anything less severe degrades per-field.
pub fn normalize_product(
    payload: &Value,
    shop_domain: &str,
    product_handle: &str,
    default_currency: &str,
) -> Result<Product, ScrapeError> {
    let Some(obj) = payload.as_object() else {
        return Err(ScrapeError::MalformedResponse {
            url: product_url(shop_domain, product_handle),
            reason: "top-level payload is not a JSON object".to_owned(),
        });
    };

    let id = id_string(obj.get("id"))
        .unwrap_or_else(|| format!("{shop_domain}:{product_handle}"));
    let price = number_or_zero(obj.get("price"));
    let original_price = optional_number(obj.get("compare_at_price")).filter(|c| *c > price);
    let currency = infer_currency(obj, price, default_currency);

    let images = obj
        .get("images")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(image_src).collect())
        .unwrap_or_default();

    let variants = obj
        .get("variants")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(normalize_variant)
                .collect()
        })
        .unwrap_or_default();

    let vendor = match non_empty_str(obj.get("vendor")) {
        Some(v) => v,
        None => shop_domain.to_owned(),
    };

    Ok(Product {
        id,
        handle: product_handle.to_owned(),
        title: string_or_empty(obj.get("title")),
        description: string_or_empty(obj.get("description")),
        price,
        original_price,
        currency,
        images,
        variants,
        vendor,
        tags: tag_list(obj.get("tags")),
        available: obj.get("available").and_then(Value::as_bool).unwrap_or(false),
        shop_domain: shop_domain.to_owned(),
        scraped_at: Utc::now(),
    })
}

fn normalize_variant(obj: &Map<String, Value>) -> Variant {
    Variant {
        id: id_string(obj.get("id")).unwrap_or_default(),
        title: non_empty_str(obj.get("title")).unwrap_or_else(|| "Default Title".to_owned()),
        price: number_or_zero(obj.get("price")),
        compare_at_price: optional_number(obj.get("compare_at_price")).filter(|c| *c > 0.0),
        available: obj.get("available").and_then(Value::as_bool).unwrap_or(false),
        option1: non_empty_str(obj.get("option1")),
        option2: non_empty_str(obj.get("option2")),
        option3: non_empty_str(obj.get("option3")),
        sku: non_empty_str(obj.get("sku")),
    }
}

/// Normalizes an untyped `shop.json` payload into a [`ShopInfo`].
///
/// Infallible: a non-object payload and any missing field degrade to the
/// domain-derived defaults of [`ShopInfo::degraded`].
#[must_use]
pub fn normalize_shop_info(payload: &Value, shop_domain: &str) -> ShopInfo {
    let Some(obj) = payload.as_object() else {
        return ShopInfo::degraded(shop_domain);
    };

    ShopInfo {
        name: non_empty_str(obj.get("name")).unwrap_or_else(|| shop_domain.to_owned()),
        description: string_or_empty(obj.get("description")),
        currency: non_empty_str(obj.get("currency")).unwrap_or_else(|| "USD".to_owned()),
        domain: shop_domain.to_owned(),
        logo: obj
            .get("logo")
            .and_then(|logo| logo.get("src"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    }
}

fn infer_currency(obj: &Map<String, Value>, price: f64, default_currency: &str) -> String {
    if let Some(code) = non_empty_str(obj.get("currency")) {
        return code;
    }
    if price > 0.0 {
        "USD".to_owned()
    } else {
        default_currency.to_owned()
    }
}

/// Reads a source-system ID as a string. Integer IDs keep their exact
/// decimal form; fractional numbers and empty strings count as absent.
fn id_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_u64().map(|u| u.to_string())
            }
        }
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn string_or_empty(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_owned()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Reads a price-like field. Accepts a JSON number or a numeric string
/// (storefronts use both), clamped to non-negative; anything else is `0`.
fn number_or_zero(value: Option<&Value>) -> f64 {
    optional_number(value).map_or(0.0, |n| n.max(0.0))
}

fn optional_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Reads an image entry as either a bare URL string or a `{"src": ...}`
/// object.
fn image_src(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => non_empty_str(obj.get("src")),
        _ => None,
    }
}

/// Reads tags as either a JSON array of strings or a legacy comma-separated
/// string.
fn tag_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "id": 6_789_012_345_678_u64,
            "title": "Red Canvas Low",
            "description": "<p>A classic low-top.</p>",
            "price": 4990,
            "compare_at_price": 5990,
            "vendor": "Example Shoes",
            "tags": ["sneakers", "canvas"],
            "available": true,
            "images": [
                "https://cdn.example.com/front.jpg",
                {"src": "https://cdn.example.com/side.jpg"}
            ],
            "variants": [
                {
                    "id": 101,
                    "title": "US 9",
                    "price": 4990,
                    "compare_at_price": 5990,
                    "available": true,
                    "option1": "US 9",
                    "sku": "RCL-9"
                },
                {
                    "id": 102,
                    "title": "US 10",
                    "price": 4990,
                    "compare_at_price": null,
                    "available": false,
                    "option1": "US 10",
                    "sku": ""
                }
            ]
        })
    }

    #[test]
    fn maps_a_full_payload() {
        let product = normalize_product(
            &full_payload(),
            "example-shoes.myshopify.com",
            "red-canvas-low",
            "USD",
        )
        .expect("object payload should normalize");

        assert_eq!(product.id, "6789012345678");
        assert_eq!(product.handle, "red-canvas-low");
        assert_eq!(product.title, "Red Canvas Low");
        assert!((product.price - 4990.0).abs() < f64::EPSILON);
        assert_eq!(product.original_price, Some(5990.0));
        assert_eq!(product.currency, "USD");
        assert_eq!(product.images.len(), 2);
        assert_eq!(product.images[1], "https://cdn.example.com/side.jpg");
        assert_eq!(product.vendor, "Example Shoes");
        assert_eq!(product.tags, vec!["sneakers", "canvas"]);
        assert!(product.available);
        assert_eq!(product.shop_domain, "example-shoes.myshopify.com");

        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].id, "101");
        assert_eq!(product.variants[0].option1.as_deref(), Some("US 9"));
        assert_eq!(product.variants[0].sku.as_deref(), Some("RCL-9"));
        assert_eq!(product.variants[0].compare_at_price, Some(5990.0));
        assert!(product.variants[1].compare_at_price.is_none());
        assert!(product.variants[1].sku.is_none(), "empty sku becomes absent");
        assert!(!product.variants[1].available);
    }

    #[test]
    fn empty_object_degrades_to_defaults() {
        let product = normalize_product(&json!({}), "shop.example.com", "mystery-item", "USD")
            .expect("empty object should still normalize");

        assert_eq!(product.id, "shop.example.com:mystery-item");
        assert_eq!(product.handle, "mystery-item");
        assert!(product.title.is_empty());
        assert!(product.description.is_empty());
        assert!((product.price - 0.0).abs() < f64::EPSILON);
        assert!(product.original_price.is_none());
        assert!(product.images.is_empty());
        assert!(product.variants.is_empty());
        assert_eq!(product.vendor, "shop.example.com");
        assert!(product.tags.is_empty());
        assert!(!product.available);
    }

    #[test]
    fn wrongly_typed_fields_degrade_to_defaults() {
        let payload = json!({
            "id": {"nested": true},
            "title": 42,
            "price": "not-a-number",
            "images": "front.jpg",
            "variants": {"0": {}},
            "tags": 7,
            "available": "yes"
        });
        let product = normalize_product(&payload, "shop.example.com", "odd-item", "USD")
            .expect("mistyped fields must not fail normalization");

        assert_eq!(product.id, "shop.example.com:odd-item");
        assert!(product.title.is_empty());
        assert!((product.price - 0.0).abs() < f64::EPSILON);
        assert!(product.images.is_empty());
        assert!(product.variants.is_empty());
        assert!(product.tags.is_empty());
        assert!(!product.available);
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let err = normalize_product(&json!([1, 2, 3]), "shop.example.com", "item", "USD")
            .unwrap_err();
        assert!(matches!(err, ScrapeError::MalformedResponse { .. }));
    }

    #[test]
    fn same_payload_normalizes_identically_except_scraped_at() {
        let payload = full_payload();
        let a = normalize_product(&payload, "shop.example.com", "red-canvas-low", "USD").unwrap();
        let b = normalize_product(&payload, "shop.example.com", "red-canvas-low", "USD").unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(a.title, b.title);
        assert_eq!(a.description, b.description);
        assert!((a.price - b.price).abs() < f64::EPSILON);
        assert_eq!(a.original_price, b.original_price);
        assert_eq!(a.currency, b.currency);
        assert_eq!(a.images, b.images);
        assert_eq!(a.variants.len(), b.variants.len());
        assert_eq!(a.vendor, b.vendor);
        assert_eq!(a.tags, b.tags);
        assert_eq!(a.available, b.available);
        assert_eq!(a.shop_domain, b.shop_domain);
    }

    #[test]
    fn explicit_currency_field_wins() {
        let payload = json!({"price": 100, "currency": "EUR"});
        let product = normalize_product(&payload, "shop.example.com", "item", "COP").unwrap();
        assert_eq!(product.currency, "EUR");
    }

    #[test]
    fn positive_price_without_currency_implies_usd() {
        let payload = json!({"price": 100});
        let product = normalize_product(&payload, "shop.example.com", "item", "COP").unwrap();
        assert_eq!(product.currency, "USD");
    }

    #[test]
    fn missing_price_and_currency_fall_back_to_default_currency() {
        let product = normalize_product(&json!({}), "shop.example.com", "item", "COP").unwrap();
        assert_eq!(product.currency, "COP");
    }

    #[test]
    fn compare_at_price_below_price_is_dropped() {
        let payload = json!({"price": 5000, "compare_at_price": 4000});
        let product = normalize_product(&payload, "shop.example.com", "item", "USD").unwrap();
        assert!(product.original_price.is_none());
    }

    #[test]
    fn numeric_string_prices_are_accepted() {
        let payload = json!({"price": "49.90", "compare_at_price": "59.90"});
        let product = normalize_product(&payload, "shop.example.com", "item", "USD").unwrap();
        assert!((product.price - 49.90).abs() < f64::EPSILON);
        assert_eq!(product.original_price, Some(59.90));
    }

    #[test]
    fn negative_price_clamps_to_zero() {
        let payload = json!({"price": -12.5});
        let product = normalize_product(&payload, "shop.example.com", "item", "USD").unwrap();
        assert!((product.price - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn comma_separated_tag_string_is_split() {
        let payload = json!({"tags": "sneakers, canvas , , limited"});
        let product = normalize_product(&payload, "shop.example.com", "item", "USD").unwrap();
        assert_eq!(product.tags, vec!["sneakers", "canvas", "limited"]);
    }

    #[test]
    fn unnamed_variant_gets_default_title() {
        let payload = json!({"variants": [{"id": 1, "price": 100}]});
        let product = normalize_product(&payload, "shop.example.com", "item", "USD").unwrap();
        assert_eq!(product.variants[0].title, "Default Title");
    }

    #[test]
    fn shop_info_maps_fields_and_nested_logo() {
        let payload = json!({
            "name": "Example Shoes",
            "description": "Hand-made sneakers.",
            "currency": "EUR",
            "logo": {"src": "https://cdn.example.com/logo.png"}
        });
        let info = normalize_shop_info(&payload, "shop.example.com");
        assert_eq!(info.name, "Example Shoes");
        assert_eq!(info.description, "Hand-made sneakers.");
        assert_eq!(info.currency, "EUR");
        assert_eq!(info.domain, "shop.example.com");
        assert_eq!(info.logo.as_deref(), Some("https://cdn.example.com/logo.png"));
    }

    #[test]
    fn shop_info_non_object_degrades() {
        let info = normalize_shop_info(&json!("nope"), "shop.example.com");
        assert_eq!(info.name, "shop.example.com");
        assert_eq!(info.currency, "USD");
        assert!(info.logo.is_none());
    }
}
