//! Storefront URL validation, decomposition, and image-relay URL
//! construction.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Served by the rendering layer when a product has no usable image.
const PLACEHOLDER_IMAGE_PATH: &str = "/placeholder-product.jpg";

/// A product URL decomposed into its fetch key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProductUrl {
    pub shop_domain: String,
    pub product_handle: String,
}

/// `true` iff `url` is well-formed and either lives on a known
/// storefront-hosting domain or carries a product path segment.
#[must_use]
pub fn is_valid_storefront_url(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    let host = parsed.host_str().unwrap_or_default();
    host.contains("myshopify.com") || host.contains("shopify.com") || parsed.path().contains("/products/")
}

/// Extracts `(shop_domain, product_handle)` from a product URL.
///
/// The handle is the path segment following `/products/`; query parameters
/// and fragments are ignored. Returns `None` for unparseable URLs and for
/// paths without a product segment.
#[must_use]
pub fn parse_storefront_url(url: &str) -> Option<ParsedProductUrl> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let shop_domain = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };

    let mut segments = parsed.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "products" {
            return segments
                .next()
                .filter(|handle| !handle.is_empty())
                .map(|handle| ParsedProductUrl {
                    shop_domain,
                    product_handle: handle.to_owned(),
                });
        }
    }
    None
}

/// Rewrites a third-party image URL into a same-origin relay URL so the
/// rendering layer never hot-links arbitrary image hosts.
///
/// Protocol-relative URLs are upgraded to `https://`. Site-relative paths
/// are returned unchanged — without a resolved origin they cannot be
/// proxied. An empty input maps to the placeholder image.
#[must_use]
pub fn proxied_image_url(original_url: &str, width: Option<u32>, height: Option<u32>) -> String {
    if original_url.is_empty() {
        return PLACEHOLDER_IMAGE_PATH.to_owned();
    }

    let absolute = if let Some(rest) = original_url.strip_prefix("//") {
        format!("https://{rest}")
    } else if original_url.starts_with('/') {
        return original_url.to_owned();
    } else {
        original_url.to_owned()
    };

    let mut relay = format!(
        "/image-proxy?url={}",
        utf8_percent_encode(&absolute, NON_ALPHANUMERIC)
    );
    if let Some(w) = width {
        relay.push_str(&format!("&w={w}"));
    }
    if let Some(h) = height {
        relay.push_str(&format!("&h={h}"));
    }
    relay
}
