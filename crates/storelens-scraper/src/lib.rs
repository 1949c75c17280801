pub mod cache;
pub mod client;
pub mod error;
pub mod normalize;
pub mod retry;
pub mod scraper;
pub mod urls;

pub use cache::{CacheEntry, CacheStats, ProductCache};
pub use client::StorefrontClient;
pub use error::ScrapeError;
pub use normalize::{normalize_product, normalize_shop_info};
pub use retry::retry_with_backoff;
pub use scraper::{BatchOutcome, FailedScrape, ProductRequest, ScrapeOptions, Scraper};
pub use urls::{
    is_valid_storefront_url, parse_storefront_url, proxied_image_url, ParsedProductUrl,
};
