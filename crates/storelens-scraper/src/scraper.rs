//! Single-product and batch orchestration over the client, cache, and retry
//! controller.

use std::time::Duration;

use futures::future::join_all;

use storelens_core::{AppConfig, Product, ShopInfo};

use crate::cache::{CacheStats, ProductCache};
use crate::client::StorefrontClient;
use crate::error::ScrapeError;
use crate::retry::retry_with_backoff;

/// Per-call knobs for [`Scraper::get_product`] and [`Scraper::get_products`].
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Total deadline per fetch attempt; each retry gets a fresh window.
    pub timeout: Duration,
    /// Total fetch attempts (1 = no retries).
    pub retries: u32,
    /// Whether to consult and populate the cache.
    pub use_cache: bool,
    /// Freshness window applied to cache reads on this call.
    pub ttl_minutes: u64,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            retries: 3,
            use_cache: true,
            ttl_minutes: 15,
        }
    }
}

impl ScrapeOptions {
    /// Builds options from the configured defaults.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.request_timeout_ms),
            retries: config.max_attempts,
            use_cache: true,
            ttl_minutes: config.cache_ttl_minutes,
        }
    }
}

/// One entry of a batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRequest {
    pub shop_domain: String,
    pub product_handle: String,
}

/// A request that could not be fulfilled, with its terminal error.
#[derive(Debug)]
pub struct FailedScrape {
    pub shop_domain: String,
    pub product_handle: String,
    pub error: ScrapeError,
}

/// Result of a batch scrape: every input request lands in exactly one of the
/// two lists. Order within each list follows completion, not input.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<Product>,
    pub failed: Vec<FailedScrape>,
}

/// Product-scraping orchestrator: owns the HTTP client and the TTL cache,
/// and layers retry, caching, and batch fan-out over single fetches.
pub struct Scraper {
    client: StorefrontClient,
    cache: ProductCache,
    retry_base_delay: Duration,
    sweep_max_age_minutes: u64,
    batch_size: usize,
    inter_batch_delay: Duration,
}

impl Scraper {
    /// Builds a scraper from configuration with an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: StorefrontClient::new(&config.user_agent, &config.default_currency)?,
            cache: ProductCache::new(),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            sweep_max_age_minutes: config.cache_sweep_max_age_minutes,
            batch_size: config.batch_size.max(1),
            inter_batch_delay: Duration::from_millis(config.inter_batch_delay_ms),
        })
    }

    /// Fetches one product, consulting the cache first.
    ///
    /// With `use_cache` set, expired entries are swept, then a fresh entry
    /// (per this call's `ttl_minutes` — freshness belongs to the read, not
    /// the write) is returned without any network traffic. On a miss or a
    /// stale entry the fetch runs under the retry controller and the result
    /// is written back before being returned.
    ///
    /// Concurrent callers missing on the same key are not de-duplicated:
    /// each fetches independently and the last write wins. The race is
    /// bounded by the number of concurrent callers.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::ScrapeFailure`] carrying the last attempt's
    /// error once all attempts are exhausted. A stale cache entry is never
    /// silently substituted for a failed fetch.
    pub async fn get_product(
        &self,
        shop_domain: &str,
        product_handle: &str,
        options: &ScrapeOptions,
    ) -> Result<Product, ScrapeError> {
        if options.use_cache {
            self.cache.sweep_expired(self.sweep_max_age_minutes);
            if let Some(entry) = self.cache.get(shop_domain, product_handle) {
                if entry.is_fresh(options.ttl_minutes) {
                    tracing::debug!(shop_domain, product_handle, "cache hit");
                    return Ok(entry.product);
                }
                tracing::debug!(shop_domain, product_handle, "cache entry stale — refetching");
            }
        }

        let attempts = options.retries.max(1);
        let result = retry_with_backoff(attempts, self.retry_base_delay, || {
            self.client
                .fetch_product(shop_domain, product_handle, options.timeout)
        })
        .await;

        match result {
            Ok(product) => {
                if options.use_cache {
                    self.cache
                        .put(shop_domain, product_handle, product.clone());
                }
                Ok(product)
            }
            Err(err) => Err(ScrapeError::ScrapeFailure {
                shop_domain: shop_domain.to_owned(),
                product_handle: product_handle.to_owned(),
                attempts,
                source: Box::new(err),
            }),
        }
    }

    /// Fetches many products in bounded concurrent batches.
    ///
    /// Requests run `batch_size` at a time with a fixed pause between
    /// batches to bound outbound request rate. A failing request never
    /// aborts its siblings; it is captured in [`BatchOutcome::failed`] and
    /// the batch continues.
    pub async fn get_products(
        &self,
        requests: &[ProductRequest],
        options: &ScrapeOptions,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut is_first_batch = true;

        for batch in requests.chunks(self.batch_size) {
            if !is_first_batch && !self.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.inter_batch_delay).await;
            }
            is_first_batch = false;

            let results = join_all(batch.iter().map(|request| async move {
                let result = self
                    .get_product(&request.shop_domain, &request.product_handle, options)
                    .await;
                (request, result)
            }))
            .await;

            for (request, result) in results {
                match result {
                    Ok(product) => outcome.succeeded.push(product),
                    Err(error) => {
                        tracing::warn!(
                            shop_domain = %request.shop_domain,
                            product_handle = %request.product_handle,
                            error = %error,
                            "batch item failed"
                        );
                        outcome.failed.push(FailedScrape {
                            shop_domain: request.shop_domain.clone(),
                            product_handle: request.product_handle.clone(),
                            error,
                        });
                    }
                }
            }
        }

        outcome
    }

    /// Fetches shop metadata. Never fails; degrades to domain-derived
    /// defaults on any error.
    pub async fn shop_info(&self, shop_domain: &str) -> ShopInfo {
        self.client.fetch_shop_info(shop_domain).await
    }

    /// Evicts cache entries: exact key, whole domain, or everything.
    pub fn clear_cache(&self, shop_domain: Option<&str>, product_handle: Option<&str>) {
        self.cache.invalidate(shop_domain, product_handle);
    }

    /// Current cache size and keys.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
