/// Runtime configuration for the scraping core, loaded from `STORELENS_*`
/// environment variables with every knob defaulted.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
    /// `User-Agent` header sent on every outbound request.
    pub user_agent: String,
    /// Currency assumed when a payload carries neither a currency code nor a
    /// usable price.
    pub default_currency: String,
    /// Per-request total timeout for product fetches, in milliseconds.
    pub request_timeout_ms: u64,
    /// Total fetch attempts per product (1 = no retries).
    pub max_attempts: u32,
    /// Base delay for exponential retry backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Default freshness window for cache reads, in minutes.
    pub cache_ttl_minutes: u64,
    /// Hard age ceiling for the opportunistic cache sweep, in minutes.
    /// Independent of any caller-supplied TTL; bounds memory growth.
    pub cache_sweep_max_age_minutes: u64,
    /// Number of requests issued concurrently per batch.
    pub batch_size: usize,
    /// Pause between batches, in milliseconds.
    pub inter_batch_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            user_agent: "storelens/0.1 (product-scraper)".to_string(),
            default_currency: "USD".to_string(),
            request_timeout_ms: 10_000,
            max_attempts: 3,
            retry_base_delay_ms: 1_000,
            cache_ttl_minutes: 15,
            cache_sweep_max_age_minutes: 60,
            batch_size: 5,
            inter_batch_delay_ms: 1_000,
        }
    }
}
