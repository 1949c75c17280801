use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storelens_scraper::{
    parse_storefront_url, ProductRequest, ScrapeError, ScrapeOptions, Scraper,
};

#[derive(Debug, Parser)]
#[command(name = "storelens")]
#[command(about = "Storefront product scraping and caching toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch one product by URL, or by shop domain plus handle.
    Product {
        /// Product URL (e.g. "https://shop.example.com/products/red-shoe")
        /// or a bare shop domain when HANDLE is given.
        target: String,
        /// Product handle; required when TARGET is a bare domain.
        handle: Option<String>,
        /// Bypass the cache for this call.
        #[arg(long)]
        no_cache: bool,
        /// Freshness window for cache reads, in minutes.
        #[arg(long)]
        ttl_minutes: Option<u64>,
        /// Per-attempt request timeout, in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Total fetch attempts (1 = no retries).
        #[arg(long)]
        retries: Option<u32>,
    },
    /// Fetch many products concurrently from their URLs.
    Batch {
        /// Product URLs.
        urls: Vec<String>,
    },
    /// Fetch shop metadata (degrades to domain-derived defaults on failure).
    Shop {
        /// Shop domain, e.g. "example-shoes.myshopify.com".
        domain: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storelens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let scraper = Scraper::new(&config)?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Product {
            target,
            handle,
            no_cache,
            ttl_minutes,
            timeout_secs,
            retries,
        } => {
            let (shop_domain, product_handle) = resolve_target(&target, handle)?;

            let mut options = ScrapeOptions::from_config(&config);
            options.use_cache = !no_cache;
            if let Some(ttl) = ttl_minutes {
                options.ttl_minutes = ttl;
            }
            if let Some(secs) = timeout_secs {
                options.timeout = Duration::from_secs(secs);
            }
            if let Some(attempts) = retries {
                options.retries = attempts;
            }

            let product = scraper
                .get_product(&shop_domain, &product_handle, &options)
                .await?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }

        Commands::Batch { urls } => {
            let mut requests = Vec::new();
            let mut unparseable = 0usize;
            for url in &urls {
                match parse_storefront_url(url) {
                    Some(parsed) => requests.push(ProductRequest {
                        shop_domain: parsed.shop_domain,
                        product_handle: parsed.product_handle,
                    }),
                    None => {
                        tracing::warn!(url = %url, "not a recognizable product URL, skipping");
                        unparseable += 1;
                    }
                }
            }

            let options = ScrapeOptions::from_config(&config);
            let outcome = scraper.get_products(&requests, &options).await;

            let omitted = outcome.failed.len() + unparseable;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "products": outcome.succeeded,
                    "omitted": omitted,
                }))?
            );
        }

        Commands::Shop { domain } => {
            let info = scraper.shop_info(&domain).await;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}

/// Resolves the `product` subcommand's target into a fetch key. A bare
/// domain needs an explicit handle; anything else must parse as a product
/// URL.
fn resolve_target(target: &str, handle: Option<String>) -> anyhow::Result<(String, String)> {
    if let Some(handle) = handle {
        return Ok((target.to_string(), handle));
    }
    parse_storefront_url(target)
        .map(|parsed| (parsed.shop_domain, parsed.product_handle))
        .ok_or_else(|| {
            ScrapeError::InvalidUrl {
                url: target.to_string(),
                reason: "no /products/{handle} path segment; pass a domain and handle instead"
                    .to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_target_prefers_explicit_handle() {
        let (domain, handle) =
            resolve_target("shop.example.com", Some("red-shoe".to_string())).unwrap();
        assert_eq!(domain, "shop.example.com");
        assert_eq!(handle, "red-shoe");
    }

    #[test]
    fn resolve_target_parses_product_urls() {
        let (domain, handle) =
            resolve_target("https://foo.myshopify.com/products/red-shoe?variant=1", None).unwrap();
        assert_eq!(domain, "foo.myshopify.com");
        assert_eq!(handle, "red-shoe");
    }

    #[test]
    fn resolve_target_rejects_non_product_urls() {
        assert!(resolve_target("https://example.com/about", None).is_err());
    }
}
