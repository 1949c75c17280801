use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("invalid storefront URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(
        "failed to scrape {shop_domain}/{product_handle} after {attempts} attempts: {source}"
    )]
    ScrapeFailure {
        shop_domain: String,
        product_handle: String,
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    /// Classifies a transport-level `reqwest` failure. An elapsed request
    /// deadline becomes [`ScrapeError::Timeout`]; everything else (DNS,
    /// refused connection, reset) is [`ScrapeError::Network`].
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_owned(),
            }
        } else {
            ScrapeError::Network(err)
        }
    }
}
