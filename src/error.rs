use thiserror::Error;

/// A single outbound request that did not produce a usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
}

impl FetchError {
    /// Network failures, 429 and 5xx are worth another attempt; everything else
    /// would fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid listing URL \"{url}\": {reason}")]
    InvalidListingUrl { url: String, reason: String },

    #[error("listing page {url} could not be fetched: {source}")]
    ListingUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid {name} selector \"{selector}\"")]
    InvalidSelector { name: &'static str, selector: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
