use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::error::{ConfigError, JobError};
use crate::extractor::DetailExtractor;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::locator::ListingLocator;
use crate::models::JobOutput;
use crate::orchestrator::Orchestrator;

/// Runs one listing page through locate, fetch and extract.
pub struct MachineFinder {
    fetcher: Arc<dyn PageFetcher>,
    locator: ListingLocator,
    orchestrator: Orchestrator,
}

impl MachineFinder {
    /// Builds the pipeline with an HTTP fetcher for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a selector or the base URL is invalid, or the HTTP
    /// client cannot be built.
    pub fn new(config: &SiteConfig) -> anyhow::Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config)?);
        Ok(Self::with_fetcher(config, fetcher)?)
    }

    /// Builds the pipeline around any [`PageFetcher`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a selector or the base URL is invalid.
    pub fn with_fetcher(config: &SiteConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self, ConfigError> {
        let locator = ListingLocator::new(config)?;
        let extractor = Arc::new(DetailExtractor::new(config)?);
        let orchestrator = Orchestrator::new(Arc::clone(&fetcher), extractor, config.fan_out.clone());

        Ok(Self {
            fetcher,
            locator,
            orchestrator,
        })
    }

    /// Scrapes every product linked from the results section of `listing_url`.
    ///
    /// Detail pages that fail are left out. An empty result carries a
    /// diagnostic saying whether the results header or its links were missing.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::ListingUnavailable`] when the listing page itself
    /// cannot be fetched.
    pub async fn run_job(&self, listing_url: &str) -> Result<JobOutput, JobError> {
        info!("Scraping listing page {}", listing_url);

        let html = self
            .fetcher
            .fetch_text(listing_url)
            .await
            .map_err(|source| JobError::ListingUnavailable {
                url: listing_url.to_string(),
                source,
            })?;

        let located = self.locator.locate(&html);
        if let Some(miss) = located.miss {
            warn!("No detail pages to fetch from {}: {}", listing_url, miss);
            return Ok(JobOutput {
                records: Vec::new(),
                diagnostic: Some(miss.to_string()),
                failed_fetches: 0,
                scraped_at: Utc::now(),
            });
        }

        let harvest = self.orchestrator.harvest(&located.urls).await;
        info!("Found {} products on {}", harvest.records.len(), listing_url);

        Ok(JobOutput {
            records: harvest.records,
            diagnostic: None,
            failed_fetches: harvest.failed_fetches,
            scraped_at: Utc::now(),
        })
    }
}

/// Checks that `listing_url` is an http(s) URL on the configured site.
///
/// # Errors
///
/// Returns [`JobError::InvalidListingUrl`] for empty, unparseable or
/// off-site URLs.
pub fn validate_listing_url(config: &SiteConfig, listing_url: &str) -> Result<Url, JobError> {
    let invalid = |reason: String| JobError::InvalidListingUrl {
        url: listing_url.to_string(),
        reason,
    };

    let trimmed = listing_url.trim();
    if trimmed.is_empty() {
        return Err(invalid("a listing URL is required".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    let base = Url::parse(&config.base_url).map_err(|e| invalid(format!("configured base URL: {e}")))?;

    if url.origin() != base.origin() {
        return Err(invalid(format!("not a {} URL ({})", config.name, config.base_url)));
    }

    Ok(url)
}
