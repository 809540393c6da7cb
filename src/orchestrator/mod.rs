//! Fans detail-page fetches out according to the configured [`FanOut`] policy
//! and hands each body to the extractor.
//!
//! A failing URL never stops the others: transport failures, pages with
//! nothing to extract and panicking extractions are logged and counted, and
//! the URL is left out of the result.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream;
use tracing::{info, warn};

use crate::config::FanOut;
use crate::extractor::DetailExtractor;
use crate::fetcher::PageFetcher;
use crate::models::ProductRecord;

/// Terminal state of one detail URL.
#[derive(Debug)]
enum Outcome {
    Extracted(ProductRecord),
    Unparsed,
    FetchFailed,
}

/// Records gathered from a set of detail pages.
#[derive(Debug, Default)]
pub struct Harvest {
    pub records: Vec<ProductRecord>,
    pub failed_fetches: usize,
    pub unparsed: usize,
}

impl Harvest {
    fn collect(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut harvest, outcome| {
                match outcome {
                    Outcome::Extracted(record) => harvest.records.push(record),
                    Outcome::Unparsed => harvest.unparsed += 1,
                    Outcome::FetchFailed => harvest.failed_fetches += 1,
                }
                harvest
            })
    }
}

pub struct Orchestrator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<DetailExtractor>,
    fan_out: FanOut,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: Arc<DetailExtractor>, fan_out: FanOut) -> Self {
        Self {
            fetcher,
            extractor,
            fan_out,
        }
    }

    /// Fetches and extracts every URL. Output order is not guaranteed to follow
    /// `urls` in concurrent mode.
    pub async fn harvest(&self, urls: &[String]) -> Harvest {
        let outcomes = match &self.fan_out {
            FanOut::Concurrent { limit: Some(limit) } => {
                stream::iter(urls)
                    .map(|url| self.process(url))
                    .buffer_unordered((*limit).max(1))
                    .collect::<Vec<_>>()
                    .await
            }
            FanOut::Concurrent { limit: None } => join_all(urls.iter().map(|url| self.process(url))).await,
            FanOut::Sequential { delay } => {
                let mut outcomes = Vec::with_capacity(urls.len());
                for (i, url) in urls.iter().enumerate() {
                    if i > 0 {
                        tokio::time::sleep(*delay).await;
                    }
                    outcomes.push(self.process(url).await);
                }
                outcomes
            }
        };

        let harvest = Harvest::collect(outcomes);
        info!(
            "Extracted {} records from {} detail pages ({} fetch failures, {} unparsed)",
            harvest.records.len(),
            urls.len(),
            harvest.failed_fetches,
            harvest.unparsed
        );
        harvest
    }

    async fn process(&self, url: &str) -> Outcome {
        let body = match self.fetcher.fetch_text(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                return Outcome::FetchFailed;
            }
        };

        let extractor = Arc::clone(&self.extractor);
        let source_url = url.to_string();
        match tokio::task::spawn_blocking(move || extractor.extract(&body, &source_url)).await {
            Ok(Some(record)) => Outcome::Extracted(record),
            Ok(None) => {
                warn!("Nothing extractable on {}", url);
                Outcome::Unparsed
            }
            Err(e) => {
                warn!("Extraction of {} aborted: {}", url, e);
                Outcome::Unparsed
            }
        }
    }
}
