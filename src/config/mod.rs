//! Site configuration: origin, HTTP identity, fan-out policy and the CSS
//! selectors the locator and extractor are built from.

use std::env::VarError;
use std::time::Duration;

use scraper::Selector;

use crate::error::ConfigError;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// How the detail-page fetches of one job are scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanOut {
    /// Fetch everything at once. `limit` bounds the number of requests in
    /// flight; `None` fires all of them and waits on the whole set.
    Concurrent { limit: Option<usize> },
    /// One request at a time with a pause between consecutive requests.
    Sequential { delay: Duration },
}

impl Default for FanOut {
    fn default() -> Self {
        Self::Sequential {
            delay: Duration::from_millis(500),
        }
    }
}

/// Configuration for one target site
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Display name for the website
    pub name: String,
    /// Origin that relative links are resolved against and listing URLs must belong to
    pub base_url: String,
    /// Sent on every outbound request
    pub user_agent: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Section headers that mark the current results (case-insensitive, substring match)
    pub accepted_labels: Vec<String>,
    /// Keep the query string when normalizing detail URLs, for sites that
    /// identify adverts by a query parameter
    pub keep_query: bool,
    pub fan_out: FanOut,
    /// Additional attempts after a transient failure. Zero disables retrying.
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries
    pub backoff: Duration,
    pub selectors: SiteSelectors,
}

/// CSS selectors for listing and detail pages
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Element whose children are partitioned into sections. When unset, every
    /// element directly holding a section header is partitioned.
    pub listing_container: Option<String>,
    /// Marker that starts a new section
    pub section_header: String,
    /// Links to detail pages inside a section
    pub detail_link: String,
    /// Detail page heading
    pub title: String,
    /// Primary price element
    pub price: String,
    /// Tax-exclusive price shown when no primary price is rendered
    pub price_ex_tax: String,
    /// Element whose full text is searched for a dollar amount as a last resort
    pub price_container: String,
    /// Business name of the seller
    pub seller: String,
    /// Element opening the location map; its text holds the address
    pub map_trigger: String,
    /// Flat label/value sequence of the details table
    pub attribute_pair: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            listing_container: None,
            section_header: ".section-header, h2.section-title".to_string(),
            detail_link: "a[href*='/view/advert/']".to_string(),
            title: "h1".to_string(),
            price: ".price-box .price".to_string(),
            price_ex_tax: ".price-box .price-ex-gst".to_string(),
            price_container: ".price-box".to_string(),
            seller: ".business-name".to_string(),
            map_trigger: ".map-trigger".to_string(),
            attribute_pair: "dl.ad-attributes dt, dl.ad-attributes dd".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Machines4U".to_string(),
            base_url: "https://www.machines4u.com.au".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout_secs: 20,
            accepted_labels: vec!["Listings".to_string(), "Search Results".to_string()],
            keep_query: false,
            fan_out: FanOut::default(),
            max_retries: 0,
            backoff: Duration::from_millis(1000),
            selectors: SiteSelectors::default(),
        }
    }
}

impl SiteConfig {
    /// Builds the configuration from `FINDER_*` environment variables, falling
    /// back to the Machines4U defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] when a numeric or enum variable
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Same as [`SiteConfig::from_env`] but reads through `lookup`, so tests can
    /// feed a plain map instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let defaults = Self::default();

        let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
            match lookup(var) {
                Ok(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
                Err(_) => Ok(default),
            }
        };

        let base_url = lookup("FINDER_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let user_agent = lookup("FINDER_USER_AGENT").unwrap_or(defaults.user_agent);
        let timeout_secs = parse_u64("FINDER_TIMEOUT_SECS", defaults.timeout_secs)?;

        let accepted_labels = match lookup("FINDER_ACCEPTED_LABELS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => defaults.accepted_labels,
        };

        let keep_query = match lookup("FINDER_KEEP_QUERY").as_deref().map(str::trim) {
            Ok("1" | "true") => true,
            Ok("0" | "false") | Err(_) => false,
            Ok(other) => {
                return Err(ConfigError::InvalidEnvVar {
                    var: "FINDER_KEEP_QUERY".to_string(),
                    reason: format!("expected \"true\" or \"false\", got \"{other}\""),
                });
            }
        };

        let delay = Duration::from_millis(parse_u64("FINDER_REQUEST_DELAY_MS", 500)?);
        let fan_out = match lookup("FINDER_FAN_OUT").as_deref().map(str::trim) {
            Ok("concurrent") => {
                let limit = parse_u64("FINDER_CONCURRENCY", 0)?;
                FanOut::Concurrent {
                    limit: (limit > 0).then(|| usize::try_from(limit).unwrap_or(usize::MAX)),
                }
            }
            Ok("sequential") | Err(_) => FanOut::Sequential { delay },
            Ok(other) => {
                return Err(ConfigError::InvalidEnvVar {
                    var: "FINDER_FAN_OUT".to_string(),
                    reason: format!("expected \"sequential\" or \"concurrent\", got \"{other}\""),
                });
            }
        };

        let max_retries = parse_u64("FINDER_MAX_RETRIES", 0)?;
        let max_retries = u32::try_from(max_retries).map_err(|e| ConfigError::InvalidEnvVar {
            var: "FINDER_MAX_RETRIES".to_string(),
            reason: e.to_string(),
        })?;
        let backoff = Duration::from_millis(parse_u64("FINDER_BACKOFF_MS", 1000)?);

        Ok(Self {
            base_url,
            user_agent,
            timeout_secs,
            accepted_labels,
            keep_query,
            fan_out,
            max_retries,
            backoff,
            ..defaults
        })
    }
}

/// Parses a configured selector, naming it in the error.
pub(crate) fn compile_selector(name: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        name,
        selector: selector.to_string(),
    })
}
