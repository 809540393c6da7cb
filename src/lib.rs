//! Scrapes product records from Machines4U-style listing sites: the results
//! section of a listing page is located, each linked detail page is fetched,
//! and a fixed set of fields is extracted from it.

pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod fetcher;
mod html;
pub mod locator;
pub mod machine_finder;
pub mod models;
pub mod orchestrator;

pub use config::{FanOut, SiteConfig, SiteSelectors};
pub use error::{ConfigError, FetchError, JobError};
pub use extractor::DetailExtractor;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use locator::{ListingLocator, Located, StructuralMiss};
pub use machine_finder::{MachineFinder, validate_listing_url};
pub use models::{JobOutput, NOT_AVAILABLE, ProductRecord};
