//! Data models for extracted product records and job results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for a field the page did not expose.
pub const NOT_AVAILABLE: &str = "N/A";

/// One product scraped from a detail page.
///
/// Field order is the export column order; serde keeps it when serialising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Condition")]
    pub condition: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Seller")]
    pub seller: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "AD Title")]
    pub title: String,
}

impl ProductRecord {
    pub const COLUMNS: [&'static str; 9] = [
        "Brand",
        "Model",
        "Condition",
        "Location",
        "Seller",
        "Year",
        "Price",
        "URL",
        "AD Title",
    ];
}

/// Everything one listing job produced.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutput {
    pub records: Vec<ProductRecord>,
    /// Why `records` is empty when the listing page had no usable section
    pub diagnostic: Option<String>,
    /// Detail pages that could not be fetched
    pub failed_fetches: usize,
    pub scraped_at: DateTime<Utc>,
}
