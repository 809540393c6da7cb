use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use machine_finder::export::{output_filename, write_json};
use machine_finder::{MachineFinder, SiteConfig, validate_listing_url};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let listing_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FINDER_URL").ok())
        .unwrap_or_default();

    let config = SiteConfig::from_env()?;
    let url = validate_listing_url(&config, &listing_url)?;

    info!("Starting {} scrape", config.name);

    let finder = MachineFinder::new(&config)?;
    let output = finder
        .run_job(url.as_str())
        .await
        .with_context(|| format!("scrape of {url} failed"))?;

    if let Some(diagnostic) = &output.diagnostic {
        warn!("No products scraped: {}", diagnostic);
    }
    if output.failed_fetches > 0 {
        warn!("{} detail pages could not be fetched", output.failed_fetches);
    }

    let path = PathBuf::from(output_filename(
        url.as_str(),
        output.scraped_at.with_timezone(&Local).date_naive(),
        "json",
    ));
    write_json(&path, &output.records)?;

    info!(
        "Scraping complete: {} items written to {}",
        output.records.len(),
        path.display()
    );
    Ok(())
}
