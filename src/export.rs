//! Naming and writing of job output files.

use std::path::Path;

use chrono::NaiveDate;
use url::Url;

use crate::models::ProductRecord;

const FALLBACK_STEM: &str = "machines4u-scrape";

/// File name for the records of `listing_url`, built from the last two path
/// segments and `date`, e.g. `excavators-mini-2026-10-16.json`.
pub fn output_filename(listing_url: &str, date: NaiveDate, extension: &str) -> String {
    let date = date.format("%Y-%m-%d");
    let Ok(url) = Url::parse(listing_url) else {
        return format!("{FALLBACK_STEM}-{date}.{extension}");
    };

    let parts: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|part| !part.is_empty())
                .map(|part| {
                    urlencoding::decode(part)
                        .map_or_else(|_| part.to_string(), |decoded| decoded.into_owned())
                        .replace(|c: char| c.is_whitespace() || c == '/', "-")
                })
                .collect()
        })
        .unwrap_or_default();

    let stem = match parts.as_slice() {
        [] => FALLBACK_STEM.to_string(),
        [only] => only.clone(),
        [.., second_last, last] => format!("{second_last}-{last}"),
    };

    format!("{stem}-{date}.{extension}")
}

/// Writes `records` as a JSON array to `path`.
///
/// # Errors
///
/// Returns an error if serialisation or the write fails.
pub fn write_json(path: &Path, records: &[ProductRecord]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}
