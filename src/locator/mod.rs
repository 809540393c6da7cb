//! Finds the detail-page links of the current results on a listing page.
//!
//! Listing pages render several visually similar blocks (featured, sponsored,
//! the actual results) as siblings separated by header elements. Only the
//! block under an accepted header is read; the rest of the page is ignored
//! even when it contains links that look like results.

pub mod sections;

use std::collections::HashSet;
use std::fmt;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{SiteConfig, compile_selector};
use crate::error::ConfigError;
use crate::html::element_text;
use sections::{Section, Tagged, fold_sections, qualifying_section};

/// Why a listing page produced no detail URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralMiss {
    /// No section header matched the accepted labels
    HeaderNotFound,
    /// The accepted section exists but holds no detail links
    SectionEmpty,
}

impl fmt::Display for StructuralMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderNotFound => f.write_str("header not found"),
            Self::SectionEmpty => f.write_str("section empty"),
        }
    }
}

/// Result of locating links on one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Absolute, normalized detail URLs in first-seen order
    pub urls: Vec<String>,
    /// Set whenever `urls` is empty
    pub miss: Option<StructuralMiss>,
}

impl Located {
    fn missing(reason: StructuralMiss) -> Self {
        Self {
            urls: Vec::new(),
            miss: Some(reason),
        }
    }
}

pub struct ListingLocator {
    base: Url,
    container: Option<Selector>,
    header: Selector,
    detail_link: Selector,
    accepted_labels: Vec<String>,
    keep_query: bool,
}

impl ListingLocator {
    /// Compiles the listing selectors from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the base URL or any selector is invalid.
    pub fn new(config: &SiteConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let selectors = &config.selectors;
        let container = selectors
            .listing_container
            .as_deref()
            .map(|s| compile_selector("listing container", s))
            .transpose()?;

        Ok(Self {
            base,
            container,
            header: compile_selector("section header", &selectors.section_header)?,
            detail_link: compile_selector("detail link", &selectors.detail_link)?,
            accepted_labels: config.accepted_labels.clone(),
            keep_query: config.keep_query,
        })
    }

    /// Returns the detail URLs of the first accepted section. Never fails: a page
    /// without a usable section yields an empty list and the reason.
    pub fn locate(&self, listing_html: &str) -> Located {
        let document = Html::parse_document(listing_html);

        let containers = self.find_containers(&document);
        if containers.is_empty() {
            warn!("No section headers found on listing page");
            return Located::missing(StructuralMiss::HeaderNotFound);
        }

        let sections: Vec<Section<ElementRef<'_>>> = containers
            .into_iter()
            .flat_map(|container| fold_sections(self.tag_children(container)))
            .collect();
        debug!("Listing page split into {} sections", sections.len());

        let Some(section) = qualifying_section(&sections, &self.accepted_labels) else {
            let headers: Vec<&str> = sections.iter().filter_map(|s| s.header.as_deref()).collect();
            warn!("No accepted section header among {:?}", headers);
            return Located::missing(StructuralMiss::HeaderNotFound);
        };

        let urls = self.collect_links(section);
        if urls.is_empty() {
            warn!(
                "Section \"{}\" contains no detail links",
                section.header.as_deref().unwrap_or_default()
            );
            return Located::missing(StructuralMiss::SectionEmpty);
        }

        info!(
            "Found {} detail links under \"{}\"",
            urls.len(),
            section.header.as_deref().unwrap_or_default()
        );
        Located { urls, miss: None }
    }

    /// Elements whose children are partitioned: the configured container, or
    /// every distinct parent of a header marker in document order.
    fn find_containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        if let Some(container) = &self.container {
            return document.select(container).next().into_iter().collect();
        }

        let mut parents: Vec<ElementRef<'a>> = Vec::new();
        for parent in document
            .select(&self.header)
            .filter_map(|header| header.parent().and_then(ElementRef::wrap))
        {
            if !parents.iter().any(|seen| seen.id() == parent.id()) {
                parents.push(parent);
            }
        }
        parents
    }

    fn tag_children<'a>(&self, container: ElementRef<'a>) -> Vec<Tagged<ElementRef<'a>>> {
        container
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| {
                if self.header.matches(&child) {
                    Tagged::Header(element_text(child))
                } else {
                    Tagged::Content(child)
                }
            })
            .collect()
    }

    fn collect_links(&self, section: &Section<ElementRef<'_>>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        let links = section.members.iter().flat_map(|member| {
            let own = self.detail_link.matches(member).then_some(*member);
            own.into_iter().chain(member.select(&self.detail_link))
        });

        for link in links {
            let Some(url) = link
                .value()
                .attr("href")
                .and_then(|href| normalize_url(&self.base, href, self.keep_query))
            else {
                continue;
            };
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }

        urls
    }
}

/// Resolves `href` against `base` and strips the fragment (and the query unless
/// `keep_query` is set) so that relative, protocol-relative and absolute forms
/// of one page compare equal.
pub fn normalize_url(base: &Url, href: &str, keep_query: bool) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    if !keep_query {
        url.set_query(None);
    }
    url.set_fragment(None);
    Some(url.into())
}
