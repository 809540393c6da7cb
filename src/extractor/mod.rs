//! Turns one detail page into a [`ProductRecord`].
//!
//! Every field is resolved through its own [`FieldRule`]; a missing element only
//! costs that field, which falls back to `"N/A"`. A page is dropped only when
//! nothing at all could be read from it.

pub mod rules;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::config::{SiteConfig, compile_selector};
use crate::error::ConfigError;
use crate::html::element_text;
use crate::models::{NOT_AVAILABLE, ProductRecord};
use rules::{FieldRule, Strategy, last_component};

/// A dollar amount such as `$1,200` or `$12,500.50`.
static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+(?:\.\d+)?").expect("price pattern is valid"));

/// Attributes listed in the details table of a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Condition,
    Category,
    Make,
    Model,
    Year,
    SaleType,
}

impl Attribute {
    pub const ALL: [Self; 6] = [
        Self::Condition,
        Self::Category,
        Self::Make,
        Self::Model,
        Self::Year,
        Self::SaleType,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Condition => "Condition",
            Self::Category => "Category",
            Self::Make => "Make",
            Self::Model => "Model",
            Self::Year => "Year",
            Self::SaleType => "Type of Sale",
        }
    }

    /// Matches a label node such as `"Make:"`.
    pub fn from_label(text: &str) -> Option<Self> {
        let cleaned = text.trim().trim_end_matches(':').trim();
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.label().eq_ignore_ascii_case(cleaned))
    }
}

/// Attribute values read from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(HashMap<Attribute, String>);

impl Attributes {
    /// Walks the label/value nodes in document order. A node naming an attribute
    /// takes the following node's text as its value; the first occurrence of
    /// each attribute is kept.
    pub fn from_nodes(nodes: &[String]) -> Self {
        let mut values = HashMap::new();
        let mut i = 0;
        while i < nodes.len() {
            if let Some(attribute) = Attribute::from_label(&nodes[i])
                && let Some(value) = nodes.get(i + 1)
            {
                if !value.is_empty() {
                    values.entry(attribute).or_insert_with(|| value.clone());
                }
                i += 2;
            } else {
                i += 1;
            }
        }
        Self(values)
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.0.get(&attribute).map(String::as_str)
    }

    fn or_na(&self, attribute: Attribute) -> String {
        self.get(attribute).unwrap_or(NOT_AVAILABLE).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct DetailExtractor {
    title: FieldRule,
    price: FieldRule,
    seller: FieldRule,
    location: FieldRule,
    attribute_pair: Selector,
}

impl DetailExtractor {
    /// Compiles the detail-page rules from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSelector`] if any selector does not parse.
    pub fn new(config: &SiteConfig) -> Result<Self, ConfigError> {
        let selectors = &config.selectors;

        Ok(Self {
            title: FieldRule::new(
                "title",
                vec![Strategy::Selector(compile_selector("title", &selectors.title)?)],
            ),
            price: FieldRule::new(
                "price",
                vec![
                    Strategy::Selector(compile_selector("price", &selectors.price)?),
                    Strategy::Selector(compile_selector("tax-exclusive price", &selectors.price_ex_tax)?),
                    Strategy::Pattern {
                        scope: compile_selector("price container", &selectors.price_container)?,
                        pattern: PRICE_PATTERN.clone(),
                    },
                ],
            ),
            seller: FieldRule::new(
                "seller",
                vec![Strategy::Selector(compile_selector("seller", &selectors.seller)?)],
            ),
            location: FieldRule::new(
                "location",
                vec![Strategy::Derived {
                    scope: compile_selector("map trigger", &selectors.map_trigger)?,
                    derive: last_component,
                }],
            ),
            attribute_pair: compile_selector("attribute pair", &selectors.attribute_pair)?,
        })
    }

    /// Extracts a record from `detail_html`, or `None` when the page is blank or
    /// nothing in it could be read.
    pub fn extract(&self, detail_html: &str, source_url: &str) -> Option<ProductRecord> {
        if detail_html.trim().is_empty() {
            debug!("Empty body for {}", source_url);
            return None;
        }

        let document = Html::parse_document(detail_html);

        let [title, price, seller, location] = [&self.title, &self.price, &self.seller, &self.location]
            .map(|rule| {
                let value = rule.resolve(&document);
                if value.is_none() {
                    debug!("No {} on {}", rule.name, source_url);
                }
                value
            });

        let nodes: Vec<String> = document.select(&self.attribute_pair).map(element_text).collect();
        let attributes = Attributes::from_nodes(&nodes);

        if [&title, &price, &seller, &location].iter().all(|v| v.is_none()) && attributes.is_empty() {
            debug!("Nothing extractable on {}", source_url);
            return None;
        }

        let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Some(ProductRecord {
            brand: attributes.or_na(Attribute::Make),
            model: attributes.or_na(Attribute::Model),
            condition: attributes.or_na(Attribute::Condition),
            location: or_na(location),
            seller: or_na(seller),
            year: attributes.or_na(Attribute::Year),
            price: or_na(price),
            url: source_url.to_string(),
            title: or_na(title),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.machines4u.com.au/view/advert/1";

    fn extractor() -> DetailExtractor {
        DetailExtractor::new(&SiteConfig::default()).unwrap()
    }

    fn detail_page(price_box: &str) -> String {
        format!(
            r##"<html><body>
              <h1> Acme X1 Mini Excavator </h1>
              <div class="price-box">{price_box}</div>
              <div class="seller"><span class="business-name">Acme Machinery</span></div>
              <a class="map-trigger" href="#map">Wacol, Brisbane, QLD</a>
              <dl class="ad-attributes">
                <dt>Condition:</dt><dd>Used</dd>
                <dt>Category:</dt><dd>Excavators</dd>
                <dt>Make:</dt><dd>Acme</dd>
                <dt>Model:</dt><dd>X1</dd>
                <dt>Year:</dt><dd>2019</dd>
                <dt>Type of Sale:</dt><dd>Dealer</dd>
                <dt>Hours:</dt><dd>1,200</dd>
              </dl>
            </body></html>"##
        )
    }

    #[test]
    fn extracts_every_field() {
        let record = extractor()
            .extract(&detail_page(r#"<span class="price">$1,200</span>"#), URL)
            .unwrap();

        assert_eq!(
            record,
            ProductRecord {
                brand: "Acme".to_string(),
                model: "X1".to_string(),
                condition: "Used".to_string(),
                location: "QLD".to_string(),
                seller: "Acme Machinery".to_string(),
                year: "2019".to_string(),
                price: "$1,200".to_string(),
                url: URL.to_string(),
                title: "Acme X1 Mini Excavator".to_string(),
            }
        );
    }

    #[test]
    fn tax_exclusive_price_is_used_when_primary_is_missing() {
        let record = extractor()
            .extract(&detail_page(r#"<span class="price-ex-gst">$1,090 ex GST</span>"#), URL)
            .unwrap();
        assert_eq!(record.price, "$1,090 ex GST");
    }

    #[test]
    fn price_falls_back_to_dollar_amount_in_container() {
        let record = extractor()
            .extract(&detail_page("Price: <strong>$45,000</strong> + GST"), URL)
            .unwrap();
        assert_eq!(record.price, "$45,000");
    }

    #[test]
    fn price_pattern_matches_whole_dollar_amounts() {
        let found: Vec<&str> = PRICE_PATTERN
            .find_iter("was $13,000.00 now $12,500 (ex GST)")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["$13,000.00", "$12,500"]);
    }

    #[test]
    fn missing_fields_degrade_to_na() {
        let html = r#"<html><body><h1>Old Tractor</h1><a class="map-trigger">Toowoomba</a></body></html>"#;
        let record = extractor().extract(html, URL).unwrap();

        assert_eq!(record.title, "Old Tractor");
        assert_eq!(record.location, "Toowoomba");
        assert_eq!(record.price, NOT_AVAILABLE);
        assert_eq!(record.seller, NOT_AVAILABLE);
        assert_eq!(record.brand, NOT_AVAILABLE);
        assert_eq!(record.year, NOT_AVAILABLE);
    }

    #[test]
    fn page_with_nothing_extractable_is_dropped() {
        let html = "<html><body><p>Access denied</p></body></html>";
        assert_eq!(extractor().extract(html, URL), None);
    }

    #[test]
    fn blank_body_is_dropped() {
        assert_eq!(extractor().extract("  \n ", URL), None);
    }

    #[test]
    fn extraction_is_idempotent() {
        let html = detail_page(r#"<span class="price">$1,200</span>"#);
        let extractor = extractor();
        assert_eq!(extractor.extract(&html, URL), extractor.extract(&html, URL));
    }

    #[test]
    fn attribute_labels_take_the_next_node() {
        let nodes: Vec<String> = ["Make:", "Acme", "Colour:", "Yellow", "model", "X1", "Make", "Other"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let attributes = Attributes::from_nodes(&nodes);

        assert_eq!(attributes.get(Attribute::Make), Some("Acme"));
        assert_eq!(attributes.get(Attribute::Model), Some("X1"));
        assert_eq!(attributes.get(Attribute::Year), None);
    }

    #[test]
    fn value_is_not_reread_as_a_label() {
        let nodes: Vec<String> = ["Category:", "Year", "Year:", "2015"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let attributes = Attributes::from_nodes(&nodes);

        assert_eq!(attributes.get(Attribute::Category), Some("Year"));
        assert_eq!(attributes.get(Attribute::Year), Some("2015"));
    }

    #[test]
    fn trailing_label_without_value_is_ignored() {
        let nodes = vec!["Condition:".to_string()];
        assert!(Attributes::from_nodes(&nodes).is_empty());
    }

    #[test]
    fn sale_type_and_category_are_read_but_not_exported() {
        let html = detail_page("");
        let document = Html::parse_document(&html);
        let nodes: Vec<String> = document
            .select(&Selector::parse("dl.ad-attributes dt, dl.ad-attributes dd").unwrap())
            .map(element_text)
            .collect();
        let attributes = Attributes::from_nodes(&nodes);

        assert_eq!(attributes.get(Attribute::SaleType), Some("Dealer"));
        assert_eq!(attributes.get(Attribute::Category), Some("Excavators"));
    }
}
