//! Ordered fallback chains for resolving one field from a detail page.

use regex::Regex;
use scraper::{Html, Selector};

use crate::html::element_text;

/// One way of reading a field. Each strategy looks at the first element its
/// selector matches and yields nothing when that element is absent or blank.
#[derive(Clone)]
pub enum Strategy {
    /// Text of the element
    Selector(Selector),
    /// First match of `pattern` in the element's full text
    Pattern { scope: Selector, pattern: Regex },
    /// Element text passed through `derive`
    Derived {
        scope: Selector,
        derive: fn(&str) -> Option<String>,
    },
}

impl Strategy {
    pub fn resolve(&self, document: &Html) -> Option<String> {
        let found = match self {
            Self::Selector(selector) => document.select(selector).next().map(element_text),
            Self::Pattern { scope, pattern } => document
                .select(scope)
                .next()
                .map(element_text)
                .and_then(|text| pattern.find(&text).map(|m| m.as_str().to_string())),
            Self::Derived { scope, derive } => document
                .select(scope)
                .next()
                .map(element_text)
                .and_then(|text| derive(&text)),
        };
        found.filter(|value| !value.trim().is_empty())
    }
}

/// A named field and the strategies tried for it, in order.
#[derive(Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub strategies: Vec<Strategy>,
}

impl FieldRule {
    pub fn new(name: &'static str, strategies: Vec<Strategy>) -> Self {
        Self { name, strategies }
    }

    /// Value from the first strategy that finds one.
    pub fn resolve(&self, document: &Html) -> Option<String> {
        first_success(&self.strategies, |strategy| strategy.resolve(document))
    }
}

/// Runs `attempt` over `candidates` in order and returns the first hit.
pub fn first_success<I, T, F>(candidates: I, attempt: F) -> Option<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Option<T>,
{
    candidates.into_iter().find_map(attempt)
}

/// Last non-empty comma-separated component, e.g. the state in
/// `"Brisbane, QLD"`; the whole text when there is no comma.
pub fn last_component(text: &str) -> Option<String> {
    text.split(',')
        .map(str::trim)
        .rev()
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    fn price_rule() -> FieldRule {
        FieldRule::new(
            "price",
            vec![
                Strategy::Selector(sel(".price")),
                Strategy::Selector(sel(".price-ex-gst")),
                Strategy::Pattern {
                    scope: sel(".price-box"),
                    pattern: Regex::new(r"\$[\d,]+(?:\.\d+)?").unwrap(),
                },
            ],
        )
    }

    #[test]
    fn first_strategy_with_a_value_wins() {
        let doc = Html::parse_document(
            r#"<div class="price-box"><span class="price">$900</span><span class="price-ex-gst">$818</span></div>"#,
        );
        assert_eq!(price_rule().resolve(&doc).as_deref(), Some("$900"));
    }

    #[test]
    fn blank_primary_falls_through_to_the_next_strategy() {
        let doc = Html::parse_document(
            r#"<div class="price-box"><span class="price">  </span><span class="price-ex-gst">$818</span></div>"#,
        );
        assert_eq!(price_rule().resolve(&doc).as_deref(), Some("$818"));
    }

    #[test]
    fn pattern_reads_the_container_text() {
        let doc = Html::parse_document(
            r#"<div class="price-box">Asking <b>$12,500.50</b> ono</div>"#,
        );
        assert_eq!(price_rule().resolve(&doc).as_deref(), Some("$12,500.50"));
    }

    #[test]
    fn exhausted_chain_yields_none() {
        let doc = Html::parse_document(r#"<div class="price-box">Contact seller</div>"#);
        assert_eq!(price_rule().resolve(&doc), None);
    }

    #[test]
    fn derived_strategy_transforms_the_text() {
        let rule = FieldRule::new(
            "location",
            vec![Strategy::Derived {
                scope: sel(".map-trigger"),
                derive: last_component,
            }],
        );
        let doc = Html::parse_document(r#"<a class="map-trigger">Wacol, Brisbane, QLD</a>"#);
        assert_eq!(rule.resolve(&doc).as_deref(), Some("QLD"));
    }

    #[test]
    fn last_component_handles_missing_commas_and_trailing_separators() {
        assert_eq!(last_component("Perth").as_deref(), Some("Perth"));
        assert_eq!(last_component("Dubbo, NSW, ").as_deref(), Some("NSW"));
        assert_eq!(last_component(" , "), None);
    }

    #[test]
    fn first_success_stops_at_the_first_hit() {
        let mut tried = Vec::new();
        let hit = first_success([1, 2, 3, 4], |n| {
            tried.push(n);
            (n % 2 == 0).then_some(n * 10)
        });
        assert_eq!(hit, Some(20));
        assert_eq!(tried, vec![1, 2]);
    }
}
