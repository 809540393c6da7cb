use scraper::ElementRef;

/// Text content of `element` with runs of whitespace collapsed to single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn nested_text_is_joined_and_collapsed() {
        let html = Html::parse_fragment("<p>  Search \n <b>Results</b>\t(12) </p>");
        let p = html.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(element_text(p), "Search Results (12)");
    }
}
