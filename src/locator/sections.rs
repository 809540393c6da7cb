//! Partitioning a flat run of sibling nodes into header-delimited sections.
//!
//! The DOM walk only tags each node as a header or as content; folding the
//! tagged sequence into sections is a pure function over any node type.

/// One sibling node, classified by the DOM pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tagged<T> {
    /// A section marker carrying its cleaned label text
    Header(String),
    Content(T),
}

/// A contiguous run of content nodes following one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<T> {
    /// `None` for the nodes that precede the first header
    pub header: Option<String>,
    pub members: Vec<T>,
}

/// Folds tagged siblings into sections. Every content node lands in exactly one
/// section, in document order; a header with nothing after it still produces an
/// (empty) section.
pub fn fold_sections<T>(items: impl IntoIterator<Item = Tagged<T>>) -> Vec<Section<T>> {
    items
        .into_iter()
        .fold(Vec::new(), |mut sections: Vec<Section<T>>, item| {
            match item {
                Tagged::Header(label) => sections.push(Section {
                    header: Some(label),
                    members: Vec::new(),
                }),
                Tagged::Content(node) => match sections.last_mut() {
                    Some(section) => section.members.push(node),
                    None => sections.push(Section {
                        header: None,
                        members: vec![node],
                    }),
                },
            }
            sections
        })
}

/// Case-insensitive match of a header label against the accepted set: the
/// header qualifies when it contains any accepted label.
pub fn label_matches(header: &str, accepted: &[String]) -> bool {
    let header = header.to_lowercase();
    accepted
        .iter()
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .any(|label| header.contains(&label))
}

/// First section, in document order, whose header is accepted.
pub fn qualifying_section<'s, T>(sections: &'s [Section<T>], accepted: &[String]) -> Option<&'s Section<T>> {
    sections.iter().find(|section| {
        section
            .header
            .as_deref()
            .is_some_and(|header| label_matches(header, accepted))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(label: &str) -> Tagged<u32> {
        Tagged::Header(label.to_string())
    }

    fn labels() -> Vec<String> {
        vec!["Listings".to_string(), "Search Results".to_string()]
    }

    #[test]
    fn content_is_split_at_each_header() {
        let sections = fold_sections(vec![
            header("Featured"),
            Tagged::Content(1),
            Tagged::Content(2),
            header("Search Results"),
            Tagged::Content(3),
            header("Sponsored"),
            Tagged::Content(4),
        ]);

        assert_eq!(
            sections,
            vec![
                Section { header: Some("Featured".to_string()), members: vec![1, 2] },
                Section { header: Some("Search Results".to_string()), members: vec![3] },
                Section { header: Some("Sponsored".to_string()), members: vec![4] },
            ]
        );
    }

    #[test]
    fn leading_content_forms_a_headerless_section() {
        let sections = fold_sections(vec![Tagged::Content(1), header("Listings"), Tagged::Content(2)]);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].header, None);
        assert_eq!(sections[0].members, vec![1]);
        assert_eq!(sections[1].members, vec![2]);
    }

    #[test]
    fn consecutive_headers_produce_an_empty_section() {
        let sections = fold_sections(vec![header("Listings"), header("Sponsored"), Tagged::Content(7)]);
        assert!(sections[0].members.is_empty());
        assert_eq!(sections[1].members, vec![7]);
    }

    #[test]
    fn every_content_node_is_kept_once() {
        let items: Vec<Tagged<u32>> = (0..20)
            .map(|i| if i % 6 == 0 { header("h") } else { Tagged::Content(i) })
            .collect();
        let members: Vec<u32> = fold_sections(items).into_iter().flat_map(|s| s.members).collect();
        let expected: Vec<u32> = (0..20).filter(|i| i % 6 != 0).collect();
        assert_eq!(members, expected);
    }

    #[test]
    fn empty_input_yields_no_sections() {
        assert!(fold_sections(Vec::<Tagged<u32>>::new()).is_empty());
    }

    #[test]
    fn labels_match_case_insensitively_and_by_substring() {
        assert!(label_matches("SEARCH RESULTS", &labels()));
        assert!(label_matches("Search Results (42 found)", &labels()));
        assert!(label_matches("listings", &labels()));
        assert!(!label_matches("Featured Ads", &labels()));
        assert!(!label_matches("Anything", &[String::new()]));
    }

    #[test]
    fn first_qualifying_section_wins() {
        let sections = fold_sections(vec![
            Tagged::Content(0),
            header("Sponsored"),
            Tagged::Content(1),
            header("Listings"),
            Tagged::Content(2),
            header("More Listings"),
            Tagged::Content(3),
        ]);
        let section = qualifying_section(&sections, &labels()).unwrap();
        assert_eq!(section.members, vec![2]);
    }

    #[test]
    fn headerless_preamble_never_qualifies() {
        let sections = fold_sections(vec![Tagged::Content(1), Tagged::Content(2)]);
        assert!(qualifying_section(&sections, &labels()).is_none());
    }
}
