//! Owned, normalized tree of the statistics XML document.
//!
//! The name server prints repeated entries as sibling elements sharing a
//! name. A generic XML-to-dictionary conversion turns one such element into a
//! map and two or more into a list; here every lookup by name returns a
//! sequence instead, so callers never branch on cardinality.

/// Error type for document parsing and required-subtree lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Response body is not valid UTF-8.
    Encoding(String),
    /// Response body is not well-formed XML.
    Malformed(String),
    /// A subtree that an extractor cannot do without is absent.
    MissingSubtree(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Encoding(msg) => write!(f, "invalid encoding: {}", msg),
            ParseError::Malformed(msg) => write!(f, "malformed XML: {}", msg),
            ParseError::MissingSubtree(path) => write!(f, "missing subtree: {}", path),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::str::Utf8Error> for ParseError {
    fn from(e: std::str::Utf8Error) -> Self {
        ParseError::Encoding(e.to_string())
    }
}

impl From<roxmltree::Error> for ParseError {
    fn from(e: roxmltree::Error) -> Self {
        ParseError::Malformed(e.to_string())
    }
}

/// A single XML element with its attributes, trimmed text and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an empty element; used by builders and tests.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed text content, `None` when the element is empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All child elements named `name`, in document order.
    ///
    /// One, many and zero occurrences are all just sequences.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Element::text)
    }

    /// Descends through first matches of each path segment.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |node, segment| node.child(segment))
    }

    /// Every element matched by `path`, where the last segment may repeat.
    ///
    /// `find_all(&["contexts", "context"])` yields each `context` below the
    /// first `contexts`.
    pub fn find_all<'a>(&'a self, path: &'a [&'a str]) -> Box<dyn Iterator<Item = &'a Element> + 'a> {
        match path.split_last() {
            None => Box::new(std::iter::once(self)),
            Some((last, parents)) => match self.find(parents) {
                Some(parent) => Box::new(parent.children(last)),
                None => Box::new(std::iter::empty()),
            },
        }
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut text = String::new();
        let mut children = Vec::new();

        for child in node.children() {
            if child.is_element() {
                children.push(Self::from_node(child));
            } else if child.is_text()
                && let Some(t) = child.text()
            {
                text.push_str(t);
            }
        }

        let text = text.trim();
        Self {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            text: (!text.is_empty()).then(|| text.to_string()),
            children,
        }
    }
}

/// Parsed statistics document, shared read-only by all extractors of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsDocument {
    root: Element,
}

impl StatsDocument {
    /// Path of the statistics subtree below the `isc` root element.
    pub const STATISTICS_PATH: &'static [&'static str] = &["bind", "statistics"];

    /// Parses a raw response body.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(bytes)?;
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        Ok(Self {
            root: Element::from_node(doc.root_element()),
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The `isc/bind/statistics` element, if the document has one.
    pub fn statistics(&self) -> Option<&Element> {
        if self.root.name() != "isc" {
            return None;
        }
        self.root.find(Self::STATISTICS_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statistics_root() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<?xml-stylesheet type="text/xsl" href="/bind9.xsl"?>
<isc version="1.0">
  <bind>
    <statistics version="2.2">
      <views><view><name>_default</name></view></views>
    </statistics>
  </bind>
</isc>"#;
        let doc = StatsDocument::parse(xml).unwrap();
        let stats = doc.statistics().unwrap();
        assert_eq!(stats.attribute("version"), Some("2.2"));

        let views: Vec<_> = stats.find_all(&["views", "view"]).collect();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].child_text("name"), Some("_default"));
    }

    #[test]
    fn test_single_and_repeated_children_are_sequences() {
        let doc = StatsDocument::parse(b"<r><a>1</a><b>2</b><b>3</b></r>").unwrap();
        let root = doc.root();
        assert_eq!(root.children("a").count(), 1);
        assert_eq!(root.children("b").count(), 2);
        assert_eq!(root.children("c").count(), 0);
    }

    #[test]
    fn test_empty_element_has_no_text() {
        let doc = StatsDocument::parse(b"<r><requests/><x>  </x></r>").unwrap();
        assert!(doc.root().child("requests").is_some());
        assert_eq!(doc.root().child_text("requests"), None);
        assert_eq!(doc.root().child_text("x"), None);
    }

    #[test]
    fn test_malformed_xml() {
        let err = StatsDocument::parse(b"<isc><bind></isc>").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = StatsDocument::parse(&[0x3c, 0xff, 0xfe, 0x3e]).unwrap_err();
        assert!(matches!(err, ParseError::Encoding(_)));
    }

    #[test]
    fn test_wrong_root_has_no_statistics() {
        let doc = StatsDocument::parse(b"<html><body>Not Found</body></html>").unwrap();
        assert!(doc.statistics().is_none());
    }

    #[test]
    fn test_find_all_missing_parent() {
        let doc = StatsDocument::parse(b"<r/>").unwrap();
        assert_eq!(doc.root().find_all(&["views", "view"]).count(), 0);
    }
}
