//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;
use unicode_normalization::UnicodeNormalization;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use eforms_ocds::xml::get_tag_name;
///
/// let xml = r#"<cbc:ID xmlns:cbc="urn:x">LOT-0001</cbc:ID>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "ID");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use eforms_ocds::xml::find_child;
///
/// let xml = r#"<root><child1/><child2/></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "child1").is_some());
/// assert!(find_child(root, "missing").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Concatenate all descendant text of a node.
///
/// For `<a>x<b>y</b>z</a>` this returns `xyz`.
pub fn string_value(node: Node<'_, '_>) -> String {
    if node.is_text() {
        return node.text().unwrap_or_default().to_string();
    }
    node.descendants()
        .filter(|d| d.is_text())
        .filter_map(|d| d.text())
        .collect()
}

/// Normalize extracted text: NFC composition, collapsed whitespace, trimmed.
///
/// # Examples
/// ```
/// use eforms_ocds::xml::normalize_text;
///
/// assert_eq!(normalize_text("  Road\n   works "), "Road works");
/// ```
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Get the normalized text content of a node, or `None` when empty.
pub fn get_text(node: Node<'_, '_>) -> Option<String> {
    let text = normalize_text(&string_value(node));
    (!text.is_empty()).then_some(text)
}

/// Find the identifier of the closest enclosing entity.
///
/// Walks up from `node` (inclusive) and returns the text of the first
/// direct `ID` child found. Used to attach a value to the lot, result or
/// tender it belongs to.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use eforms_ocds::xml::nearest_identifier;
///
/// let xml = r#"<LotResult><ID>RES-0001</ID><Privacy><Code>win-cho</Code></Privacy></LotResult>"#;
/// let doc = Document::parse(xml).unwrap();
/// let privacy = doc.descendants().find(|n| n.has_tag_name("Privacy")).unwrap();
/// assert_eq!(nearest_identifier(privacy), Some("RES-0001".to_string()));
/// ```
pub fn nearest_identifier(node: Node<'_, '_>) -> Option<String> {
    node.ancestors()
        .filter(|n| n.is_element())
        .find_map(|n| find_child(n, "ID").and_then(get_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_find_child() {
        let xml = r#"<root><a/><b/><c/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert!(find_child(root, "a").is_some());
        assert!(find_child(root, "d").is_none());
    }

    #[test]
    fn test_element_children() {
        let xml = r#"<root>text<child1/>more<child2/></root>"#;
        let doc = Document::parse(xml).unwrap();

        let children: Vec<_> = element_children(doc.root_element()).collect();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_string_value_nested() {
        let xml = r#"<a>x<b>y</b>z</a>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(string_value(doc.root_element()), "xyz");
    }

    #[test]
    fn test_get_text_empty() {
        let xml = r#"<a>   </a>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), None);
    }

    #[test]
    fn test_normalize_text_composes() {
        // "e" followed by a combining acute accent
        assert_eq!(normalize_text("Caf\u{0065}\u{0301}"), "Caf\u{00e9}");
    }

    #[test]
    fn test_nearest_identifier_walks_up() {
        let xml = r#"<Lot><ID>LOT-0002</ID><Terms><Inner><Value>1</Value></Inner></Terms></Lot>"#;
        let doc = Document::parse(xml).unwrap();
        let value = doc.descendants().find(|n| n.has_tag_name("Value")).unwrap();
        assert_eq!(nearest_identifier(value), Some("LOT-0002".to_string()));
    }

    #[test]
    fn test_nearest_identifier_none() {
        let xml = r#"<root><child/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let child = doc.root_element().first_element_child().unwrap();
        assert_eq!(nearest_identifier(child), None);
    }
}
