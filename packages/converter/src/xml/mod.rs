//! XML access: tree helpers and the path language used by converters.

mod path;
mod utils;

pub use path::{Item, XPath};
pub use utils::{
    element_children, find_child, get_tag_name, get_text, nearest_identifier, normalize_text,
    string_value,
};

use roxmltree::Node;

use crate::error::Result;

/// Select all items matched by `expr`, relative to `node`.
pub fn select_items<'a, 'input>(node: Node<'a, 'input>, expr: &str) -> Result<Vec<Item<'a, 'input>>> {
    Ok(XPath::parse(expr)?.evaluate(node))
}

/// Select the elements matched by `expr`, relative to `node`.
///
/// Attribute and text items are dropped.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use eforms_ocds::xml::select;
///
/// let xml = r#"<root><lot id="1"/><lot id="2"/><other/></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let lots = select(doc.root_element(), "lot").unwrap();
/// assert_eq!(lots.len(), 2);
/// ```
pub fn select<'a, 'input>(node: Node<'a, 'input>, expr: &str) -> Result<Vec<Node<'a, 'input>>> {
    Ok(select_items(node, expr)?
        .iter()
        .filter_map(Item::node)
        .collect())
}

/// Select the normalized, non-empty text of every item matched by `expr`.
pub fn select_values(node: Node<'_, '_>, expr: &str) -> Result<Vec<String>> {
    Ok(select_items(node, expr)?
        .iter()
        .map(|item| normalize_text(&item.string_value()))
        .filter(|text| !text.is_empty())
        .collect())
}

/// Select the first non-empty text matched by `expr`.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use eforms_ocds::xml::select_value;
///
/// let xml = r#"<root><name> </name><name>Road works</name></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert_eq!(select_value(root, "name").unwrap(), Some("Road works".to_string()));
/// assert_eq!(select_value(root, "missing").unwrap(), None);
/// ```
pub fn select_value(node: Node<'_, '_>, expr: &str) -> Result<Option<String>> {
    Ok(select_values(node, expr)?.into_iter().next())
}

/// Check whether `expr` matches anything.
pub fn exists(node: Node<'_, '_>, expr: &str) -> Result<bool> {
    Ok(!select_items(node, expr)?.is_empty())
}
