//! Path expressions for selecting values from notices.
//!
//! A small XPath 1.0 subset, enough to address every eForms field:
//!
//! - steps: `prefix:Name`, `Name`, `*`, `.`, `..`, `@attr`, `text()`
//! - axes: `/` (child), `//` (descendant), leading `/` for the document root
//! - predicates: `[2]` (position among siblings), `[cbc:ID]`, `[not(cbc:ID)]`,
//!   `[cbc:ID/@schemeName='Lot']`, `[@listName!='x']`, conditions joined with ` and `
//!
//! Prefixed names are resolved through [`crate::config::NAMESPACES`].
//! Unprefixed names match the local name in any namespace.

use std::collections::HashMap;
use std::fmt;

use roxmltree::{Node, NodeId};

use super::utils::string_value;
use crate::config::namespace_uri;
use crate::error::{ConverterError, Result};

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeTest {
    Element {
        namespace: Option<&'static str>,
        local: String,
    },
    AnyElement,
    SelfNode,
    Parent,
    Attribute(String),
    Text,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Position(usize),
    Conditions(Vec<Condition>),
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Exists(XPath),
    NotExists(XPath),
    Equals(XPath, String),
    NotEquals(XPath, String),
}

/// One selected item: an element or an attribute/text value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'a, 'input> {
    /// An element (or the document root).
    Node(Node<'a, 'input>),
    /// An attribute or direct text value, with the element that owns it.
    Value {
        owner: Node<'a, 'input>,
        value: &'a str,
    },
}

impl<'a, 'input> Item<'a, 'input> {
    /// The raw string value of this item.
    #[must_use]
    pub fn string_value(&self) -> String {
        match self {
            Self::Node(node) => string_value(*node),
            Self::Value { value, .. } => (*value).to_string(),
        }
    }

    /// The selected element, if this item is one.
    #[must_use]
    pub fn node(&self) -> Option<Node<'a, 'input>> {
        match self {
            Self::Node(node) => Some(*node),
            Self::Value { .. } => None,
        }
    }

    /// The element this item belongs to.
    #[must_use]
    pub fn owner(&self) -> Node<'a, 'input> {
        match self {
            Self::Node(node) => *node,
            Self::Value { owner, .. } => *owner,
        }
    }

    /// Items with the same parent are siblings for positional predicates.
    fn parent_id(&self) -> Option<NodeId> {
        match self {
            Self::Node(node) => node.parent().map(|p| p.id()),
            Self::Value { owner, .. } => Some(owner.id()),
        }
    }
}

impl XPath {
    /// Compile a path expression.
    ///
    /// # Errors
    /// Returns `InvalidPath` if the expression is malformed or uses an
    /// unknown namespace prefix.
    ///
    /// # Examples
    /// ```
    /// use eforms_ocds::xml::XPath;
    ///
    /// assert!(XPath::parse("cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']").is_ok());
    /// assert!(XPath::parse("cbc:ID[").is_err());
    /// assert!(XPath::parse("zz:ID").is_err());
    /// ```
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        let invalid = |reason: &str| ConverterError::InvalidPath {
            path: expr.to_string(),
            reason: reason.to_string(),
        };

        if expr.is_empty() {
            return Err(invalid("empty expression"));
        }

        let segments = split_top_level(expr, '/').map_err(|r| invalid(&r))?;
        let mut absolute = false;
        let mut index = 0;
        if segments.len() > 1 && segments[0].is_empty() {
            absolute = true;
            index = 1;
        }

        let mut steps = Vec::new();
        let mut axis = Axis::Child;
        while index < segments.len() {
            let segment = segments[index].trim();
            if segment.is_empty() {
                if axis == Axis::Descendant || index == segments.len() - 1 {
                    return Err(invalid("empty step"));
                }
                axis = Axis::Descendant;
                index += 1;
                continue;
            }
            steps.push(parse_step(segment, axis).map_err(|r| invalid(&r))?);
            axis = Axis::Child;
            index += 1;
        }

        if let Some(position) = steps
            .iter()
            .position(|s| matches!(s.test, NodeTest::Attribute(_) | NodeTest::Text))
        {
            if position != steps.len() - 1 {
                return Err(invalid("attribute and text() steps must come last"));
            }
        }

        Ok(Self {
            source: expr.to_string(),
            absolute,
            steps,
        })
    }

    /// The expression this path was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate the path with `node` as the context node.
    ///
    /// Results are in document order per step and free of duplicates.
    pub fn evaluate<'a, 'input>(&self, node: Node<'a, 'input>) -> Vec<Item<'a, 'input>> {
        let start = if self.absolute {
            node.document().root()
        } else {
            node
        };

        let mut current = vec![Item::Node(start)];
        for step in &self.steps {
            let mut next: Vec<Item<'a, 'input>> = Vec::new();
            for item in &current {
                let Item::Node(context) = item else {
                    continue;
                };
                for candidate in step.apply(*context) {
                    if !next.contains(&candidate) {
                        next.push(candidate);
                    }
                }
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }
        current
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Step {
    fn apply<'a, 'input>(&self, context: Node<'a, 'input>) -> Vec<Item<'a, 'input>> {
        let mut candidates: Vec<Item<'a, 'input>> = match (&self.test, self.axis) {
            (NodeTest::SelfNode, _) => vec![Item::Node(context)],
            (NodeTest::Parent, _) => context.parent().map(Item::Node).into_iter().collect(),
            (NodeTest::Attribute(name), Axis::Child) => context
                .attribute(name.as_str())
                .map(|value| Item::Value {
                    owner: context,
                    value,
                })
                .into_iter()
                .collect(),
            (NodeTest::Attribute(name), Axis::Descendant) => context
                .descendants()
                .filter(|n| n.is_element())
                .filter_map(|n| {
                    n.attribute(name.as_str())
                        .map(|value| Item::Value { owner: n, value })
                })
                .collect(),
            (NodeTest::Text, Axis::Child) => context
                .children()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text().map(|value| Item::Value { owner: context, value }))
                .collect(),
            (NodeTest::Text, Axis::Descendant) => context
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| {
                    let owner = n.parent().unwrap_or(context);
                    n.text().map(|value| Item::Value { owner, value })
                })
                .collect(),
            (test, Axis::Child) => context
                .children()
                .filter(|n| test.matches(*n))
                .map(Item::Node)
                .collect(),
            (test, Axis::Descendant) => context
                .descendants()
                .skip(1)
                .filter(|n| test.matches(*n))
                .map(Item::Node)
                .collect(),
        };

        for predicate in &self.predicates {
            candidates = match predicate {
                Predicate::Position(position) => {
                    let mut seen: HashMap<Option<NodeId>, usize> = HashMap::new();
                    candidates
                        .into_iter()
                        .filter(|item| {
                            let count = seen.entry(item.parent_id()).or_default();
                            *count += 1;
                            *count == *position
                        })
                        .collect()
                }
                Predicate::Conditions(conditions) => candidates
                    .into_iter()
                    .filter(|item| {
                        item.node()
                            .is_some_and(|n| conditions.iter().all(|c| c.holds(n)))
                    })
                    .collect(),
            };
        }

        candidates
    }
}

impl NodeTest {
    fn matches(&self, node: Node<'_, '_>) -> bool {
        if !node.is_element() {
            return false;
        }
        match self {
            Self::AnyElement => true,
            Self::Element { namespace, local } => {
                node.tag_name().name() == local
                    && namespace.is_none_or(|ns| node.tag_name().namespace() == Some(ns))
            }
            _ => false,
        }
    }
}

impl Condition {
    fn holds(&self, node: Node<'_, '_>) -> bool {
        match self {
            Self::Exists(path) => !path.evaluate(node).is_empty(),
            Self::NotExists(path) => path.evaluate(node).is_empty(),
            Self::Equals(path, literal) => path
                .evaluate(node)
                .iter()
                .any(|item| item.string_value().trim() == literal),
            Self::NotEquals(path, literal) => path
                .evaluate(node)
                .iter()
                .any(|item| item.string_value().trim() != literal),
        }
    }
}

/// Parse one location step such as `cbc:ID[@schemeName='Lot']`.
fn parse_step(segment: &str, axis: Axis) -> std::result::Result<Step, String> {
    let (name, mut rest) = match segment.find('[') {
        Some(i) => (&segment[..i], &segment[i..]),
        None => (segment, ""),
    };

    let test = parse_node_test(name.trim())?;
    if axis == Axis::Descendant && matches!(test, NodeTest::SelfNode | NodeTest::Parent) {
        return Err(format!("'{name}' cannot follow '//'"));
    }

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let end = matching_bracket(rest)?;
        predicates.push(parse_predicate(&rest[1..end])?);
        rest = rest[end + 1..].trim_start();
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(format!("unexpected '{rest}' after predicate"));
        }
    }

    Ok(Step {
        axis,
        test,
        predicates,
    })
}

fn parse_node_test(name: &str) -> std::result::Result<NodeTest, String> {
    match name {
        "." => return Ok(NodeTest::SelfNode),
        ".." => return Ok(NodeTest::Parent),
        "*" => return Ok(NodeTest::AnyElement),
        "text()" => return Ok(NodeTest::Text),
        _ => {}
    }

    if let Some(attribute) = name.strip_prefix('@') {
        if !is_name(attribute) {
            return Err(format!("invalid attribute name '{attribute}'"));
        }
        return Ok(NodeTest::Attribute(attribute.to_string()));
    }

    match name.split_once(':') {
        Some((prefix, local)) => {
            let namespace =
                namespace_uri(prefix).ok_or_else(|| format!("unknown namespace prefix '{prefix}'"))?;
            if !is_name(local) {
                return Err(format!("invalid element name '{local}'"));
            }
            Ok(NodeTest::Element {
                namespace: Some(namespace),
                local: local.to_string(),
            })
        }
        None if is_name(name) => Ok(NodeTest::Element {
            namespace: None,
            local: name.to_string(),
        }),
        None => Err(format!("invalid element name '{name}'")),
    }
}

fn parse_predicate(content: &str) -> std::result::Result<Predicate, String> {
    let content = content.trim();
    if content.is_empty() {
        return Err("empty predicate".to_string());
    }

    if content.bytes().all(|b| b.is_ascii_digit()) {
        let position: usize = content
            .parse()
            .map_err(|_| format!("invalid position '{content}'"))?;
        if position == 0 {
            return Err("positions start at 1".to_string());
        }
        return Ok(Predicate::Position(position));
    }

    let conditions = split_keyword(content, " and ")?
        .into_iter()
        .map(parse_condition)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Predicate::Conditions(conditions))
}

fn parse_condition(text: &str) -> std::result::Result<Condition, String> {
    let text = text.trim();
    let compile = |expr: &str| XPath::parse(expr).map_err(|e| e.to_string());

    if let Some(inner) = text.strip_prefix("not(").and_then(|t| t.strip_suffix(')')) {
        return Ok(Condition::NotExists(compile(inner)?));
    }

    if let Some(i) = find_top_level(text, "!=")? {
        let literal = parse_literal(&text[i + 2..])?;
        return Ok(Condition::NotEquals(compile(&text[..i])?, literal));
    }
    if let Some(i) = find_top_level(text, "=")? {
        let literal = parse_literal(&text[i + 1..])?;
        return Ok(Condition::Equals(compile(&text[..i])?, literal));
    }

    Ok(Condition::Exists(compile(text)?))
}

fn parse_literal(text: &str) -> std::result::Result<String, String> {
    let text = text.trim();
    let quote = text
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| format!("expected quoted literal, found '{text}'"))?;
    text[1..]
        .strip_suffix(quote)
        .filter(|inner| !inner.contains(quote))
        .map(str::to_string)
        .ok_or_else(|| format!("unterminated literal {text}"))
}

fn is_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Index of the `]` closing the predicate that opens at byte 0.
fn matching_bracket(text: &str) -> std::result::Result<usize, String> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, b) in text.bytes().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'\'' | b'"') => quote = Some(b),
            (None, b'[') => depth += 1,
            (None, b']') => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err("unterminated predicate".to_string())
}

/// Split on `separator` outside brackets, parentheses and quotes.
fn split_top_level(text: &str, separator: char) -> std::result::Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => {
                depth -= 1;
                if depth < 0 {
                    return Err(format!("unbalanced '{c}'"));
                }
            }
            (None, c) if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated literal".to_string());
    }
    if depth != 0 {
        return Err("unterminated predicate".to_string());
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Split on a multi-character keyword outside brackets and quotes.
fn split_keyword<'t>(text: &'t str, keyword: &str) -> std::result::Result<Vec<&'t str>, String> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(i) = find_top_level(rest, keyword)? {
        parts.push(&rest[..i]);
        rest = &rest[i + keyword.len()..];
    }
    parts.push(rest);
    Ok(parts)
}

/// Byte index of the first `needle` outside brackets, parentheses and quotes.
fn find_top_level(text: &str, needle: &str) -> std::result::Result<Option<usize>, String> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth -= 1,
            (None, _) if depth == 0 && text[i..].starts_with(needle) => return Ok(Some(i)),
            _ => {}
        }
    }
    if quote.is_some() {
        return Err("unterminated literal".to_string());
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const NOTICE: &str = r#"<ContractNotice
        xmlns="urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2"
        xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
        xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
        <cbc:ID schemeName="notice-id">n-1</cbc:ID>
        <cac:ProcurementProjectLot>
            <cbc:ID schemeName="Lot">LOT-0001</cbc:ID>
            <cac:ProcurementProject><cbc:Name languageID="ENG">First</cbc:Name></cac:ProcurementProject>
        </cac:ProcurementProjectLot>
        <cac:ProcurementProjectLot>
            <cbc:ID schemeName="LotsGroup">GLO-0001</cbc:ID>
        </cac:ProcurementProjectLot>
        <cac:ProcurementProjectLot>
            <cbc:ID schemeName="Lot">LOT-0002</cbc:ID>
            <cac:ProcurementProject><cbc:Name languageID="ENG">Second</cbc:Name></cac:ProcurementProject>
        </cac:ProcurementProjectLot>
    </ContractNotice>"#;

    fn texts(doc: &Document<'_>, expr: &str) -> Vec<String> {
        XPath::parse(expr)
            .unwrap()
            .evaluate(doc.root_element())
            .iter()
            .map(|i| i.string_value().trim().to_string())
            .collect()
    }

    #[test]
    fn test_child_steps_with_prefix() {
        let doc = Document::parse(NOTICE).unwrap();
        assert_eq!(
            texts(&doc, "cac:ProcurementProjectLot/cbc:ID"),
            vec!["LOT-0001", "GLO-0001", "LOT-0002"]
        );
    }

    #[test]
    fn test_predicate_attribute_equals() {
        let doc = Document::parse(NOTICE).unwrap();
        assert_eq!(
            texts(
                &doc,
                "cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']/cbc:ID"
            ),
            vec!["LOT-0001", "LOT-0002"]
        );
        assert_eq!(
            texts(
                &doc,
                "cac:ProcurementProjectLot[cbc:ID/@schemeName!='Lot']/cbc:ID"
            ),
            vec!["GLO-0001"]
        );
    }

    #[test]
    fn test_predicate_not_and_position() {
        let doc = Document::parse(NOTICE).unwrap();
        assert_eq!(
            texts(
                &doc,
                "cac:ProcurementProjectLot[not(cac:ProcurementProject)]/cbc:ID"
            ),
            vec!["GLO-0001"]
        );
        assert_eq!(
            texts(&doc, "cac:ProcurementProjectLot[3]/cbc:ID"),
            vec!["LOT-0002"]
        );
    }

    #[test]
    fn test_predicate_and() {
        let doc = Document::parse(NOTICE).unwrap();
        assert_eq!(
            texts(
                &doc,
                "cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot' and cac:ProcurementProject/cbc:Name='Second']/cbc:ID"
            ),
            vec!["LOT-0002"]
        );
    }

    #[test]
    fn test_descendant_axis_and_attribute() {
        let doc = Document::parse(NOTICE).unwrap();
        assert_eq!(texts(&doc, "//cbc:Name"), vec!["First", "Second"]);
        assert_eq!(texts(&doc, "//cbc:Name/@languageID"), vec!["ENG", "ENG"]);
    }

    #[test]
    fn test_position_after_descendant_axis_counts_siblings() {
        let doc = Document::parse(NOTICE).unwrap();
        assert_eq!(
            texts(&doc, "//cbc:ID[1]"),
            vec!["n-1", "LOT-0001", "GLO-0001", "LOT-0002"]
        );
        assert!(texts(&doc, "//cbc:ID[2]").is_empty());
        assert_eq!(
            texts(&doc, "//cac:ProcurementProjectLot[2]/cbc:ID"),
            vec!["GLO-0001"]
        );
        assert_eq!(
            texts(&doc, "//cac:ProcurementProjectLot[cac:ProcurementProject][2]/cbc:ID"),
            vec!["LOT-0002"]
        );
    }

    #[test]
    fn test_absolute_path_from_nested_node() {
        let doc = Document::parse(NOTICE).unwrap();
        let lot = doc
            .descendants()
            .find(|n| n.has_tag_name("ProcurementProjectLot"))
            .unwrap();
        let items = XPath::parse("/*/cbc:ID").unwrap().evaluate(lot);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].string_value(), "n-1");
    }

    #[test]
    fn test_unprefixed_matches_any_namespace() {
        let doc = Document::parse(NOTICE).unwrap();
        assert_eq!(texts(&doc, "ProcurementProjectLot[1]/ID"), vec!["LOT-0001"]);
    }

    #[test]
    fn test_parent_and_self() {
        let doc = Document::parse(NOTICE).unwrap();
        let name = doc.descendants().find(|n| n.has_tag_name("Name")).unwrap();
        let items = XPath::parse("../../cbc:ID").unwrap().evaluate(name);
        assert_eq!(items[0].string_value(), "LOT-0001");
        let items = XPath::parse(".").unwrap().evaluate(name);
        assert_eq!(items[0].string_value(), "First");
    }

    #[test]
    fn test_no_match_is_empty() {
        let doc = Document::parse(NOTICE).unwrap();
        assert!(texts(&doc, "cac:TenderingTerms/cbc:Missing").is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(XPath::parse("").is_err());
        assert!(XPath::parse("a/").is_err());
        assert!(XPath::parse("a///b").is_err());
        assert!(XPath::parse("a[").is_err());
        assert!(XPath::parse("a[b='x]").is_err());
        assert!(XPath::parse("a[0]").is_err());
        assert!(XPath::parse("@id/a").is_err());
        assert!(XPath::parse("foo:a").is_err());
        assert!(XPath::parse("a[b=x]").is_err());
    }

    #[test]
    fn test_display_round_trips_source() {
        let path = XPath::parse("cbc:ID[@schemeName='Lot']").unwrap();
        assert_eq!(path.to_string(), "cbc:ID[@schemeName='Lot']");
        assert_eq!(path.as_str(), "cbc:ID[@schemeName='Lot']");
    }
}
