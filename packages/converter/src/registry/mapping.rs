//! Declarative field mappings.
//!
//! Most business terms are "the value at this path, written to that field
//! of that entity". A [`FieldMapping`] states exactly that, and one generic
//! implementation of [`FieldConverter`] does the rest:
//!
//! 1. the [`Scope`] selects the entity nodes (lots, organizations, ...) and
//!    their ids,
//! 2. the path selects the value inside each entity node,
//! 3. the [`Transform`] turns the raw text into a JSON value,
//! 4. the value is nested under the target and placed in the scope's
//!    container.

use roxmltree::Node;
use serde_json::{json, Value};

use super::converter::FieldConverter;
use super::types::ConvertContext;
use crate::codes::{lookup, CodeTable, COUNTRIES, LANGUAGES};
use crate::error::Result;
use crate::format::{
    duration_in_days, format_date, format_date_time, format_end_date, parse_bool, parse_integer,
    parse_number,
};
use crate::release::{deep_merge, entity_fragment, nest, Container};
use crate::xml::{normalize_text, select_value, Item, XPath};

/// Prefix a path with the location of the eForms extension block.
macro_rules! extension {
    ($path:literal) => {
        concat!(
            "ext:UBLExtensions/ext:UBLExtension/ext:ExtensionContent/efext:EformsExtension/",
            $path
        )
    };
}
pub(crate) use extension;

/// Where entity ids come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    /// Text at a path relative to the entity node.
    Path(&'static str),
    /// Text at a path, or the 1-based position when the path is empty.
    PathOrPosition(&'static str),
    /// The 1-based position of the entity node.
    Position,
    /// A constant id.
    Fixed(&'static str),
    /// The entity has no id (objects and the release itself).
    None,
}

/// The XML context a mapping reads from and the JSON container it writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    /// Name used in log messages.
    pub name: &'static str,
    /// Path from the notice root to the entity nodes.
    pub nodes: &'static str,
    /// Where each entity's id comes from.
    pub id: IdSource,
    /// Where entities are placed in the release.
    pub container: Container,
}

/// One entity found by a scope.
#[derive(Debug, Clone)]
pub struct Entity<'a, 'input> {
    /// The entity id, when the scope has one.
    pub id: Option<String>,
    /// The XML element the entity is read from.
    pub node: Node<'a, 'input>,
}

impl Scope {
    /// Select the entities of this scope.
    ///
    /// Entities whose id is required but missing are skipped.
    pub fn entities<'a, 'input>(&self, root: Node<'a, 'input>) -> Result<Vec<Entity<'a, 'input>>> {
        let nodes = XPath::parse(self.nodes)?.evaluate(root);
        let mut entities = Vec::with_capacity(nodes.len());

        for (index, node) in nodes.iter().filter_map(Item::node).enumerate() {
            let position = (index + 1).to_string();
            let id = match self.id {
                IdSource::Path(path) => match select_value(node, path)? {
                    Some(id) => Some(id),
                    None => {
                        tracing::debug!(scope = self.name, position = %position, "Entity without id, skipping");
                        continue;
                    }
                },
                IdSource::PathOrPosition(path) => Some(select_value(node, path)?.unwrap_or(position)),
                IdSource::Position => Some(position),
                IdSource::Fixed(id) => Some(id.to_string()),
                IdSource::None => None,
            };
            entities.push(Entity { id, node });
        }

        Ok(entities)
    }

    /// Place `body` for the entity with `id` in this scope's container.
    #[must_use]
    pub fn fragment(&self, id: Option<&str>, body: Value) -> Value {
        entity_fragment(self.container, id, body)
    }
}

/// The release itself.
pub const NOTICE: Scope = Scope {
    name: "Notice",
    nodes: ".",
    id: IdSource::None,
    container: Container::Root,
};

/// The procedure, written to `tender`.
pub const PROCEDURE: Scope = Scope {
    name: "Procedure",
    nodes: ".",
    id: IdSource::None,
    container: Container::Object("tender"),
};

/// Lots, written to `tender.lots`.
pub const LOT: Scope = Scope {
    name: "Lot",
    nodes: "cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']",
    id: IdSource::Path("cbc:ID"),
    container: Container::List("tender.lots"),
};

/// Groups of lots, written to `tender.lotGroups`.
pub const LOTS_GROUP: Scope = Scope {
    name: "LotsGroup",
    nodes: "cac:ProcurementProjectLot[cbc:ID/@schemeName='LotsGroup']",
    id: IdSource::Path("cbc:ID"),
    container: Container::List("tender.lotGroups"),
};

/// Parts of a prior information notice, written to `tender`.
pub const PART: Scope = Scope {
    name: "Part",
    nodes: "cac:ProcurementProjectLot[cbc:ID/@schemeName='Part']",
    id: IdSource::None,
    container: Container::Object("tender"),
};

/// Organizations, written to `parties`.
pub const ORGANIZATION: Scope = Scope {
    name: "Organization",
    nodes: extension!("efac:Organizations/efac:Organization/efac:Company"),
    id: IdSource::Path("cac:PartyIdentification/cbc:ID"),
    container: Container::List("parties"),
};

/// Touch points of organizations, written to `parties`.
pub const TOUCH_POINT: Scope = Scope {
    name: "TouchPoint",
    nodes: extension!("efac:Organizations/efac:Organization/efac:TouchPoint"),
    id: IdSource::Path("cac:PartyIdentification/cbc:ID"),
    container: Container::List("parties"),
};

/// Lot results, written to `awards`.
pub const LOT_RESULT: Scope = Scope {
    name: "LotResult",
    nodes: extension!("efac:NoticeResult/efac:LotResult"),
    id: IdSource::Path("cbc:ID"),
    container: Container::List("awards"),
};

/// Tenders, written to `bids.details`.
pub const LOT_TENDER: Scope = Scope {
    name: "LotTender",
    nodes: extension!("efac:NoticeResult/efac:LotTender"),
    id: IdSource::Path("cbc:ID"),
    container: Container::List("bids.details"),
};

/// Contracts, written to `contracts`.
pub const SETTLED_CONTRACT: Scope = Scope {
    name: "SettledContract",
    nodes: extension!("efac:NoticeResult/efac:SettledContract"),
    id: IdSource::Path("cbc:ID"),
    container: Container::List("contracts"),
};

/// Tendering parties; their tenderers are written to `parties`.
pub const TENDERING_PARTY: Scope = Scope {
    name: "TenderingParty",
    nodes: extension!("efac:NoticeResult/efac:TenderingParty"),
    id: IdSource::Path("cbc:ID"),
    container: Container::List("parties"),
};

/// Legacy TED notice, written to the release itself.
pub const LEGACY_NOTICE: Scope = Scope {
    name: "LegacyNotice",
    nodes: ".",
    id: IdSource::None,
    container: Container::Root,
};

/// Legacy TED form, written to `tender`. Only the first (original
/// language) form is read.
pub const LEGACY_PROCEDURE: Scope = Scope {
    name: "LegacyProcedure",
    nodes: "FORM_SECTION/*[1]",
    id: IdSource::None,
    container: Container::Object("tender"),
};

/// Legacy TED lots, written to `tender.lots`.
pub const LEGACY_LOT: Scope = Scope {
    name: "LegacyLot",
    nodes: "FORM_SECTION/*[1]/OBJECT_CONTRACT/OBJECT_DESCR",
    id: IdSource::PathOrPosition("LOT_NO"),
    container: Container::List("tender.lots"),
};

/// Legacy TED contracting body, written to `parties`.
pub const LEGACY_BUYER: Scope = Scope {
    name: "LegacyBuyer",
    nodes: "FORM_SECTION/*[1]/CONTRACTING_BODY/ADDRESS_CONTRACTING_BODY",
    id: IdSource::Fixed("ORG-0001"),
    container: Container::List("parties"),
};

/// Legacy TED award sections, written to `awards`.
pub const LEGACY_AWARD: Scope = Scope {
    name: "LegacyAward",
    nodes: "FORM_SECTION/*[1]/AWARD_CONTRACT",
    id: IdSource::PathOrPosition("@ITEM"),
    container: Container::List("awards"),
};

/// How raw text is turned into a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// First value, as a string.
    Text,
    /// Every value, as a list of strings.
    TextList,
    /// First value, as an integer.
    Integer,
    /// First value, as a number.
    Decimal,
    /// First value, as an indicator.
    Boolean,
    /// First value, as the start of that day.
    Date,
    /// First value, as the end of that day.
    EndDate,
    /// First value, combined with the time at the given path (relative to
    /// the date's parent element).
    DateTime(&'static str),
    /// `{amount, currency}`, the currency read from the value's attribute.
    Amount,
    /// `{durationInDays}`, the unit read from the value's `unitCode`.
    Duration,
    /// ISO alpha-3 country code to alpha-2.
    Country,
    /// Three-letter language code to two-letter.
    Language,
    /// Every value, as two-letter language codes.
    LanguageList,
    /// Code looked up in a code list; unknown codes are warned about.
    Code(CodeTable),
    /// `false` for the listed codes, `true` for any other code.
    CodeBool(&'static [&'static str]),
    /// `{id, scheme}` with the given scheme.
    Identifier(&'static str),
    /// Every value, as `{id, scheme}` with the given scheme.
    IdentifierList(&'static str),
}

impl Transform {
    /// Apply the transform to the selected items.
    ///
    /// Returns `None` when nothing usable was selected. Values that cannot
    /// be interpreted are reported as warnings.
    pub fn apply(&self, items: &[Item<'_, '_>], context: &mut ConvertContext) -> Result<Option<Value>> {
        let texts: Vec<(String, Item<'_, '_>)> = items
            .iter()
            .map(|item| (normalize_text(&item.string_value()), *item))
            .filter(|(text, _)| !text.is_empty())
            .collect();
        let Some((text, item)) = texts.first() else {
            return Ok(None);
        };

        let value = match *self {
            Self::Text => Some(Value::String(text.clone())),
            Self::TextList => Some(Value::Array(
                texts.iter().map(|(t, _)| Value::String(t.clone())).collect(),
            )),
            Self::Integer => parse_integer(text)
                .map(Value::from)
                .or_else(|| invalid(context, "integer", text)),
            Self::Decimal => parse_number(text).or_else(|| invalid(context, "number", text)),
            Self::Boolean => parse_bool(text)
                .map(Value::Bool)
                .or_else(|| invalid(context, "indicator", text)),
            Self::Date => format_date(text)
                .map(Value::String)
                .or_else(|| invalid(context, "date", text)),
            Self::EndDate => format_end_date(text)
                .map(Value::String)
                .or_else(|| invalid(context, "date", text)),
            Self::DateTime(time_path) => {
                let time = match item.owner().parent_element() {
                    Some(parent) => select_value(parent, time_path)?,
                    None => None,
                };
                let formatted = match time {
                    Some(time) => format_date_time(text, &time),
                    None => format_date(text),
                };
                formatted
                    .map(Value::String)
                    .or_else(|| invalid(context, "date-time", text))
            }
            Self::Amount => amount(text, item.owner()).or_else(|| invalid(context, "amount", text)),
            Self::Duration => {
                let unit = item.owner().attribute("unitCode").unwrap_or_default();
                match duration_in_days(text, unit) {
                    Some(days) => Some(json!({"durationInDays": days})),
                    None => invalid(context, "duration", &format!("{text} {unit}")),
                }
            }
            Self::Country => country(text).map(Value::from).or_else(|| {
                context.unknown_code(text);
                None
            }),
            Self::Language => language(text).map(Value::String).or_else(|| {
                context.unknown_code(text);
                None
            }),
            Self::LanguageList => {
                let mut languages = Vec::new();
                for (code, _) in &texts {
                    match language(code) {
                        Some(lang) if !languages.contains(&Value::String(lang.clone())) => {
                            languages.push(Value::String(lang));
                        }
                        Some(_) => {}
                        None => context.unknown_code(code),
                    }
                }
                (!languages.is_empty()).then_some(Value::Array(languages))
            }
            Self::Code(table) => lookup(table, text).map(Value::from).or_else(|| {
                context.unknown_code(text);
                None
            }),
            Self::CodeBool(false_codes) => Some(Value::Bool(
                !false_codes.iter().any(|code| code.eq_ignore_ascii_case(text)),
            )),
            Self::Identifier(scheme) => Some(json!({"id": text, "scheme": scheme})),
            Self::IdentifierList(scheme) => Some(Value::Array(
                texts
                    .iter()
                    .map(|(t, _)| json!({"id": t, "scheme": scheme}))
                    .collect(),
            )),
        };

        Ok(value)
    }
}

fn invalid(context: &mut ConvertContext, kind: &str, text: &str) -> Option<Value> {
    context.warn(format!("invalid {kind} '{text}'"));
    None
}

/// Build `{amount, currency}` from a value and its currency attribute.
pub(crate) fn amount(text: &str, owner: Node<'_, '_>) -> Option<Value> {
    let amount = parse_number(text)?;
    let currency = owner
        .attribute("currencyID")
        .or_else(|| owner.attribute("CURRENCY"));
    Some(match currency {
        Some(currency) => json!({"amount": amount, "currency": currency}),
        None => json!({"amount": amount}),
    })
}

/// Alpha-2 country code for an alpha-3 (eForms) or alpha-2 (legacy) code.
pub(crate) fn country(code: &str) -> Option<&'static str> {
    if code.len() == 2 {
        return COUNTRIES
            .iter()
            .find(|(_, alpha2)| alpha2.eq_ignore_ascii_case(code))
            .map(|(_, alpha2)| *alpha2);
    }
    lookup(COUNTRIES, code)
}

/// Two-letter language code for a three-letter (eForms) or two-letter
/// (legacy) code.
pub(crate) fn language(code: &str) -> Option<String> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(code.to_ascii_lowercase());
    }
    lookup(LANGUAGES, code).map(str::to_string)
}

/// A converter defined by a path, a transform and a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Business term id.
    pub id: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Entities the field belongs to.
    pub scope: Scope,
    /// Path from the entity node to the value.
    pub path: &'static str,
    /// Dotted target field inside the entity. A trailing `[]` wraps the
    /// value in a list.
    pub target: &'static str,
    /// How the value is interpreted.
    pub transform: Transform,
}

/// Shorthand constructor used by the mapping tables.
#[must_use]
pub const fn field(
    id: &'static str,
    description: &'static str,
    scope: Scope,
    path: &'static str,
    target: &'static str,
    transform: Transform,
) -> FieldMapping {
    FieldMapping {
        id,
        description,
        scope,
        path,
        target,
        transform,
    }
}

impl FieldMapping {
    fn place(&self, value: Value) -> Value {
        match self.target.strip_suffix("[]") {
            Some(target) => {
                let list = match value {
                    Value::Array(items) => Value::Array(items),
                    other => Value::Array(vec![other]),
                };
                nest(target, list)
            }
            None => nest(self.target, value),
        }
    }
}

impl FieldConverter for FieldMapping {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parse(&self, root: Node<'_, '_>, context: &mut ConvertContext) -> Result<Option<Value>> {
        let path = XPath::parse(self.path)?;
        let mut fragment: Option<Value> = None;

        for entity in self.scope.entities(root)? {
            let items = path.evaluate(entity.node);
            let Some(value) = self.transform.apply(&items, context)? else {
                continue;
            };
            let piece = self.scope.fragment(entity.id.as_deref(), self.place(value));
            match fragment.as_mut() {
                Some(fragment) => deep_merge(fragment, piece),
                None => fragment = Some(piece),
            }
        }

        Ok(fragment)
    }
}
