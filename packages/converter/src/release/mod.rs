//! The OCDS release document built from a notice.
//!
//! A release is kept as a JSON object: converters contribute fragments that
//! are folded in with [`deep_merge`], so every list of entities stays unique
//! by `id` no matter how many converters touch it.

mod merge;

pub use merge::{deep_merge, entity_id, merge_arrays, prune_empty, upsert};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Release-level keys, in the order they are written out.
const HEADER_KEYS: &[&str] = &[
    "ocid",
    "id",
    "date",
    "tag",
    "initiationType",
    "language",
];

/// Where an entity lives inside the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// The release object itself.
    Root,
    /// A nested object, e.g. `tender`.
    Object(&'static str),
    /// A list of entities keyed by id, e.g. `tender.lots`.
    List(&'static str),
}

/// An OCDS release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Release(Map<String, Value>);

impl Release {
    /// Create an empty release.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a fragment into the release.
    ///
    /// Fragments must be JSON objects rooted at the release; anything else
    /// is ignored.
    pub fn merge(&mut self, fragment: Value) {
        match fragment {
            Value::Object(map) => {
                let mut root = Value::Object(std::mem::take(&mut self.0));
                deep_merge(&mut root, Value::Object(map));
                if let Value::Object(map) = root {
                    self.0 = map;
                }
            }
            Value::Null => {}
            other => tracing::debug!(fragment = %other, "Ignoring non-object fragment"),
        }
    }

    /// Look up a value by dotted path, e.g. `tender.lots`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.0.get(parts.next()?)?;
        parts.try_fold(first, |value, key| value.get(key))
    }

    /// Find an entity by id in the list at `path`.
    #[must_use]
    pub fn entity(&self, path: &str, id: &str) -> Option<&Value> {
        self.get(path)?
            .as_array()?
            .iter()
            .find(|e| entity_id(e) == Some(id))
    }

    /// Push `item` onto the list at `path`, creating the list when missing.
    ///
    /// Values along the path that are not objects, or a final value that is
    /// not a list, are replaced.
    pub fn append(&mut self, path: &str, item: Value) {
        let parts: Vec<&str> = path.split('.').collect();
        append_at(&mut self.0, &parts, item);
    }

    /// Check whether nothing has been merged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Complete the release once every converter has run.
    ///
    /// Sets `initiationType`, drops empty containers and moves the
    /// release-level keys to the front.
    pub fn finalize(&mut self) {
        if !self.0.is_empty() {
            self.0
                .entry("initiationType")
                .or_insert_with(|| Value::String("tender".to_string()));
        }

        self.0.retain(|_, v| !prune_empty(v));

        let mut ordered = Map::new();
        for key in HEADER_KEYS {
            if let Some(value) = self.0.shift_remove(*key) {
                ordered.insert((*key).to_string(), value);
            }
        }
        ordered.append(&mut self.0);
        self.0 = ordered;
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Wrap `value` in nested objects following a dotted path.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use eforms_ocds::release::nest;
///
/// assert_eq!(
///     nest("tender.value.amount", json!(100)),
///     json!({"tender": {"value": {"amount": 100}}})
/// );
/// ```
#[must_use]
pub fn nest(path: &str, value: Value) -> Value {
    path.rsplit('.')
        .filter(|part| !part.is_empty())
        .fold(value, |inner, key| {
            let mut map = Map::new();
            map.insert(key.to_string(), inner);
            Value::Object(map)
        })
}

/// Build a fragment placing `body` in `container`.
///
/// For lists, `id` is written into the entity so the merge can find it.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use eforms_ocds::release::{entity_fragment, Container};
///
/// assert_eq!(
///     entity_fragment(Container::List("tender.lots"), Some("LOT-0001"), json!({"title": "Roads"})),
///     json!({"tender": {"lots": [{"id": "LOT-0001", "title": "Roads"}]}})
/// );
/// ```
#[must_use]
pub fn entity_fragment(container: Container, id: Option<&str>, body: Value) -> Value {
    match container {
        Container::Root => body,
        Container::Object(path) => nest(path, body),
        Container::List(path) => {
            let entity = match (id, body) {
                (Some(id), Value::Object(fields)) => {
                    let mut entity = Map::new();
                    entity.insert("id".to_string(), Value::String(id.to_string()));
                    entity.extend(fields);
                    Value::Object(entity)
                }
                (_, body) => body,
            };
            nest(path, Value::Array(vec![entity]))
        }
    }
}

fn append_at(map: &mut Map<String, Value>, parts: &[&str], item: Value) {
    let Some((key, rest)) = parts.split_first() else {
        return;
    };
    let slot = map.entry((*key).to_string()).or_insert(Value::Null);
    if rest.is_empty() {
        match slot {
            Value::Array(items) => items.push(item),
            other => *other = Value::Array(vec![item]),
        }
        return;
    }
    match slot {
        Value::Object(inner) => append_at(inner, rest, item),
        other => {
            let mut inner = Map::new();
            append_at(&mut inner, rest, item);
            *other = Value::Object(inner);
        }
    }
}
