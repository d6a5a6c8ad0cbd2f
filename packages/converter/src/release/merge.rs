//! Deep merge of JSON fragments with list-dedup-by-id semantics.

use serde_json::{Map, Value};

/// Merge `source` into `target`.
///
/// - object + object: merged key by key, recursively
/// - array + array: see [`merge_arrays`]
/// - `null` never overwrites an existing value
/// - anything else: `source` replaces `target`
///
/// # Examples
/// ```
/// use serde_json::json;
/// use eforms_ocds::release::deep_merge;
///
/// let mut release = json!({"tender": {"lots": [{"id": "LOT-0001", "title": "Roads"}]}});
/// deep_merge(
///     &mut release,
///     json!({"tender": {"lots": [{"id": "LOT-0001", "description": "Resurfacing"}]}}),
/// );
/// assert_eq!(
///     release,
///     json!({"tender": {"lots": [{"id": "LOT-0001", "title": "Roads", "description": "Resurfacing"}]}})
/// );
/// ```
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(source)) => merge_objects(target, source),
        (Value::Array(target), Value::Array(source)) => merge_arrays(target, source),
        (target, source) => *target = source,
    }
}

fn merge_objects(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None if !value.is_null() => {
                target.insert(key, value);
            }
            None => {}
        }
    }
}

/// Merge two JSON arrays.
///
/// - objects with an `id` are matched by id and deep-merged, or appended
/// - other elements are appended unless an equal element is already present
pub fn merge_arrays(target: &mut Vec<Value>, source: Vec<Value>) {
    for value in source {
        match entity_id(&value).map(str::to_string) {
            Some(id) => match target.iter_mut().find(|e| entity_id(e) == Some(id.as_str())) {
                Some(existing) => deep_merge(existing, value),
                None => target.push(value),
            },
            None => {
                if !target.contains(&value) {
                    target.push(value);
                }
            }
        }
    }
}

/// The `id` of an entity object, if it has a string id.
#[must_use]
pub fn entity_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

/// Find the entity with `id` in `list`, appending `{"id": id}` if absent.
pub fn upsert<'v>(list: &'v mut Vec<Value>, id: &str) -> &'v mut Value {
    let index = match list.iter().position(|e| entity_id(e) == Some(id)) {
        Some(index) => index,
        None => {
            let mut entity = Map::new();
            entity.insert("id".to_string(), Value::String(id.to_string()));
            list.push(Value::Object(entity));
            list.len() - 1
        }
    };
    &mut list[index]
}

/// Remove empty objects and arrays, recursively.
///
/// Returns `true` when `value` itself ended up empty.
pub fn prune_empty(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !prune_empty(v));
            map.is_empty()
        }
        Value::Array(items) => {
            items.retain_mut(|v| !prune_empty(v));
            items.is_empty()
        }
        Value::Null => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_merge_new_key() {
        let mut target = json!({"tender": {"title": "A"}});
        deep_merge(&mut target, json!({"tender": {"description": "B"}}));
        assert_eq!(target, json!({"tender": {"title": "A", "description": "B"}}));
    }

    #[test]
    fn test_merge_overwrites_scalar() {
        let mut target = json!({"tender": {"title": "A"}});
        deep_merge(&mut target, json!({"tender": {"title": "B"}}));
        assert_eq!(target, json!({"tender": {"title": "B"}}));
    }

    #[test]
    fn test_merge_null_never_overwrites() {
        let mut target = json!({"tender": {"title": "A"}});
        deep_merge(&mut target, json!({"tender": {"title": null, "status": null}}));
        assert_eq!(target, json!({"tender": {"title": "A"}}));
    }

    #[test]
    fn test_merge_entity_by_id_updates() {
        let mut target = json!({"parties": [{"id": "ORG-0001", "name": "City"}]});
        deep_merge(
            &mut target,
            json!({"parties": [{"id": "ORG-0001", "roles": ["buyer"]}, {"id": "ORG-0002"}]}),
        );
        assert_eq!(
            target,
            json!({"parties": [
                {"id": "ORG-0001", "name": "City", "roles": ["buyer"]},
                {"id": "ORG-0002"}
            ]})
        );
    }

    #[test]
    fn test_merge_scalar_list_as_set() {
        let mut target = json!({"roles": ["buyer"]});
        deep_merge(&mut target, json!({"roles": ["buyer", "reviewBody"]}));
        assert_eq!(target, json!({"roles": ["buyer", "reviewBody"]}));
    }

    #[test]
    fn test_merge_objects_without_id_deduplicated() {
        let mut target = json!({"criteria": [{"type": "price"}]});
        deep_merge(
            &mut target,
            json!({"criteria": [{"type": "price"}, {"type": "quality"}]}),
        );
        assert_eq!(target, json!({"criteria": [{"type": "price"}, {"type": "quality"}]}));
    }

    #[test]
    fn test_upsert_existing_and_new() {
        let mut list = vec![json!({"id": "a", "x": 1})];
        upsert(&mut list, "a")["y"] = json!(2);
        upsert(&mut list, "b")["x"] = json!(3);
        assert_eq!(
            list,
            vec![json!({"id": "a", "x": 1, "y": 2}), json!({"id": "b", "x": 3})]
        );
    }

    #[test]
    fn test_prune_empty() {
        let mut value = json!({"tender": {"lots": [], "items": [{}]}, "id": "1", "x": null});
        assert!(!prune_empty(&mut value));
        assert_eq!(value, json!({"id": "1"}));
    }
}
