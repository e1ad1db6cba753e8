//! Options normalization and defaults merging.
//!
//! Caller-supplied options are always normalized to an object; scalars are
//! wrapped as `{"value": scalar}` so downstream code can assume a mapping.
//! Defaults merging is recursive: caller values win at every nesting level
//! but keys they do not mention fall back to the declared default.

use serde_json::{Map, Value};

/// Normalize a caller-supplied options value into a mapping.
///
/// `None` becomes the empty mapping, an object is taken as-is, and any
/// other value (scalar or array) is wrapped under the `"value"` key.
pub fn normalize_options(options: Option<Value>) -> Map<String, Value> {
    match options {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Recursively merge `over` into `base`; `over` wins on conflicts.
///
/// Nested objects are merged key by key. Any other pair of values is a
/// plain replacement, arrays included.
pub fn deep_merge(base: &mut Map<String, Value>, over: &Map<String, Value>) {
    for (key, value) in over {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merge caller `options` over declared `defaults`, returning the result.
pub fn merge_over(defaults: &Map<String, Value>, options: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = defaults.clone();
    deep_merge(&mut merged, options);
    merged
}
