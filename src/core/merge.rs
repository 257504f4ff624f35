//! Recursive mapping merge with override protection

use serde_json::{Map, Value};
use std::collections::HashSet;

/// Deep-merge `src` into `dest`, returning `dest` for chaining.
///
/// Mapping values recurse into (or create) the corresponding destination
/// sub-mapping. Scalar and sequence values overwrite, unless the key is in
/// `protected` and already present in the destination. Generic over the
/// value tree; nothing here knows about the step schema.
pub fn deep_merge<'a>(
    dest: &'a mut Map<String, Value>,
    src: &Map<String, Value>,
    protected: &HashSet<&str>,
) -> &'a mut Map<String, Value> {
    for (key, value) in src {
        match value {
            Value::Object(src_child) => {
                let entry = dest
                    .entry(key.as_str())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Some(dest_child) = entry.as_object_mut() {
                    deep_merge(dest_child, src_child, protected);
                }
            }
            _ => {
                if !dest.contains_key(key) || !protected.contains(key.as_str()) {
                    dest.insert(key.clone(), value.clone());
                }
            }
        }
    }
    dest
}
