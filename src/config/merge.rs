//! Field-by-field merging of configuration tiers.
//!
//! Objects merge recursively, everything else (including arrays) is replaced,
//! and an explicit null in a higher tier leaves the lower tier's value alone.

use serde_json::Value;

/// Merge `overlay` onto `base`, with `overlay` winning.
///
/// ```
/// use serde_json::json;
/// use file_tree::config::deep_merge;
///
/// let defaults = json!({"render": {"strict_tokens": false, "default_output_type": "Geometry"}});
/// let project = json!({"render": {"strict_tokens": true}});
/// assert_eq!(
///     deep_merge(defaults, project),
///     json!({"render": {"strict_tokens": true, "default_output_type": "Geometry"}})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let value = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold tiers from lowest to highest priority.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tiers_merge_per_field() {
        let merged = deep_merge_all([
            json!({"trees": {"default_tree": "default", "folder": null}, "database": {"path": "file-tree.db"}}),
            json!({"trees": {"default_tree": "simple"}}),
            json!({"database": {"path": "/srv/studio.db"}}),
        ]);
        assert_eq!(
            merged,
            json!({"trees": {"default_tree": "simple", "folder": null}, "database": {"path": "/srv/studio.db"}})
        );
    }

    #[test]
    fn test_null_keeps_lower_tier() {
        let merged = deep_merge(
            json!({"trees": {"folder": "/mnt/trees"}}),
            json!({"trees": {"folder": null}}),
        );
        assert_eq!(merged, json!({"trees": {"folder": "/mnt/trees"}}));
    }

    #[test]
    fn test_scalars_and_arrays_replace() {
        let merged = deep_merge(
            json!({"render": {"default_software": {"name": "3dsmax"}}, "modes": ["working", "output"]}),
            json!({"render": {"default_software": "blender"}, "modes": ["working"]}),
        );
        assert_eq!(
            merged,
            json!({"render": {"default_software": "blender"}, "modes": ["working"]})
        );
    }
}
