//! Field-by-field merging of configuration tiers.
//!
//! Tiers are parsed to `serde_json::Value` and folded; objects merge
//! recursively, everything else is replaced by the higher tier.

use serde_json::Value;

/// Merge `overlay` over `base`.
///
/// - Objects merge key by key
/// - Arrays and scalars in `overlay` replace `base`
/// - A null in `overlay` leaves `base` in place
///
/// ```
/// use serde_json::json;
/// use studydesk::config::deep_merge;
///
/// let defaults = json!({"server": {"host": "127.0.0.1", "port": 31995}});
/// let user = json!({"server": {"port": 8080}});
/// assert_eq!(
///     deep_merge(defaults, user),
///     json!({"server": {"host": "127.0.0.1", "port": 8080}})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
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

/// Fold tiers in order; later tiers take precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
