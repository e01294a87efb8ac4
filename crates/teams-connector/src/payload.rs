//! Shared helpers for the ordered JSON mappings the builders accumulate.

use serde_json::{json, Map, Value};

/// Ordered mapping of MessageCard field names to values.
pub type Payload = Map<String, Value>;

/// Append `item` to the array stored under `key`, creating the array on first use.
pub(crate) fn append(payload: &mut Payload, key: &str, item: Value) {
    let slot = payload
        .entry(key)
        .or_insert_with(|| Value::Array(Vec::new()));

    match slot {
        Value::Array(items) => items.push(item),
        other => *other = Value::Array(vec![item]),
    }
}

/// A `ViewAction` button that opens `url`.
pub(crate) fn view_action(text: impl Into<String>, url: impl Into<String>) -> Value {
    json!({
        "@context": "http://schema.org",
        "@type": "ViewAction",
        "name": text.into(),
        "target": [url.into()],
    })
}
