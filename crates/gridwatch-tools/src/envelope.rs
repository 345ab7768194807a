use serde_json::{json, Map, Value};

/// Build the success envelope: `{"meta": {...}, <payload keys>}`.
pub fn success(meta: Value, payload: Map<String, Value>) -> Value {
    let mut object = Map::with_capacity(payload.len() + 1);
    object.insert("meta".to_string(), meta);
    for (key, value) in payload {
        object.insert(key, value);
    }
    Value::Object(object)
}

/// Build the failure envelope: `{"error": "<message>"}`.
pub fn failure(message: &str) -> Value {
    json!({ "error": message })
}

/// Render an envelope for the transport boundary.
pub fn render(envelope: &Value, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(envelope).unwrap_or_else(|_| envelope.to_string())
    } else {
        envelope.to_string()
    }
}
