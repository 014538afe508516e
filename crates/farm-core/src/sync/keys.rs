//! Local -> remote key translation applied right before every remote write.
//!
//! Top-level keys go through the entity's explicit field table. Nested
//! objects and arrays carry no schema of their own, so their keys are
//! rewritten structurally from camelCase to snake_case. Values are never
//! touched.

use serde_json::{Map, Value};

use crate::models::EntityType;

/// `fieldName` -> `field_name`
pub fn camel_to_snake(key: &str) -> String {
    let mut snake = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                snake.push('_');
            }
            snake.push(ch.to_ascii_lowercase());
        } else {
            snake.push(ch);
        }
    }
    snake
}

/// Rename every object key in `value`, recursing through objects and arrays
pub fn to_remote_keys(value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (camel_to_snake(key), to_remote_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_remote_keys).collect()),
        leaf => leaf.clone(),
    }
}

/// Translate a queued payload for `entity_type` into the remote column layout
pub fn to_remote_payload(entity_type: EntityType, data: &Value) -> Value {
    let Value::Object(fields) = data else {
        return to_remote_keys(data);
    };

    let table = entity_type.remote_fields();
    let translated: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| {
            let remote_key = table
                .iter()
                .find(|(local, _)| local == key)
                .map_or_else(
                    || {
                        tracing::warn!(
                            "No remote column mapped for {entity_type}.{key}; using snake_case"
                        );
                        camel_to_snake(key)
                    },
                    |(_, remote)| (*remote).to_string(),
                );
            (remote_key, to_remote_keys(value))
        })
        .collect();

    Value::Object(translated)
}
