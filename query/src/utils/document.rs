//! BSON document utility functions

use bson::oid::ObjectId;
use bson::{Bson, Document};
use serde_json::Value as JsonValue;

/// Length of a hex-encoded ObjectId
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// Convert a decoded JSON value into its BSON equivalent.
///
/// Integers that fit in i64 become `Int64`, other numbers become `Double`.
/// Objects keep their key order.
pub fn json_to_bson(value: &JsonValue) -> Bson {
    match value {
        JsonValue::Null => Bson::Null,
        JsonValue::Bool(b) => Bson::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Bson::Int64(i),
            None => n.as_f64().map_or(Bson::Null, Bson::Double),
        },
        JsonValue::String(s) => Bson::String(s.clone()),
        JsonValue::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        JsonValue::Object(map) => Bson::Document(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_bson(v)))
                .collect::<Document>(),
        ),
    }
}

/// Parse a JSON string value as an ObjectId.
///
/// Only strings of exactly 24 characters that decode as hex qualify.
pub fn parse_object_id(value: &JsonValue) -> Option<ObjectId> {
    match value {
        JsonValue::String(s) if s.len() == OBJECT_ID_HEX_LEN => ObjectId::parse_str(s).ok(),
        _ => None,
    }
}
