//! Product listing envelope.
//!
//! Accepts `[...]`, `{ "items": [...] }` or `{ "products": [...] }` and
//! always answers `{ "items": [...], "products": [...] }` with friendly
//! `title`/`image`/`description` aliases on every record.

use axum::http::HeaderValue;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ResponseTransform, TransformError};

const TITLE_FIELDS: &[&str] = &["title", "name"];
const IMAGE_FIELDS: &[&str] = &["image", "image_url"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "short_desc", "long_desc"];

#[derive(Serialize)]
struct Envelope<'a> {
    items: &'a [Value],
    products: &'a [Value],
}

/// Reshapes product listings into the dual-keyed envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductEnvelope;

impl ResponseTransform for ProductEnvelope {
    fn name(&self) -> &'static str {
        "product_envelope"
    }

    fn accepts(&self, content_type: &str) -> bool {
        content_type.contains("application/json")
    }

    fn transform(&self, body: &[u8]) -> Result<Bytes, TransformError> {
        let value: Value = serde_json::from_slice(body)?;
        let items: Vec<Value> = extract_items(value).into_iter().map(normalize_item).collect();
        let payload = serde_json::to_vec(&Envelope {
            items: &items,
            products: &items,
        })?;
        Ok(Bytes::from(payload))
    }

    fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static("application/json; charset=utf-8")
    }
}

/// Bare array, then `items`, then `products`, else nothing.
fn extract_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("items") {
            Some(Value::Array(items)) => items,
            _ => match fields.remove("products") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
        },
        _ => Vec::new(),
    }
}

/// Shallow copy of the record with the three aliases set. Existing keys keep
/// their position; new keys are appended.
fn normalize_item(item: Value) -> Value {
    let mut record = match item {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };

    let title = first_present(&record, TITLE_FIELDS);
    let image = first_present(&record, IMAGE_FIELDS);
    let description = first_present(&record, DESCRIPTION_FIELDS);

    record.insert("title".to_string(), title);
    record.insert("image".to_string(), image);
    record.insert("description".to_string(), description);
    Value::Object(record)
}

/// First field that is present and not null; an empty string counts as present.
fn first_present(record: &Map<String, Value>, fields: &[&str]) -> Value {
    fields
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|value| !value.is_null())
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}
