//! Mapping between backend JSON records and [`crate::model`] types.
//!
//! The backend speaks PascalCase (`Description`, `Cost`, `IsUsed`, ...) with
//! loosely typed values: numbers may arrive as strings or numbers, ids as
//! either, `IsUsed` as `0/1`, `"0"/"1"` or a boolean. Everything is settled
//! here so the rest of the crate only sees typed records.
use serde_json::{Map, Value, json};

use crate::model::{Alternate, LineItem};

pub const ALTERNATE_ID_FIELD: &str = "AlternateId";

/// Extract the record list from a list response: either a bare array or an
/// object with a `sample` array. Anything else yields nothing.
#[must_use]
pub fn list_records(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("sample") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[must_use]
pub fn line_item_from_wire(record: &Value, id_field: &str) -> LineItem {
    LineItem {
        id: id_text(record.get(id_field)),
        description: text(record.get("Description")),
        supplier: text(record.get("Supplier")),
        cost: text(record.get("Cost")),
        notes: text(record.get("Notes")),
        labor_type: optional_text(record.get("LaborType")),
        labor_hours: optional_text(record.get("LaborHours")),
        labor_cost: optional_text(record.get("LaborCost")),
    }
}

/// `parent_field` is the owning entity's id key (e.g. `PipingId`).
#[must_use]
pub fn alternate_from_wire(record: &Value, parent_field: &str) -> Alternate {
    Alternate {
        item: line_item_from_wire(record, ALTERNATE_ID_FIELD),
        used: is_used(record.get("IsUsed")),
        parent_id: id_text(record.get(parent_field)),
    }
}

/// Body for `POST /<entity>` and `PUT /<entity>/<id>`.
#[must_use]
pub fn primary_body(item: &LineItem) -> Value {
    Value::Object(item_fields(item))
}

/// Body for alternate writes. `parent` is `(parent_field, parent_id)` and is
/// only sent on create.
#[must_use]
pub fn alternate_body(alt: &Alternate, parent: Option<(&str, &str)>) -> Value {
    let mut map = Map::new();
    if let Some((field, id)) = parent {
        map.insert(field.to_string(), id_value(id));
    }
    map.extend(item_fields(&alt.item));
    map.insert("IsUsed".to_string(), json!(u8::from(alt.used)));
    Value::Object(map)
}

/// Read the id assigned by a create call. Accepts the entity's id key, its
/// camelCase spelling (`ERoughId` → `eRoughId` and `eroughId`), or a plain
/// `id`.
#[must_use]
pub fn created_id(response: &Value, id_field: &str) -> Option<String> {
    [
        id_field.to_string(),
        camel_case(id_field),
        lower_leading_caps(id_field),
        "id".to_string(),
    ]
    .iter()
    .find_map(|key| id_text(response.get(key)))
}

/// Whether an `IsUsed` value means "selected": numeric one or `true`.
#[must_use]
pub fn is_used(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok() == Some(1.0),
        _ => false,
    }
}

fn item_fields(item: &LineItem) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("Description".into(), json!(item.description));
    map.insert("Supplier".into(), json!(item.supplier));
    map.insert("Cost".into(), json!(item.cost));
    map.insert("Notes".into(), json!(item.notes));
    if let Some(v) = &item.labor_type {
        map.insert("LaborType".into(), json!(v));
    }
    if let Some(v) = &item.labor_hours {
        map.insert("LaborHours".into(), json!(v));
    }
    if let Some(v) = &item.labor_cost {
        map.insert("LaborCost".into(), json!(v));
    }
    map
}

// Numeric ids go back out as numbers so the backend's integer keys match.
fn id_value(id: &str) -> Value {
    id.parse::<i64>().map_or_else(|_| json!(id), |n| json!(n))
}

fn camel_case(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

// `ERoughId` -> `eroughId`: the whole leading run of capitals lowercased.
fn lower_leading_caps(field: &str) -> String {
    let split = field
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(field.len());
    let (caps, rest) = field.split_at(split);
    format!("{}{rest}", caps.to_ascii_lowercase())
}

fn text(value: Option<&Value>) -> String {
    optional_text(value).unwrap_or_default()
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
