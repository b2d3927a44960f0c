//! Caller-safe view of stored documents.

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

use super::ID_FIELD;

/// A stored document as it may leave the service.
pub type PublicRecord = Map<String, Value>;

pub const PUBLIC_ID_FIELD: &str = "id";

/// Fields that never leave the service, whatever the collection.
pub const CREDENTIAL_FIELDS: &[&str] = &["password_hash"];

/// Rename `_id` to a string `id`, drop credentials, keep everything else.
pub fn to_public(mut document: Document) -> PublicRecord {
    let id = document.remove(ID_FIELD);

    let mut record = PublicRecord::new();
    for (field, value) in document {
        if CREDENTIAL_FIELDS.contains(&field.as_str()) {
            continue;
        }
        record.insert(field, to_json(value));
    }
    if let Some(id) = id {
        record.insert(PUBLIC_ID_FIELD.to_string(), Value::String(id_string(&id)));
    }
    record
}

/// String form of a generated identifier.
pub fn id_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(at) => match at.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(at.timestamp_millis()),
        },
        Bson::Document(inner) => Value::Object(
            inner
                .into_iter()
                .map(|(field, value)| (field, to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}
