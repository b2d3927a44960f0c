//! Document access layer.
//!
//! [`DocumentStore`] is the only seam that touches persisted state. Handlers
//! go through the typed [`Repository`], which encodes entities, stamps them
//! and sanitizes what comes back out.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, DateTime, Document};
use thiserror::Error;

mod memory;
mod mongo;
pub mod public;
mod repo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use public::{to_public, PublicRecord};
pub use repo::{Repository, Stored};

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("document codec error: {0}")]
    Codec(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document and return its generated id as a hex string.
    /// A `created_at` timestamp is added when the document has none.
    async fn insert(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Up to `limit` documents whose fields equal every entry of `filter`,
    /// newest first. A non-positive limit yields nothing.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError>;

    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;

    fn backend_name(&self) -> &'static str;
}

/// Exact-match filter over top-level document fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: &str, value: impl Into<Bson>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.0.insert(field, value);
        self
    }

    /// Match on the generated id. Strings that are not ObjectIds are compared
    /// as-is and so match nothing the store generated.
    pub fn by_id(id: &str) -> Self {
        match ObjectId::parse_str(id) {
            Ok(oid) => Self::eq(ID_FIELD, oid),
            Err(_) => Self::eq(ID_FIELD, id),
        }
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

pub(crate) fn stamp_created_at(document: &mut Document) {
    if !document.contains_key(CREATED_AT_FIELD) {
        document.insert(CREATED_AT_FIELD, DateTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn by_id_parses_object_ids() {
        let oid = ObjectId::new();
        let filter = Filter::by_id(&oid.to_hex()).into_document();
        assert_eq!(filter, doc! { "_id": oid });
    }

    #[test]
    fn by_id_keeps_foreign_strings() {
        let filter = Filter::by_id("not-an-oid").into_document();
        assert_eq!(filter, doc! { "_id": "not-an-oid" });
    }

    #[test]
    fn filters_combine_fields() {
        let filter = Filter::eq("post_id", "p1").and("user_id", "u1").into_document();
        assert_eq!(filter, doc! { "post_id": "p1", "user_id": "u1" });
        assert!(Filter::all().into_document().is_empty());
    }

    #[test]
    fn stamping_keeps_an_existing_timestamp() {
        let at = DateTime::from_millis(42);
        let mut document = doc! { "created_at": at };
        stamp_created_at(&mut document);
        assert_eq!(document.get_datetime(CREATED_AT_FIELD).unwrap(), &at);

        let mut fresh = doc! { "content": "hi" };
        stamp_created_at(&mut fresh);
        assert!(fresh.get_datetime(CREATED_AT_FIELD).is_ok());
    }
}
