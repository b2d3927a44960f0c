use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::{stamp_created_at, DocumentStore, StoreError, CREATED_AT_FIELD, ID_FIELD};

/// In-process document store. Contents live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    #[cfg(test)]
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

fn sort_key(document: &Document) -> (Option<&Bson>, Option<&Bson>) {
    (document.get(CREATED_AT_FIELD), document.get(ID_FIELD))
}

fn newest_first(a: &Document, b: &Document) -> std::cmp::Ordering {
    let (a_at, a_id) = sort_key(a);
    let (b_at, b_id) = sort_key(b);
    let by_time = match (a_at, b_at) {
        (Some(Bson::DateTime(a)), Some(Bson::DateTime(b))) => b.cmp(a),
        _ => std::cmp::Ordering::Equal,
    };
    by_time.then_with(|| match (a_id, b_id) {
        (Some(Bson::ObjectId(a)), Some(Bson::ObjectId(b))) => b.cmp(a),
        _ => std::cmp::Ordering::Equal,
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        stamp_created_at(&mut document);
        let id = ObjectId::new();
        document.insert(ID_FIELD, id);
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id.to_hex())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        found.sort_by(newest_first);
        found.truncate(limit);
        Ok(found)
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let id = store.insert("post", doc! { "content": "hi" }).await.unwrap();

        let found = store
            .find("post", doc! { "_id": ObjectId::parse_str(&id).unwrap() }, 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_str("content").unwrap(), "hi");
        assert!(found[0].get_datetime(CREATED_AT_FIELD).is_ok());
    }

    #[tokio::test]
    async fn find_applies_exact_match_filter() {
        let store = MemoryStore::new();
        store.insert("post", doc! { "group_id": "g1" }).await.unwrap();
        store.insert("post", doc! { "group_id": "g2" }).await.unwrap();
        store.insert("post", doc! { "group_id": "g1" }).await.unwrap();

        let g1 = store.find("post", doc! { "group_id": "g1" }, 10).await.unwrap();
        assert_eq!(g1.len(), 2);
        let all = store.find("post", doc! {}, 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn find_on_missing_collection_is_empty() {
        let store = MemoryStore::new();
        let found = store.find("nothing", doc! {}, 10).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn find_honours_limit_and_returns_newest_first() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store.insert("like", doc! { "n": n }).await.unwrap();
        }
        let found = store.find("like", doc! {}, 3).await.unwrap();
        let ns: Vec<i32> = found.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, vec![4, 3, 2]);

        assert!(store.find("like", doc! {}, 0).await.unwrap().is_empty());
        assert!(store.find("like", doc! {}, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_collection_names_sorted() {
        let store = MemoryStore::new();
        store.insert("user", doc! {}).await.unwrap();
        store.insert("group", doc! {}).await.unwrap();
        assert_eq!(store.collection_names().await.unwrap(), vec!["group", "user"]);
        assert_eq!(store.count("user").await, 1);
        assert_eq!(store.count("post").await, 0);
    }
}
