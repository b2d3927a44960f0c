use std::{marker::PhantomData, sync::Arc};

use mongodb::bson::{self, Document};
use tracing::{debug, instrument};

use super::{public::id_string, to_public, DocumentStore, Filter, PublicRecord, StoreError, ID_FIELD};
use crate::entities::Entity;

/// Typed access to the collection of one entity type.
pub struct Repository<E> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

/// A decoded entity together with the document it was read from.
#[derive(Debug)]
pub struct Stored<E> {
    pub id: String,
    pub entity: E,
    document: Document,
}

impl<E> Stored<E> {
    pub fn into_public(self) -> PublicRecord {
        to_public(self.document)
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Persist `entity` and return the generated id.
    #[instrument(skip_all, fields(collection = E::COLLECTION))]
    pub async fn create(&self, entity: &E) -> Result<String, StoreError> {
        let document = bson::to_document(entity).map_err(|e| StoreError::Codec(e.to_string()))?;
        let id = self.store.insert(E::COLLECTION, document).await?;
        debug!(%id, "document created");
        Ok(id)
    }

    /// Up to `limit` sanitized records matching `filter`, newest first.
    #[instrument(skip_all, fields(collection = E::COLLECTION, limit = limit))]
    pub async fn list(&self, filter: Filter, limit: i64) -> Result<Vec<PublicRecord>, StoreError> {
        let documents = self
            .store
            .find(E::COLLECTION, filter.into_document(), limit)
            .await?;
        debug!(count = documents.len(), "documents listed");
        Ok(documents.into_iter().map(to_public).collect())
    }

    /// First record matching `filter`, decoded into the entity type.
    pub async fn find_one(&self, filter: Filter) -> Result<Option<Stored<E>>, StoreError> {
        let Some(document) = self
            .store
            .find(E::COLLECTION, filter.into_document(), 1)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let id = document.get(ID_FIELD).map(id_string).unwrap_or_default();
        let entity = bson::from_document::<E>(document.clone())
            .map_err(|e| StoreError::Codec(e.to_string()))?;
        Ok(Some(Stored {
            id,
            entity,
            document,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Comment, Post, Role, User};
    use crate::store::MemoryStore;

    fn repo<E: Entity>(store: &Arc<MemoryStore>) -> Repository<E> {
        Repository::new(store.clone() as Arc<dyn DocumentStore>)
    }

    fn post(group: &str, content: &str) -> Post {
        Post {
            group_id: group.into(),
            author_id: "u1".into(),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn create_then_read_back_by_id() {
        let store = Arc::new(MemoryStore::new());
        let posts = repo::<Post>(&store);

        let id = posts.create(&post("g1", "hello")).await.unwrap();
        let records = posts.list(Filter::by_id(&id), 10).await.unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["id"], id.as_str());
        assert_eq!(record["group_id"], "g1");
        assert_eq!(record["author_id"], "u1");
        assert_eq!(record["content"], "hello");
        assert!(record.contains_key("created_at"));
    }

    #[tokio::test]
    async fn stored_credentials_never_surface() {
        let store = Arc::new(MemoryStore::new());
        let users = repo::<User>(&store);
        let user = User::registered("A".into(), "a@x.com".into(), "secret-hash".into());

        let id = users.create(&user).await.unwrap();
        let listed = users.list(Filter::all(), 10).await.unwrap();
        assert!(!listed[0].contains_key("password_hash"));

        let stored = users.find_one(Filter::by_id(&id)).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.entity.password_hash.as_deref(), Some("secret-hash"));
        assert_eq!(stored.entity.role, Role::User);
        let public = stored.into_public();
        assert!(!public.contains_key("password_hash"));
        assert_eq!(public["role"], "user");
    }

    #[tokio::test]
    async fn list_with_no_match_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let comments = repo::<Comment>(&store);
        let records = comments
            .list(Filter::eq(Comment::POST_ID, "missing"), 10)
            .await
            .unwrap();
        assert!(records.is_empty());
        assert!(comments.find_one(Filter::all()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_capped_by_limit() {
        let store = Arc::new(MemoryStore::new());
        let posts = repo::<Post>(&store);
        for n in 0..7 {
            posts.create(&post("g1", &format!("post {n}"))).await.unwrap();
        }
        let records = posts.list(Filter::eq(Post::GROUP_ID, "g1"), 5).await.unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0]["content"], "post 6");
    }
}
