use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use super::{stamp_created_at, DocumentStore, StoreError};
use crate::entities::{Entity, User};

const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);
const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed document store.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
    email_index: Arc<OnceCell<()>>,
}

/// Driver retries are switched off; a failed call surfaces as `Unavailable`.
fn apply_options(options: &mut ClientOptions) {
    options.app_name = Some("campus-social".into());
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    options.retry_reads = Some(false);
    options.retry_writes = Some(false);
}

fn email_index() -> IndexModel {
    let mut keys = Document::new();
    keys.insert(User::EMAIL, 1);
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

impl MongoStore {
    /// Build the client once at start-up. An unreachable server is logged and
    /// tolerated; requests then fail with `StoreError::Unavailable`.
    pub async fn connect(url: &str, database: &str) -> anyhow::Result<Self> {
        let mut options = ClientOptions::parse(url)
            .await
            .context("parse DATABASE_URL")?;
        apply_options(&mut options);
        let client = Client::with_options(options).context("build mongodb client")?;

        let store = Self::from_database(client.database(database));
        match store.db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                info!(database, "document store reachable");
                store.ensure_email_index().await;
            }
            Err(e) => warn!(error = %e, "document store not reachable at startup; continuing"),
        }
        Ok(store)
    }

    fn from_database(db: Database) -> Self {
        Self {
            db,
            email_index: Arc::new(OnceCell::new()),
        }
    }

    /// Creates the unique email index once. A failure leaves the cell empty so
    /// the next user insert tries again.
    async fn ensure_email_index(&self) {
        let created = self
            .email_index
            .get_or_try_init(|| async {
                self.db
                    .collection::<Document>(User::COLLECTION)
                    .create_index(email_index())
                    .await
                    .map(|_| ())
            })
            .await;
        if let Err(e) = created {
            error!(error = %e, "unique email index not created; duplicate emails can slip through");
        }
    }
}

fn map_err(e: MongoError) -> StoreError {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
            StoreError::Duplicate(write.message.clone())
        }
        _ => StoreError::Unavailable(e.to_string()),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        if collection == User::COLLECTION && !self.email_index.initialized() {
            self.ensure_email_index().await;
        }
        stamp_created_at(&mut document);
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document)
            .await
            .map_err(map_err)?;
        let id = match result.inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => result.inserted_id.to_string(),
        };
        debug!(collection, %id, "mongodb insert_one");
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        // limit(0) means "no limit" to the server.
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .limit(limit)
            .await
            .map_err(map_err)?;
        cursor.try_collect().await.map_err(map_err)
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.db.list_collection_names().await.map_err(map_err)
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
