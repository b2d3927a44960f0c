use std::sync::Arc;

use tracing::warn;

use crate::config::{AppConfig, StoreConfig};
use crate::entities::Entity;
use crate::store::{DocumentStore, MemoryStore, MongoStore, Repository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.store {
            StoreConfig::Mongo { url, database } => {
                Arc::new(MongoStore::connect(url, database).await?) as Arc<dyn DocumentStore>
            }
            StoreConfig::Memory => {
                warn!("using the in-memory document store; data is lost on restart");
                Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>
            }
        };

        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    pub fn repo<E: Entity>(&self) -> Repository<E> {
        Repository::new(Arc::clone(&self.store))
    }

    /// State over a fresh in-memory store, with the store handed back for
    /// inspection.
    #[cfg(test)]
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = Arc::new(AppConfig {
            store: StoreConfig::Memory,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            host: "127.0.0.1".into(),
            port: 0,
        });
        let state = Self::from_parts(config, store.clone() as Arc<dyn DocumentStore>);
        (state, store)
    }
}
