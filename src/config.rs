use anyhow::Context;
use serde::Deserialize;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DATABASE_NAME_VAR: &str = "DATABASE_NAME";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: u64,
    pub refresh_ttl_minutes: u64,
}

/// Which document store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Mongo { url: String, database: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match env_or("DOCUMENT_STORE", "mongo").as_str() {
            "memory" => StoreConfig::Memory,
            "mongo" | "mongodb" => StoreConfig::Mongo {
                url: std::env::var(DATABASE_URL_VAR)
                    .with_context(|| format!("{DATABASE_URL_VAR} must be set"))?,
                database: std::env::var(DATABASE_NAME_VAR)
                    .with_context(|| format!("{DATABASE_NAME_VAR} must be set"))?,
            },
            other => anyhow::bail!("unknown DOCUMENT_STORE `{other}` (expected mongo or memory)"),
        };

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: env_or("JWT_ISSUER", "campus-social"),
            audience: env_or("JWT_AUDIENCE", "campus-social-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };

        let port = env_parse("APP_PORT")
            .or_else(|| env_parse("PORT"))
            .unwrap_or(8000);

        Ok(Self {
            store,
            jwt,
            host: env_or("APP_HOST", "0.0.0.0"),
            port,
        })
    }
}
