use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use callboard_common::{CallboardError, Credential, Event};

use crate::{CredentialStore, EventDirectory, EventStore};

/// Redis-backed store. Events and credentials are JSON blobs; the owner
/// directory is a Redis set. One `ConnectionManager` is created at
/// startup and shared by reference across request handlers; it multiplexes
/// and reconnects internally, so concurrent use needs no further locking.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

// Key helpers
fn event_key(slug: &str) -> String {
    format!("queue:{slug}")
}

fn credential_key(username: &str) -> String {
    format!("admin:{username}")
}

fn directory_key(owner: &str) -> String {
    format!("admin-events:{owner}")
}

fn store_err(e: impl std::fmt::Display) -> CallboardError {
    CallboardError::Store(e.to_string())
}

impl RedisStore {
    /// Connect to Redis at the given URL (e.g. "redis://127.0.0.1:6379").
    pub async fn connect(redis_url: &str) -> Result<Self, CallboardError> {
        let client = Client::open(redis_url).map_err(store_err)?;
        let conn = ConnectionManager::new(client).await.map_err(store_err)?;
        Ok(Self { conn })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CallboardError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(store_err)?;
        match raw {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(store_err),
            None => Ok(None),
        }
    }

    async fn put_json<T: serde::Serialize>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CallboardError> {
        let mut conn = self.conn.clone();
        let raw = serde_json::to_string(value).map_err(store_err)?;
        conn.set::<_, _, ()>(key, raw).await.map_err(store_err)
    }
}

#[async_trait]
impl CredentialStore for RedisStore {
    async fn register(&self, username: &str, secret: &str) -> Result<Credential, CallboardError> {
        // Read-then-write, same as the event path: a single interactive
        // registrant per username is the intended usage.
        if self.lookup(username).await?.is_some() {
            return Err(CallboardError::AlreadyExists);
        }
        let credential = Credential {
            username: username.to_string(),
            secret: secret.to_string(),
        };
        self.put_json(&credential_key(username), &credential).await?;
        Ok(credential)
    }

    async fn lookup(&self, username: &str) -> Result<Option<Credential>, CallboardError> {
        self.get_json(&credential_key(username)).await
    }
}

#[async_trait]
impl EventStore for RedisStore {
    async fn get(&self, slug: &str) -> Result<Option<Event>, CallboardError> {
        self.get_json(&event_key(slug)).await
    }

    async fn put(&self, event: &Event) -> Result<(), CallboardError> {
        self.put_json(&event_key(&event.slug), event).await
    }

    async fn delete(&self, slug: &str) -> Result<bool, CallboardError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(event_key(slug)).await.map_err(store_err)?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl EventDirectory for RedisStore {
    async fn add_to_owner(&self, owner: &str, slug: &str) -> Result<(), CallboardError> {
        let mut conn = self.conn.clone();
        conn.sadd::<_, _, ()>(directory_key(owner), slug)
            .await
            .map_err(store_err)
    }

    async fn remove_from_owner(&self, owner: &str, slug: &str) -> Result<(), CallboardError> {
        let mut conn = self.conn.clone();
        conn.srem::<_, _, ()>(directory_key(owner), slug)
            .await
            .map_err(store_err)
    }

    async fn slugs_for_owner(&self, owner: &str) -> Result<Vec<String>, CallboardError> {
        let mut conn = self.conn.clone();
        conn.smembers(directory_key(owner)).await.map_err(store_err)
    }
}
