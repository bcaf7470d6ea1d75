use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use callboard_common::{CallboardError, Credential, Event};

use crate::{CredentialStore, EventDirectory, EventStore};

/// In-memory backend with the same single-key semantics as Redis. Used as
/// the injected substitute store in tests; also fine for throwaway local
/// runs where persistence does not matter.
#[derive(Default)]
pub struct MemoryStore {
    credentials: RwLock<HashMap<String, Credential>>,
    events: RwLock<HashMap<String, Event>>,
    // BTreeSet so listing order is stable within a call, like SMEMBERS
    // against an unchanged set.
    directory: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn register(&self, username: &str, secret: &str) -> Result<Credential, CallboardError> {
        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(username) {
            return Err(CallboardError::AlreadyExists);
        }
        let credential = Credential {
            username: username.to_string(),
            secret: secret.to_string(),
        };
        credentials.insert(username.to_string(), credential.clone());
        Ok(credential)
    }

    async fn lookup(&self, username: &str) -> Result<Option<Credential>, CallboardError> {
        Ok(self.credentials.read().await.get(username).cloned())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn get(&self, slug: &str) -> Result<Option<Event>, CallboardError> {
        Ok(self.events.read().await.get(slug).cloned())
    }

    async fn put(&self, event: &Event) -> Result<(), CallboardError> {
        self.events
            .write()
            .await
            .insert(event.slug.clone(), event.clone());
        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<bool, CallboardError> {
        Ok(self.events.write().await.remove(slug).is_some())
    }
}

#[async_trait]
impl EventDirectory for MemoryStore {
    async fn add_to_owner(&self, owner: &str, slug: &str) -> Result<(), CallboardError> {
        self.directory
            .write()
            .await
            .entry(owner.to_string())
            .or_default()
            .insert(slug.to_string());
        Ok(())
    }

    async fn remove_from_owner(&self, owner: &str, slug: &str) -> Result<(), CallboardError> {
        if let Some(slugs) = self.directory.write().await.get_mut(owner) {
            slugs.remove(slug);
        }
        Ok(())
    }

    async fn slugs_for_owner(&self, owner: &str) -> Result<Vec<String>, CallboardError> {
        Ok(self
            .directory
            .read()
            .await
            .get(owner)
            .map(|slugs| slugs.iter().cloned().collect())
            .unwrap_or_default())
    }
}
