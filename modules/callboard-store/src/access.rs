use std::sync::Arc;

use chrono::Utc;

use callboard_common::{validate_slug, CallboardError, Event, EventPatch, EventView, Identity};

use crate::{EventDirectory, EventStore};

/// The event access service: every read and write of an event goes
/// through here, which is where visibility filtering and the ownership
/// gate live. The backing store itself enforces nothing.
///
/// Writes are read-modify-write with no compare-and-swap and no per-slug
/// lock: the intended usage is a single human operator per event issuing
/// sequential actions, and two racing updates may lose one of them.
/// Callers wanting stronger guarantees need a store with native atomic
/// primitives, not a lock in this service.
pub struct EventAccess<S> {
    store: Arc<S>,
    auto_create: bool,
}

impl<S: EventStore + EventDirectory> EventAccess<S> {
    /// `auto_create` enables the permissive mode in which a view of an
    /// unknown slug creates an ownerless event instead of failing.
    /// Strict deployments pass false.
    pub fn new(store: Arc<S>, auto_create: bool) -> Self {
        Self { store, auto_create }
    }

    /// Visibility-filtered view of an event. One store read, no mutation
    /// (except in the permissive mode), safe at polling frequency.
    pub async fn view(&self, slug: &str, identity: &Identity) -> Result<EventView, CallboardError> {
        let event = match self.store.get(slug).await? {
            Some(event) => event,
            None if self.auto_create => {
                // Ownerless: nobody passes the ownership gate, and no
                // directory entry is written.
                let event = Event::new(slug, None, Utc::now());
                self.store.put(&event).await?;
                event
            }
            None => return Err(CallboardError::NotFound),
        };
        Ok(event.view_for(identity, Utc::now()))
    }

    /// Apply a sparse patch as the given caller. Authorization is checked
    /// before the patch is touched, so a rejected update is a strict
    /// no-op on stored state. Returns the full post-update event.
    pub async fn update(
        &self,
        slug: &str,
        identity: &Identity,
        patch: EventPatch,
    ) -> Result<Event, CallboardError> {
        let username = identity.username().ok_or(CallboardError::Unauthorized)?;
        let mut event = self
            .store
            .get(slug)
            .await?
            .ok_or(CallboardError::NotFound)?;
        if event.owner.as_deref() != Some(username) {
            return Err(CallboardError::Forbidden);
        }
        event.apply(patch);
        self.store.put(&event).await?;
        Ok(event)
    }

    /// Create an event owned by the caller, starting one hour out with an
    /// empty queue. Creation never adopts an existing event.
    pub async fn create(&self, slug: &str, identity: &Identity) -> Result<Event, CallboardError> {
        let username = identity.username().ok_or(CallboardError::Unauthorized)?;
        validate_slug(slug)?;
        if self.store.get(slug).await?.is_some() {
            return Err(CallboardError::AlreadyExists);
        }
        let event = Event::new(slug, Some(username.to_string()), Utc::now());
        self.store.put(&event).await?;
        self.store.add_to_owner(username, slug).await?;
        Ok(event)
    }

    /// Every event registered under the caller's directory entry. Slugs
    /// whose blob has vanished are skipped, not errors.
    pub async fn list_owned(&self, identity: &Identity) -> Result<Vec<Event>, CallboardError> {
        let username = identity.username().ok_or(CallboardError::Unauthorized)?;
        let mut events = Vec::new();
        for slug in self.store.slugs_for_owner(username).await? {
            if let Some(event) = self.store.get(&slug).await? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Remove an event and its directory entry. Store-layer operation,
    /// not exposed over HTTP.
    pub async fn delete(&self, slug: &str) -> Result<bool, CallboardError> {
        let Some(event) = self.store.get(slug).await? else {
            return Ok(false);
        };
        self.store.delete(slug).await?;
        if let Some(owner) = &event.owner {
            self.store.remove_from_owner(owner, slug).await?;
        }
        Ok(true)
    }
}
