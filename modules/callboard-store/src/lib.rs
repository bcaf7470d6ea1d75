//! Storage backends and the services that enforce callboard's access
//! rules over them.
//!
//! The traits here are pure persistence: whole-record blobs keyed by slug
//! or username plus a set-valued owner index, atomic at single-key
//! granularity and nothing more. All business rules live in
//! [`EventAccess`] and [`Accounts`], so any backend implementing the
//! traits (Redis in production, [`MemoryStore`] in tests) behaves
//! identically.

use async_trait::async_trait;

use callboard_common::{CallboardError, Credential, Event};

pub mod access;
pub mod accounts;
pub mod client;
pub mod memory;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use access::EventAccess;
pub use accounts::Accounts;
pub use client::RedisStore;
pub use memory::MemoryStore;

/// Admin credential persistence. No update or delete: credentials are
/// written once at registration and only ever read back.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new credential. Fails with `AlreadyExists` if the
    /// username is taken.
    async fn register(&self, username: &str, secret: &str) -> Result<Credential, CallboardError>;

    async fn lookup(&self, username: &str) -> Result<Option<Credential>, CallboardError>;
}

/// Event persistence: one blob per slug, no business rules.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get(&self, slug: &str) -> Result<Option<Event>, CallboardError>;

    async fn put(&self, event: &Event) -> Result<(), CallboardError>;

    /// Remove an event blob. Returns false if the slug was absent.
    async fn delete(&self, slug: &str) -> Result<bool, CallboardError>;
}

/// Secondary index from owner to owned slugs. A back-reference only,
/// never the source of truth for an event's existence.
#[async_trait]
pub trait EventDirectory: Send + Sync {
    async fn add_to_owner(&self, owner: &str, slug: &str) -> Result<(), CallboardError>;

    async fn remove_from_owner(&self, owner: &str, slug: &str) -> Result<(), CallboardError>;

    /// Slugs registered under an owner. Order is unspecified but stable
    /// within one call.
    async fn slugs_for_owner(&self, owner: &str) -> Result<Vec<String>, CallboardError>;
}
