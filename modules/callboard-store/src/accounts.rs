use std::sync::Arc;

use tracing::warn;

use callboard_common::{CallboardError, Identity};

use crate::CredentialStore;

const MIN_USERNAME_CHARS: usize = 3;
const MIN_SECRET_CHARS: usize = 4;

/// Account registration, interactive login, and caller-identity
/// resolution over a [`CredentialStore`].
pub struct Accounts<S> {
    store: Arc<S>,
}

impl<S: CredentialStore> Accounts<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new admin account. Length policy is enforced here, not
    /// in the store.
    pub async fn register(&self, username: &str, secret: &str) -> Result<String, CallboardError> {
        if username.chars().count() < MIN_USERNAME_CHARS {
            return Err(CallboardError::Validation(format!(
                "username must be at least {MIN_USERNAME_CHARS} characters"
            )));
        }
        if secret.chars().count() < MIN_SECRET_CHARS {
            return Err(CallboardError::Validation(format!(
                "password must be at least {MIN_SECRET_CHARS} characters"
            )));
        }
        let credential = self.store.register(username, secret).await?;
        Ok(credential.username)
    }

    /// Interactive login: same comparison as [`resolve`](Self::resolve),
    /// but a mismatch surfaces as `InvalidCredentials` so the caller can
    /// report it.
    pub async fn login(&self, username: &str, secret: &str) -> Result<String, CallboardError> {
        match self.store.lookup(username).await? {
            Some(credential)
                if constant_time_eq(credential.secret.as_bytes(), secret.as_bytes()) =>
            {
                Ok(credential.username)
            }
            _ => Err(CallboardError::InvalidCredentials),
        }
    }

    /// Resolve a presented credential pair into an identity. Never errors:
    /// a missing presentation, a mismatch, or even a store failure all
    /// degrade to `Anonymous` so read paths keep serving.
    pub async fn resolve(&self, presented: Option<(&str, &str)>) -> Identity {
        let Some((username, secret)) = presented else {
            return Identity::Anonymous;
        };
        match self.login(username, secret).await {
            Ok(username) => Identity::Verified(username),
            Err(CallboardError::Store(e)) => {
                warn!(error = %e, "credential lookup failed, treating caller as anonymous");
                Identity::Anonymous
            }
            Err(_) => Identity::Anonymous,
        }
    }
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn accounts() -> Accounts<MemoryStore> {
        Accounts::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn register_enforces_length_policy() {
        let accounts = accounts();
        assert!(matches!(
            accounts.register("ab", "longenough").await,
            Err(CallboardError::Validation(_))
        ));
        assert!(matches!(
            accounts.register("alice", "pw").await,
            Err(CallboardError::Validation(_))
        ));
        assert_eq!(accounts.register("alice", "pw12").await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn register_rejects_taken_usernames() {
        let accounts = accounts();
        accounts.register("alice", "pw12").await.unwrap();
        assert!(matches!(
            accounts.register("alice", "pw34").await,
            Err(CallboardError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn login_is_exact_and_case_sensitive() {
        let accounts = accounts();
        accounts.register("alice", "Secret1").await.unwrap();
        assert!(accounts.login("alice", "Secret1").await.is_ok());
        for (user, pass) in [
            ("alice", "secret1"),
            ("alice", "Secret1 "),
            ("Alice", "Secret1"),
            ("nobody", "Secret1"),
        ] {
            assert!(matches!(
                accounts.login(user, pass).await,
                Err(CallboardError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn resolve_never_errors() {
        let accounts = accounts();
        accounts.register("alice", "pw12").await.unwrap();

        assert_eq!(accounts.resolve(None).await, Identity::Anonymous);
        assert_eq!(
            accounts.resolve(Some(("alice", "wrong"))).await,
            Identity::Anonymous
        );
        assert_eq!(
            accounts.resolve(Some(("alice", "pw12"))).await,
            Identity::Verified("alice".to_string())
        );
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
