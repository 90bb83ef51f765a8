//! Short code issuance and resolution.

use tracing::{debug, warn};

use crate::domain::user::{ShortCode, UserId};
use crate::errors::domain::DomainError;
use crate::store::DocumentStore;
use crate::utils::short_code;

/// Issues unique pairing codes and resolves typed-in codes to their owners.
#[derive(Debug, Clone)]
pub struct CodeRegistry {
    max_attempts: u32,
}

impl Default for CodeRegistry {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a code no current user holds.
    ///
    /// The check here closes the common case; the store's unique code index
    /// closes the race window. Callers treat `CodeTaken` from a subsequent
    /// create as one more collision.
    pub async fn issue_code(&self, store: &dyn DocumentStore) -> Result<ShortCode, DomainError> {
        for attempt in 1..=self.max_attempts {
            let candidate = short_code::generate();
            if store.find_by_short_code(&candidate).await?.is_none() {
                debug!(code = %candidate.redacted(), attempt, "issued short code");
                return Ok(candidate);
            }
            warn!(attempt, "short code collision, regenerating");
        }
        Err(DomainError::RegistryExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Resolve user-entered code text to the owning user's id.
    ///
    /// Input is normalized before lookup, so case and the confusable letters
    /// do not matter.
    pub async fn resolve_code(
        &self,
        store: &dyn DocumentStore,
        input: &str,
    ) -> Result<UserId, DomainError> {
        let code = short_code::normalize(input);
        match store.find_by_short_code(&code).await? {
            Some(user) => Ok(user.id),
            None => {
                debug!(code = %code.redacted(), "short code lookup missed");
                Err(DomainError::CodeNotFound { code })
            }
        }
    }

    pub(crate) fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use time::macros::datetime;
    use tokio::sync::watch;

    use super::*;
    use crate::domain::user::User;
    use crate::errors::store::StoreError;
    use crate::store::{MemoryStore, WriteBatch};

    /// Store whose code index is (pretend) completely full.
    struct SaturatedStore;

    #[async_trait]
    impl DocumentStore for SaturatedStore {
        async fn get(&self, _id: &UserId) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn get_many(&self, ids: &[UserId]) -> Result<Vec<Option<User>>, StoreError> {
            Ok(vec![None; ids.len()])
        }

        async fn find_by_short_code(
            &self,
            code: &ShortCode,
        ) -> Result<Option<User>, StoreError> {
            Ok(Some(User::new(
                UserId::from("u-holder"),
                code.clone(),
                None,
                datetime!(2025-06-01 12:00 UTC),
            )))
        }

        async fn create(&self, user: User) -> Result<User, StoreError> {
            Err(StoreError::CodeTaken {
                code: user.short_code,
            })
        }

        async fn commit(&self, _batch: WriteBatch) -> Result<(), StoreError> {
            Ok(())
        }

        fn watch(&self, _id: &UserId) -> watch::Receiver<Option<User>> {
            watch::channel(None).1
        }
    }

    #[tokio::test]
    async fn issue_code_gives_up_after_attempt_budget() {
        let registry = CodeRegistry::new();
        let err = registry.issue_code(&SaturatedStore).await;
        assert_eq!(err, Err(DomainError::RegistryExhausted { attempts: 5 }));
    }

    #[tokio::test]
    async fn issue_code_returns_unused_code() {
        let store = MemoryStore::new();
        let registry = CodeRegistry::new();
        let code = registry.issue_code(&store).await.unwrap();
        assert_eq!(code.as_str().len(), short_code::CODE_LEN);
    }

    #[tokio::test]
    async fn resolve_code_normalizes_input() {
        let store = MemoryStore::new();
        let registry = CodeRegistry::new();

        let user = User::new(
            UserId::from("u-1"),
            ShortCode::from_normalized("AB12CD"),
            None,
            datetime!(2025-06-01 12:00 UTC),
        );
        store.create(user).await.unwrap();

        let resolved = registry.resolve_code(&store, " ab12cd ").await.unwrap();
        assert_eq!(resolved, UserId::from("u-1"));
    }

    #[tokio::test]
    async fn resolve_unknown_code_fails() {
        let store = MemoryStore::new();
        let registry = CodeRegistry::new();

        let err = registry.resolve_code(&store, "ZZZZ99").await;
        assert_eq!(
            err,
            Err(DomainError::CodeNotFound {
                code: ShortCode::from_normalized("ZZZZ99"),
            })
        );
    }
}
