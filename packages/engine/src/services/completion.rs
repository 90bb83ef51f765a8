//! Completion flags on matched cards.
//!
//! Completion is per-user: each partner marks their own copy of a match done
//! or not done, and neither side's flag moves the other's.

use tracing::debug;

use crate::domain::card::CardId;
use crate::domain::user::UserId;
use crate::errors::domain::DomainError;
use crate::errors::store::StoreError;
use crate::services::{conflict_exhausted, MAX_COMMIT_RETRIES};
use crate::store::{retry_transient, DocumentStore, RetryPolicy, WriteBatch};

/// Toggles and reads per-user completion flags.
#[derive(Debug, Clone, Default)]
pub struct CompletionService {
    retry: RetryPolicy,
}

impl CompletionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Set the completion flag for a matched card. Returns whether the flag
    /// actually changed; setting it to its current value writes nothing.
    pub async fn set_done(
        &self,
        store: &dyn DocumentStore,
        user_id: &UserId,
        card: &CardId,
        done: bool,
    ) -> Result<bool, DomainError> {
        retry_transient(&self.retry, "set_done", move || async move {
            let mut last_conflict = None;
            for _ in 0..MAX_COMMIT_RETRIES {
                let Some(user) = store.get(user_id).await? else {
                    return Err(DomainError::UserNotFound {
                        id: user_id.clone(),
                    });
                };
                if !user.matches.contains(card) {
                    return Err(DomainError::NotMatched {
                        user: user_id.clone(),
                        card: card.clone(),
                    });
                }
                if user.is_done(card) == done {
                    debug!(user_id = %user_id, card = %card, done, "completion flag already set");
                    return Ok(false);
                }

                let mut next = user;
                if done {
                    next.done.insert(card.clone());
                } else {
                    next.done.remove(card);
                }
                match store.commit(WriteBatch::new().write(next)).await {
                    Ok(()) => {
                        debug!(user_id = %user_id, card = %card, done, "completion flag updated");
                        return Ok(true);
                    }
                    Err(err @ StoreError::RevisionMismatch { .. }) => {
                        last_conflict = Some(err);
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(conflict_exhausted("set_done", last_conflict))
        })
        .await
    }

    /// Current completion flag for `(user, card)`.
    pub async fn is_done(
        &self,
        store: &dyn DocumentStore,
        user_id: &UserId,
        card: &CardId,
    ) -> Result<bool, DomainError> {
        let Some(user) = store.get(user_id).await? else {
            return Err(DomainError::UserNotFound {
                id: user_id.clone(),
            });
        };
        Ok(user.is_done(card))
    }
}
