//! Decision recording with optimistic concurrency.
//!
//! The recorder never holds locks across records. Each round loads fresh
//! snapshots of both paired records, applies the pure decision logic, and
//! commits with a read set spanning the pair. If anything moved in between,
//! the commit fails and the round repeats against the new state. That loop is
//! what turns two simultaneous likes into exactly one match: the second
//! commit to land is forced to re-read, sees the partner's like, and creates
//! the match itself (or finds it already created and writes nothing extra).

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::domain::card::CardId;
use crate::domain::decision::{Decision, DecisionOutcome};
use crate::domain::matching::apply_decision;
use crate::domain::user::UserId;
use crate::errors::domain::DomainError;
use crate::errors::store::StoreError;
use crate::services::pairing::PairingService;
use crate::services::{conflict_exhausted, MAX_COMMIT_RETRIES};
use crate::store::{retry_transient, DocumentStore, RetryPolicy, WriteBatch};

/// Records likes and dislikes, creating matches on mutual likes.
#[derive(Debug, Clone, Default)]
pub struct DecisionService {
    pairing: PairingService,
    retry: RetryPolicy,
}

impl DecisionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(retry: RetryPolicy) -> Self {
        Self {
            pairing: PairingService::new(),
            retry,
        }
    }

    /// Record `decision` for `(user, card)` relative to partner `partner_id`.
    ///
    /// At most one decision is ever stored per (user, card); repeats come
    /// back as `AlreadyDecided`. Requires an intact partner link.
    pub async fn record_decision(
        &self,
        store: &dyn DocumentStore,
        user_id: &UserId,
        partner_id: &UserId,
        card: &CardId,
        decision: Decision,
    ) -> Result<DecisionOutcome, DomainError> {
        retry_transient(&self.retry, "record_decision", move || {
            self.record_with_conflict_retries(store, user_id, partner_id, card, decision)
        })
        .await
    }

    async fn record_with_conflict_retries(
        &self,
        store: &dyn DocumentStore,
        user_id: &UserId,
        partner_id: &UserId,
        card: &CardId,
        decision: Decision,
    ) -> Result<DecisionOutcome, DomainError> {
        let mut last_conflict = None;
        for round in 0..MAX_COMMIT_RETRIES {
            let (user, partner) = self
                .pairing
                .ensure_symmetric(store, user_id, partner_id)
                .await?;

            let mut user_next = user.clone();
            let mut partner_next = partner.clone();
            let outcome = apply_decision(
                &mut user_next,
                &mut partner_next,
                card,
                decision,
                OffsetDateTime::now_utc(),
            );

            if let DecisionOutcome::AlreadyDecided { decision: existing } = outcome {
                debug!(user_id = %user_id, card = %card, ?existing, "decision already recorded");
                return Ok(outcome);
            }

            // The read set always spans both records, even when only one is
            // written. A like that raced the partner's own like on the same
            // card must fail this commit and re-evaluate, otherwise both
            // sides could land as plain likes and the match would be lost.
            let mut batch = WriteBatch::new();
            batch = if user_next != user {
                batch.write(user_next)
            } else {
                batch.expect(&user)
            };
            batch = if partner_next != partner {
                batch.write(partner_next)
            } else {
                batch.expect(&partner)
            };

            match store.commit(batch).await {
                Ok(()) => {
                    if outcome.matched() {
                        info!(user_id = %user_id, partner_id = %partner_id, card = %card, "match created");
                    } else {
                        debug!(user_id = %user_id, card = %card, ?decision, "decision recorded");
                    }
                    return Ok(outcome);
                }
                Err(err @ StoreError::RevisionMismatch { .. }) => {
                    debug!(user_id = %user_id, card = %card, round, "commit conflict, re-reading");
                    last_conflict = Some(err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(conflict_exhausted("record_decision", last_conflict))
    }

    /// Acknowledge a match announcement.
    ///
    /// Clears the slot only while it still holds `card`; an announcement for
    /// a newer match stays up. Returns whether a write happened.
    pub async fn clear_recent_match(
        &self,
        store: &dyn DocumentStore,
        user_id: &UserId,
        card: &CardId,
    ) -> Result<bool, DomainError> {
        retry_transient(&self.retry, "clear_recent_match", move || async move {
            let mut last_conflict = None;
            for _ in 0..MAX_COMMIT_RETRIES {
                let Some(user) = store.get(user_id).await? else {
                    return Err(DomainError::UserNotFound {
                        id: user_id.clone(),
                    });
                };
                if user.recent_match.as_ref() != Some(card) {
                    debug!(user_id = %user_id, card = %card, "stale acknowledgement ignored");
                    return Ok(false);
                }

                let mut next = user;
                next.recent_match = None;
                match store.commit(WriteBatch::new().write(next)).await {
                    Ok(()) => return Ok(true),
                    Err(err @ StoreError::RevisionMismatch { .. }) => {
                        last_conflict = Some(err);
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(conflict_exhausted("clear_recent_match", last_conflict))
        })
        .await
    }
}
