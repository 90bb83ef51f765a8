//! Partner linking and symmetry repair.

use tracing::{info, warn};

use crate::domain::user::{User, UserId};
use crate::errors::domain::DomainError;
use crate::errors::store::StoreError;
use crate::services::registry::CodeRegistry;
use crate::services::{conflict_exhausted, MAX_COMMIT_RETRIES};
use crate::store::{DocumentStore, WriteBatch};

/// Creates and repairs partner links.
///
/// A link is two records each listing the other, written in one atomic
/// commit. Half-written links can still appear if an external writer touches
/// records directly; `ensure_symmetric` is the single place that decides what
/// a one-sided link means, and it completes the missing side.
#[derive(Debug, Clone, Default)]
pub struct PairingService;

impl PairingService {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a typed-in code and link the caller with its owner.
    /// Returns the partner's id.
    pub async fn link_with_code(
        &self,
        store: &dyn DocumentStore,
        registry: &CodeRegistry,
        user_id: &UserId,
        code_input: &str,
    ) -> Result<UserId, DomainError> {
        let partner_id = registry.resolve_code(store, code_input).await?;
        self.link_partners(store, user_id, &partner_id).await?;
        Ok(partner_id)
    }

    /// Link two users symmetrically in one atomic commit.
    pub async fn link_partners(
        &self,
        store: &dyn DocumentStore,
        a_id: &UserId,
        b_id: &UserId,
    ) -> Result<(), DomainError> {
        if a_id == b_id {
            return Err(DomainError::SelfLinkRejected { id: a_id.clone() });
        }

        let mut last_conflict = None;
        for _ in 0..MAX_COMMIT_RETRIES {
            let (a, b) = load_pair(store, a_id, b_id).await?;

            let a_linked = a.is_partnered_with(b_id);
            let b_linked = b.is_partnered_with(a_id);
            if a_linked && b_linked {
                return Err(DomainError::AlreadyLinked {
                    a: a_id.clone(),
                    b: b_id.clone(),
                });
            }
            if a_linked != b_linked {
                warn!(user_a = %a_id, user_b = %b_id, "completing one-sided partner link");
            }

            let mut batch = WriteBatch::new();
            if a_linked {
                batch = batch.expect(&a);
            } else {
                let mut next = a.clone();
                next.partners.insert(b_id.clone());
                batch = batch.write(next);
            }
            if b_linked {
                batch = batch.expect(&b);
            } else {
                let mut next = b.clone();
                next.partners.insert(a_id.clone());
                batch = batch.write(next);
            }

            match store.commit(batch).await {
                Ok(()) => {
                    info!(user_a = %a_id, user_b = %b_id, "partners linked");
                    return Ok(());
                }
                Err(err @ StoreError::RevisionMismatch { .. }) => {
                    last_conflict = Some(err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(conflict_exhausted("link_partners", last_conflict))
    }

    /// Load both sides of a link and repair asymmetry before use.
    ///
    /// Returns fresh snapshots with the link guaranteed symmetric, ready to
    /// serve as a commit read set. `NotLinked` when neither side lists the
    /// other; `PartialLink` when a one-sided link was found but repair kept
    /// losing commits.
    pub async fn ensure_symmetric(
        &self,
        store: &dyn DocumentStore,
        user_id: &UserId,
        partner_id: &UserId,
    ) -> Result<(User, User), DomainError> {
        // Partner sets only grow, so after one successful repair commit the
        // next load is guaranteed to take the symmetric arm. Only conflicts
        // consume the retry budget.
        let mut conflicts = 0;
        let mut last_conflict = None;
        loop {
            let (user, partner) = load_pair(store, user_id, partner_id).await?;

            let user_side = user.is_partnered_with(partner_id);
            let partner_side = partner.is_partnered_with(user_id);
            match (user_side, partner_side) {
                (true, true) => return Ok((user, partner)),
                (false, false) => {
                    return Err(DomainError::NotLinked {
                        user: user_id.clone(),
                        partner: partner_id.clone(),
                    })
                }
                _ => {}
            }

            warn!(user_id = %user_id, partner_id = %partner_id, "repairing one-sided partner link");
            let batch = if user_side {
                let mut next = partner.clone();
                next.partners.insert(user_id.clone());
                WriteBatch::new().expect(&user).write(next)
            } else {
                let mut next = user.clone();
                next.partners.insert(partner_id.clone());
                WriteBatch::new().write(next).expect(&partner)
            };

            match store.commit(batch).await {
                Ok(()) => continue,
                Err(err @ StoreError::RevisionMismatch { .. }) => {
                    conflicts += 1;
                    last_conflict = Some(err);
                    if conflicts >= MAX_COMMIT_RETRIES {
                        break;
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(user_id = %user_id, partner_id = %partner_id, error = ?last_conflict, "link repair kept losing commits");
        Err(DomainError::PartialLink {
            user: user_id.clone(),
            partner: partner_id.clone(),
        })
    }

    /// All partners of a user, repairing one-sided links along the way.
    pub async fn partners_of(
        &self,
        store: &dyn DocumentStore,
        user_id: &UserId,
    ) -> Result<Vec<User>, DomainError> {
        let Some(user) = store.get(user_id).await? else {
            return Err(DomainError::UserNotFound {
                id: user_id.clone(),
            });
        };

        let mut partners = Vec::with_capacity(user.partners.len());
        for partner_id in &user.partners {
            match self.ensure_symmetric(store, user_id, partner_id).await {
                Ok((_, partner)) => partners.push(partner),
                // A dangling reference must not take down the listing.
                Err(DomainError::UserNotFound { .. }) => {
                    warn!(user_id = %user_id, partner_id = %partner_id, "partner record missing, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(partners)
    }
}

async fn load_pair(
    store: &dyn DocumentStore,
    a_id: &UserId,
    b_id: &UserId,
) -> Result<(User, User), DomainError> {
    let mut loaded = store.get_many(&[a_id.clone(), b_id.clone()]).await?;
    let b = loaded.pop().flatten();
    let a = loaded.pop().flatten();
    match (a, b) {
        (Some(a), Some(b)) => Ok((a, b)),
        (None, _) => Err(DomainError::UserNotFound { id: a_id.clone() }),
        (_, None) => Err(DomainError::UserNotFound { id: b_id.clone() }),
    }
}
