//! User bootstrap and profile updates.

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::domain::user::{User, UserId};
use crate::errors::domain::DomainError;
use crate::errors::store::StoreError;
use crate::services::registry::CodeRegistry;
use crate::services::{conflict_exhausted, MAX_COMMIT_RETRIES};
use crate::store::{DocumentStore, WriteBatch};

/// Ensure a record exists for `id`, creating one with a fresh short code on
/// first sight. Idempotent: repeat calls return the stored record untouched,
/// keeping the short code stable.
pub async fn ensure_user(
    store: &dyn DocumentStore,
    registry: &CodeRegistry,
    id: &UserId,
    display_name: Option<&str>,
) -> Result<User, DomainError> {
    if let Some(existing) = store.get(id).await? {
        debug!(user_id = %id, "repeat bootstrap for existing user");
        return Ok(existing);
    }

    let mut attempts = 0;
    loop {
        attempts += 1;
        let code = registry.issue_code(store).await?;
        let candidate = User::new(
            id.clone(),
            code,
            clean_display_name(display_name),
            OffsetDateTime::now_utc(),
        );

        match store.create(candidate).await {
            Ok(user) => {
                info!(user_id = %id, code = %user.short_code.redacted(), "first user creation");
                return Ok(user);
            }
            Err(StoreError::AlreadyExists { .. }) => {
                // Lost a bootstrap race; the stored record wins.
                debug!(user_id = %id, "concurrent bootstrap, returning stored record");
                match store.get(id).await? {
                    Some(existing) => return Ok(existing),
                    None => continue,
                }
            }
            // The pre-checked code raced with another create. Count it as a
            // collision and draw again.
            Err(StoreError::CodeTaken { .. }) if attempts < registry.max_attempts() => continue,
            Err(StoreError::CodeTaken { .. }) => {
                return Err(DomainError::RegistryExhausted { attempts })
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Update the display name. Trims input; blank names clear the field.
pub async fn set_display_name(
    store: &dyn DocumentStore,
    id: &UserId,
    name: Option<&str>,
) -> Result<User, DomainError> {
    let cleaned = clean_display_name(name);
    let mut last_conflict = None;

    for _ in 0..MAX_COMMIT_RETRIES {
        let Some(user) = store.get(id).await? else {
            return Err(DomainError::UserNotFound { id: id.clone() });
        };
        if user.display_name == cleaned {
            return Ok(user);
        }

        let mut next = user;
        next.display_name = cleaned.clone();
        match store.commit(WriteBatch::new().write(next)).await {
            Ok(()) => {
                return store
                    .get(id)
                    .await?
                    .ok_or_else(|| DomainError::UserNotFound { id: id.clone() })
            }
            Err(err @ StoreError::RevisionMismatch { .. }) => {
                last_conflict = Some(err);
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(conflict_exhausted("set_display_name", last_conflict))
}

fn clean_display_name(name: Option<&str>) -> Option<String> {
    let trimmed = name?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
