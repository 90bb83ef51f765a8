//! Deck session dealing.

use rand::Rng;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::catalog::CardCatalog;
use crate::config::SessionConfig;
use crate::domain::deck::{assemble_session, cooldown_until, DealOutcome};
use crate::domain::user::UserId;
use crate::errors::domain::DomainError;
use crate::store::DocumentStore;

/// Assembles swiping sessions.
#[derive(Debug, Clone, Default)]
pub struct DeckService;

impl DeckService {
    pub fn new() -> Self {
        Self
    }

    /// Deal the next session for `user_id`.
    ///
    /// `last_session_started` comes from the caller because session timing
    /// belongs to the client surface, not the user record; pass `None` when
    /// there is no previous session to gate on. `seed` pins the shuffle for
    /// replayable decks, otherwise a random seed is drawn.
    pub async fn deal(
        &self,
        store: &dyn DocumentStore,
        catalog: &dyn CardCatalog,
        config: &SessionConfig,
        user_id: &UserId,
        last_session_started: Option<OffsetDateTime>,
        seed: Option<u64>,
    ) -> Result<DealOutcome, DomainError> {
        let now = OffsetDateTime::now_utc();
        if let Some(until) = cooldown_until(last_session_started, config.cooldown_hours, now) {
            debug!(user_id = %user_id, %until, "session blocked by cooldown");
            return Ok(DealOutcome::CoolingDown { until });
        }

        let Some(user) = store.get(user_id).await? else {
            return Err(DomainError::UserNotFound {
                id: user_id.clone(),
            });
        };
        let cards = catalog.list_cards().await?;
        let seed = seed.unwrap_or_else(|| rand::rng().random());

        let session = assemble_session(&cards, &user, config.cards_per_session, seed);
        info!(user_id = %user_id, dealt = session.cards.len(), seed, "deck session dealt");
        Ok(DealOutcome::Dealt(session))
    }
}
