//! Deck session assembly.
//!
//! A session is a deterministic shuffle of the cards the user has not decided
//! on yet, capped at the configured session size. Decisions are the only
//! persisted state; the deck itself is recomputed from scratch every time, so
//! an interrupted session loses nothing.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use time::{Duration, OffsetDateTime};

use crate::domain::card::{Card, CardId};
use crate::domain::user::{User, UserId};

/// Result of asking for a new deck session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealOutcome {
    Dealt(DeckSession),
    /// The cooldown since the previous session start has not elapsed.
    CoolingDown { until: OffsetDateTime },
}

/// An ordered run of cards for one swiping session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSession {
    pub cards: Vec<Card>,
    /// Seed that produced the ordering. The same seed over the same
    /// decided-set yields the same session.
    pub seed: u64,
}

impl DeckSession {
    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }
}

/// When the next session may start, if the cooldown is still running.
pub fn cooldown_until(
    last_session_started: Option<OffsetDateTime>,
    cooldown_hours: u32,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    let started = last_session_started?;
    let until = started + Duration::hours(i64::from(cooldown_hours));
    (now < until).then_some(until)
}

/// Build a session from the catalog and the user's decision history.
///
/// Cards already liked or disliked are excluded; the rest are shuffled with a
/// seeded RNG and capped at `cards_per_session`.
pub fn assemble_session(
    catalog: &[Card],
    user: &User,
    cards_per_session: usize,
    seed: u64,
) -> DeckSession {
    let mut eligible: Vec<Card> = catalog
        .iter()
        .filter(|card| !user.has_decided(&card.id))
        .cloned()
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    eligible.shuffle(&mut rng);
    eligible.truncate(cards_per_session);

    DeckSession {
        cards: eligible,
        seed,
    }
}

/// Derive a session seed that is stable per (user, salt) combination.
///
/// FNV-style fold over the user id, mixed with the salt so consecutive
/// sessions for the same user get different orderings.
pub fn derive_session_seed(user: &UserId, salt: u64) -> u64 {
    let mut seed = 0xcbf2_9ce4_8422_2325u64;
    for byte in user.as_str().bytes() {
        seed ^= u64::from(byte);
        seed = seed.wrapping_mul(0x0100_0000_01b3);
    }
    seed.wrapping_add(salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
