//! User record: the single persisted document type.
//!
//! Everything the engine knows about a user lives in one record so that the
//! store can apply multi-record commits atomically. Decision sets are kept as
//! `BTreeSet` for deterministic iteration and cheap membership checks.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::card::CardId;
use crate::domain::decision::Decision;

/// Opaque user identifier.
///
/// Identity is established outside the engine; whatever string the embedding
/// application uses (an auth subject, a device id) is carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Shareable pairing code, unique across all users.
///
/// Codes are normalized at the boundary (see `utils::short_code`), so two
/// `ShortCode` values compare equal exactly when they identify the same user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Wrap an already-normalized code. Input from users goes through
    /// `utils::short_code::normalize` instead.
    pub fn from_normalized(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Redacted form for logs: first two characters plus padding.
    pub fn redacted(&self) -> String {
        if self.0.len() <= 2 {
            "*".repeat(self.0.len())
        } else {
            format!("{}****", &self.0[..2])
        }
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// The persisted per-user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub short_code: ShortCode,
    pub display_name: Option<String>,
    /// Users this user is paired with. A link is valid only when both sides
    /// list each other.
    pub partners: BTreeSet<UserId>,
    /// Cards this user liked. Disjoint from `dislikes`; append-only.
    pub likes: BTreeSet<CardId>,
    /// Cards this user passed on. Disjoint from `likes`; append-only.
    pub dislikes: BTreeSet<CardId>,
    /// Cards where a mutual like with a partner was confirmed.
    pub matches: BTreeSet<CardId>,
    /// Matched cards this user marked as completed.
    pub done: BTreeSet<CardId>,
    /// Most recent match not yet acknowledged by the client. Single slot;
    /// a newer match overwrites an unacknowledged older one.
    pub recent_match: Option<CardId>,
    pub last_match_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Store-managed commit counter used for optimistic concurrency.
    pub revision: u64,
}

impl User {
    /// Fresh record for a first-time user. The store assigns the real
    /// revision on create.
    pub fn new(
        id: UserId,
        short_code: ShortCode,
        display_name: Option<String>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            short_code,
            display_name,
            partners: BTreeSet::new(),
            likes: BTreeSet::new(),
            dislikes: BTreeSet::new(),
            matches: BTreeSet::new(),
            done: BTreeSet::new(),
            recent_match: None,
            last_match_at: None,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// The decision previously recorded for `card`, if any.
    pub fn decision_for(&self, card: &CardId) -> Option<Decision> {
        if self.likes.contains(card) {
            Some(Decision::Like)
        } else if self.dislikes.contains(card) {
            Some(Decision::Dislike)
        } else {
            None
        }
    }

    pub fn has_decided(&self, card: &CardId) -> bool {
        self.decision_for(card).is_some()
    }

    pub fn is_partnered_with(&self, other: &UserId) -> bool {
        self.partners.contains(other)
    }

    pub fn is_done(&self, card: &CardId) -> bool {
        self.done.contains(card)
    }

    /// Record-level consistency: decision sets never overlap, matches and
    /// completion flags only reference cards this user actually liked.
    pub fn is_consistent(&self) -> bool {
        self.likes.is_disjoint(&self.dislikes)
            && self.matches.is_subset(&self.likes)
            && self.done.is_subset(&self.matches)
    }
}
