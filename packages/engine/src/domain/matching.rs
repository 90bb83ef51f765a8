//! Pure match evaluation and decision application.
//!
//! Everything here is a function of record snapshots. The recorder service
//! wraps these in an optimistic-concurrency loop; keeping the logic pure means
//! a retry is just "load fresh snapshots, run the same function again".

use time::OffsetDateTime;

use crate::domain::card::CardId;
use crate::domain::decision::{Decision, DecisionOutcome};
use crate::domain::user::User;

/// What a like on `card` means given the current pair state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCheck {
    /// Partner has not liked the card; record the like and wait.
    NoMatch,
    /// Partner already liked the card; this like completes a match.
    NewMatch,
    /// The card is already in the liker's match set; nothing new to create.
    AlreadyMatched,
}

/// Evaluate a prospective like against fresh snapshots of both records.
///
/// Only the liker's own match set gates `AlreadyMatched`. The partner may
/// carry the card as a match from another pairing; that must not stop this
/// pair from matching on it.
pub fn evaluate_like(user: &User, partner: &User, card: &CardId) -> MatchCheck {
    if user.matches.contains(card) {
        MatchCheck::AlreadyMatched
    } else if partner.likes.contains(card) {
        MatchCheck::NewMatch
    } else {
        MatchCheck::NoMatch
    }
}

/// Apply a decision to in-memory snapshots of both paired records.
///
/// Mutates `user` (and `partner` when a match is created) and reports what
/// happened. Callers diff the snapshots against what they loaded to decide
/// which records need to be written back.
pub fn apply_decision(
    user: &mut User,
    partner: &mut User,
    card: &CardId,
    decision: Decision,
    now: OffsetDateTime,
) -> DecisionOutcome {
    if let Some(existing) = user.decision_for(card) {
        return DecisionOutcome::AlreadyDecided { decision: existing };
    }

    match decision {
        Decision::Dislike => {
            user.dislikes.insert(card.clone());
            DecisionOutcome::Recorded { matched: false }
        }
        Decision::Like => match evaluate_like(user, partner, card) {
            MatchCheck::NoMatch => {
                user.likes.insert(card.clone());
                DecisionOutcome::Recorded { matched: false }
            }
            MatchCheck::NewMatch => {
                user.likes.insert(card.clone());
                mark_matched(user, card, now);
                mark_matched(partner, card, now);
                DecisionOutcome::Recorded { matched: true }
            }
            MatchCheck::AlreadyMatched => {
                // The match side effects already ran; only the like itself is
                // missing. Do not re-announce the match.
                user.likes.insert(card.clone());
                DecisionOutcome::Recorded { matched: true }
            }
        },
    }
}

fn mark_matched(record: &mut User, card: &CardId, now: OffsetDateTime) {
    record.matches.insert(card.clone());
    record.recent_match = Some(card.clone());
    record.last_match_at = Some(now);
}
