//! Decision types shared between the recorder service and pure match logic.

use serde::{Deserialize, Serialize};

/// A user's verdict on a card. Terminal once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Like,
    Dislike,
}

/// Result of recording a decision.
///
/// A repeated decision is a normal outcome, not an error: clients retry after
/// timeouts and must be able to tell "stored now" from "was already stored".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The decision was written. `matched` is true when this like completed a
    /// mutual pair and a match was created alongside it.
    Recorded { matched: bool },
    /// The card already carried a decision for this user; nothing was written.
    AlreadyDecided { decision: Decision },
}

impl DecisionOutcome {
    pub fn matched(&self) -> bool {
        matches!(self, Self::Recorded { matched: true })
    }
}
