//! Domain layer: pure matching logic and record types.

pub mod card;
pub mod deck;
pub mod decision;
pub mod matching;
pub mod user;

// Re-exports for ergonomics
pub use card::{Card, CardId};
pub use deck::{DealOutcome, DeckSession};
pub use decision::{Decision, DecisionOutcome};
pub use matching::{apply_decision, evaluate_like, MatchCheck};
pub use user::{ShortCode, User, UserId};
