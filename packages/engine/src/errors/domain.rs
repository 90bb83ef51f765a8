//! Domain-level error type used across services.
//!
//! This error type is transport-agnostic. Callers embedding the engine behind
//! an API layer should map these variants onto their own response codes; the
//! engine itself never formats errors for the wire.

use thiserror::Error;

use crate::domain::card::CardId;
use crate::domain::user::{ShortCode, UserId};
use crate::errors::store::StoreError;

/// Central domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DomainError {
    /// No user currently holds the given short code.
    #[error("no user holds short code {code}")]
    CodeNotFound { code: ShortCode },

    /// Short code generation kept colliding until the attempt budget ran out.
    #[error("could not issue a unique short code after {attempts} attempts")]
    RegistryExhausted { attempts: u32 },

    /// A user tried to partner with their own code.
    #[error("user {id} cannot partner with themselves")]
    SelfLinkRejected { id: UserId },

    /// Both sides already list each other as partners.
    #[error("users {a} and {b} are already partners")]
    AlreadyLinked { a: UserId, b: UserId },

    /// The two users are not partners, so pair operations are refused.
    #[error("user {user} is not partnered with {partner}")]
    NotLinked { user: UserId, partner: UserId },

    /// A one-sided partner link was found and could not be repaired.
    #[error("partner link between {user} and {partner} is one-sided and repair failed")]
    PartialLink { user: UserId, partner: UserId },

    /// The referenced user record does not exist.
    #[error("user {id} not found")]
    UserNotFound { id: UserId },

    /// Completion flags only apply to matched cards.
    #[error("card {card} is not a match for user {user}")]
    NotMatched { user: UserId, card: CardId },

    /// Failure at the storage layer, after retries were exhausted or for
    /// errors that are not retryable.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn code_not_found(code: ShortCode) -> Self {
        Self::CodeNotFound { code }
    }

    pub fn user_not_found(id: impl Into<UserId>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn not_linked(user: impl Into<UserId>, partner: impl Into<UserId>) -> Self {
        Self::NotLinked {
            user: user.into(),
            partner: partner.into(),
        }
    }

    /// Whether the underlying cause is a transient storage failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_transient())
    }
}
