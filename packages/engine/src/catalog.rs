//! Card catalog seam.
//!
//! The catalog is owned by the embedding application. The engine only needs
//! to enumerate cards; user records reference them by id.

use async_trait::async_trait;

use crate::domain::card::Card;
use crate::errors::domain::DomainError;

/// Source of the shared card deck.
#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Full card list. Order carries no meaning; sessions shuffle.
    async fn list_cards(&self) -> Result<Vec<Card>, DomainError>;
}

/// Catalog backed by a fixed in-memory list.
pub struct FixedCatalog {
    cards: Vec<Card>,
}

impl FixedCatalog {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

#[async_trait]
impl CardCatalog for FixedCatalog {
    async fn list_cards(&self) -> Result<Vec<Card>, DomainError> {
        Ok(self.cards.clone())
    }
}
