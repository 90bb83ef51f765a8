//! Engine facade wiring the services together.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::warn;

use crate::catalog::CardCatalog;
use crate::config::SessionConfig;
use crate::domain::card::{Card, CardId};
use crate::domain::deck::DealOutcome;
use crate::domain::decision::{Decision, DecisionOutcome};
use crate::domain::user::{User, UserId};
use crate::errors::domain::DomainError;
use crate::services::{
    profiles, CodeRegistry, CompletionService, DecisionService, DeckService, PairingService,
};
use crate::store::{DocumentStore, MemoryStore};
use crate::sync::{Subscription, SyncHub};

/// One assembled matching engine.
///
/// Owns the collaborator seams (store, catalog) plus the stateless services,
/// and exposes the whole surface as plain methods. All durable state lives in
/// the store; an `Engine` can be shared freely behind an `Arc`.
pub struct Engine {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<dyn CardCatalog>,
    config: SessionConfig,
    registry: CodeRegistry,
    pairing: PairingService,
    decisions: DecisionService,
    completion: CompletionService,
    deck: DeckService,
    sync: SyncHub,
}

impl Engine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<dyn CardCatalog>,
        config: SessionConfig,
    ) -> Self {
        let sync = SyncHub::new(Arc::clone(&store));
        Self {
            store,
            catalog,
            config,
            registry: CodeRegistry::new(),
            pairing: PairingService::new(),
            decisions: DecisionService::new(),
            completion: CompletionService::new(),
            deck: DeckService::new(),
            sync,
        }
    }

    /// Engine over a fresh in-memory store.
    pub fn in_memory(catalog: Arc<dyn CardCatalog>, config: SessionConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), catalog, config)
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sync_hub(&self) -> &SyncHub {
        &self.sync
    }

    /// Idempotent user bootstrap; issues a short code on first sight.
    pub async fn ensure_user(
        &self,
        id: &UserId,
        display_name: Option<&str>,
    ) -> Result<User, DomainError> {
        profiles::ensure_user(self.store.as_ref(), &self.registry, id, display_name).await
    }

    pub async fn set_display_name(
        &self,
        id: &UserId,
        name: Option<&str>,
    ) -> Result<User, DomainError> {
        profiles::set_display_name(self.store.as_ref(), id, name).await
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, DomainError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound { id: id.clone() })
    }

    /// Resolve a typed-in short code to its owner.
    pub async fn resolve_code(&self, input: &str) -> Result<UserId, DomainError> {
        self.registry.resolve_code(self.store.as_ref(), input).await
    }

    /// Link the caller with the owner of `code`. Returns the partner's id.
    pub async fn link_with_code(
        &self,
        user_id: &UserId,
        code: &str,
    ) -> Result<UserId, DomainError> {
        self.pairing
            .link_with_code(self.store.as_ref(), &self.registry, user_id, code)
            .await
    }

    pub async fn link_partners(&self, a: &UserId, b: &UserId) -> Result<(), DomainError> {
        self.pairing.link_partners(self.store.as_ref(), a, b).await
    }

    pub async fn partners_of(&self, user_id: &UserId) -> Result<Vec<User>, DomainError> {
        self.pairing.partners_of(self.store.as_ref(), user_id).await
    }

    /// Record a like or dislike for `(user, card)` against `partner`.
    pub async fn record_decision(
        &self,
        user_id: &UserId,
        partner_id: &UserId,
        card: &CardId,
        decision: Decision,
    ) -> Result<DecisionOutcome, DomainError> {
        self.decisions
            .record_decision(self.store.as_ref(), user_id, partner_id, card, decision)
            .await
    }

    /// Acknowledge a match announcement for `card`.
    pub async fn clear_recent_match(
        &self,
        user_id: &UserId,
        card: &CardId,
    ) -> Result<bool, DomainError> {
        self.decisions
            .clear_recent_match(self.store.as_ref(), user_id, card)
            .await
    }

    /// Full card data for the user's matches, in catalog order.
    pub async fn matched_cards(&self, user_id: &UserId) -> Result<Vec<Card>, DomainError> {
        let user = self.get_user(user_id).await?;
        let cards = self.catalog.list_cards().await?;
        let found: Vec<Card> = cards
            .into_iter()
            .filter(|card| user.matches.contains(&card.id))
            .collect();
        if found.len() != user.matches.len() {
            warn!(user_id = %user_id, "some matched cards are missing from the catalog");
        }
        Ok(found)
    }

    pub async fn set_done(
        &self,
        user_id: &UserId,
        card: &CardId,
        done: bool,
    ) -> Result<bool, DomainError> {
        self.completion
            .set_done(self.store.as_ref(), user_id, card, done)
            .await
    }

    pub async fn is_done(&self, user_id: &UserId, card: &CardId) -> Result<bool, DomainError> {
        self.completion
            .is_done(self.store.as_ref(), user_id, card)
            .await
    }

    /// Deal the next swiping session.
    pub async fn deal_deck(
        &self,
        user_id: &UserId,
        last_session_started: Option<OffsetDateTime>,
        seed: Option<u64>,
    ) -> Result<DealOutcome, DomainError> {
        self.deck
            .deal(
                self.store.as_ref(),
                self.catalog.as_ref(),
                &self.config,
                user_id,
                last_session_started,
                seed,
            )
            .await
    }

    /// Live subscription to a user record.
    pub fn subscribe_user(
        &self,
        user_id: &UserId,
        on_change: impl FnMut(User) + Send + 'static,
    ) -> Subscription {
        self.sync.subscribe_user(user_id, on_change)
    }

    /// Live subscription to one completion flag.
    pub fn subscribe_done(
        &self,
        user_id: &UserId,
        card: &CardId,
        on_change: impl FnMut(bool) + Send + 'static,
    ) -> Subscription {
        self.sync.subscribe_done(user_id, card, on_change)
    }
}
