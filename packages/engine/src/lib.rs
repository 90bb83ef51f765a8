#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod services;
pub mod store;
pub mod sync;
pub mod utils;

// Re-exports for public API
pub use catalog::{CardCatalog, FixedCatalog};
pub use config::SessionConfig;
pub use domain::{
    Card, CardId, DealOutcome, DeckSession, Decision, DecisionOutcome, ShortCode, User, UserId,
};
pub use engine::Engine;
pub use errors::{DomainError, StoreError};
pub use store::{DocumentStore, MemoryStore, RetryPolicy, Revision, WriteBatch};
pub use sync::{Subscription, SyncHub};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    engine_test_support::logging::init();
}
