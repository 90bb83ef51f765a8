#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;

use engine::{Card, CardId, Engine, FixedCatalog, SessionConfig, UserId};
use engine_test_support::unique_helpers::unique_user_id;

// Logging is auto-installed for most test binaries
#[ctor::ctor]
fn init_logging() {
    engine_test_support::logging::init();
}

/// Deck of `n` demo cards with ids `card-0` .. `card-{n-1}`.
pub fn demo_cards(n: usize) -> Vec<Card> {
    (0..n)
        .map(|i| {
            Card::new(
                format!("card-{i}"),
                format!("Card {i}"),
                format!("Demo activity number {i}"),
                format!("https://cards.example/demo/{i}.jpg"),
                "demo",
            )
        })
        .collect()
}

pub fn card_id(i: usize) -> CardId {
    CardId::from(format!("card-{i}"))
}

/// Engine over a fresh in-memory store and a fixed demo catalog.
pub fn test_engine(cards: Vec<Card>) -> Engine {
    Engine::in_memory(Arc::new(FixedCatalog::new(cards)), SessionConfig::default())
}

/// Two onboarded users linked as partners.
pub async fn onboarded_pair(engine: &Engine) -> (UserId, UserId) {
    let a = unique_user_id("alice");
    let b = unique_user_id("bob");
    engine
        .ensure_user(&a, Some("Alice"))
        .await
        .expect("create first user");
    engine
        .ensure_user(&b, Some("Bob"))
        .await
        .expect("create second user");
    engine.link_partners(&a, &b).await.expect("link partners");
    (a, b)
}
