mod common;

use std::sync::Arc;

use common::{card_id, demo_cards, onboarded_pair, test_engine};
use engine::{DealOutcome, Decision, DomainError, Engine, FixedCatalog, SessionConfig};
use engine_test_support::unique_helpers::unique_user_id;
use time::{Duration, OffsetDateTime};

fn engine_with(cards_per_session: usize, cooldown_hours: u32, deck: usize) -> Engine {
    Engine::in_memory(
        Arc::new(FixedCatalog::new(demo_cards(deck))),
        SessionConfig {
            cards_per_session,
            cooldown_hours,
        },
    )
}

fn dealt(outcome: DealOutcome) -> engine::DeckSession {
    match outcome {
        DealOutcome::Dealt(session) => session,
        DealOutcome::CoolingDown { until } => panic!("unexpected cooldown until {until}"),
    }
}

#[tokio::test]
async fn test_first_deal_fills_a_session() -> Result<(), DomainError> {
    let engine = test_engine(demo_cards(20));
    let id = unique_user_id("dealer");
    engine.ensure_user(&id, None).await?;

    let session = dealt(engine.deal_deck(&id, None, Some(7)).await?);
    assert_eq!(session.cards.len(), 10);
    assert_eq!(session.seed, 7);
    Ok(())
}

#[tokio::test]
async fn test_decided_cards_never_come_back() -> Result<(), DomainError> {
    let engine = test_engine(demo_cards(20));
    let (a, b) = onboarded_pair(&engine).await;

    engine
        .record_decision(&a, &b, &card_id(0), Decision::Like)
        .await?;
    engine
        .record_decision(&a, &b, &card_id(1), Decision::Dislike)
        .await?;
    engine
        .record_decision(&a, &b, &card_id(2), Decision::Like)
        .await?;

    let session = dealt(engine.deal_deck(&a, None, Some(11)).await?);
    let ids = session.card_ids();
    assert_eq!(ids.len(), 10);
    for i in 0..3 {
        assert!(!ids.contains(&card_id(i)), "card-{i} was already decided");
    }

    // The partner's deck is unaffected by this user's decisions.
    let partner_session = dealt(engine.deal_deck(&b, None, Some(11)).await?);
    assert_eq!(partner_session.cards.len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_same_seed_reproduces_the_session() -> Result<(), DomainError> {
    let engine = test_engine(demo_cards(20));
    let id = unique_user_id("replayer");
    engine.ensure_user(&id, None).await?;

    let first = dealt(engine.deal_deck(&id, None, Some(42)).await?);
    let second = dealt(engine.deal_deck(&id, None, Some(42)).await?);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_cooldown_blocks_and_reports_when() -> Result<(), DomainError> {
    let engine = test_engine(demo_cards(20));
    let id = unique_user_id("cooling");
    engine.ensure_user(&id, None).await?;

    let started = OffsetDateTime::now_utc() - Duration::hours(1);
    match engine.deal_deck(&id, Some(started), None).await? {
        DealOutcome::CoolingDown { until } => {
            assert_eq!(until, started + Duration::hours(24));
            assert!(until > OffsetDateTime::now_utc());
        }
        DealOutcome::Dealt(_) => panic!("cooldown should still be running"),
    }
    Ok(())
}

#[tokio::test]
async fn test_elapsed_cooldown_deals_again() -> Result<(), DomainError> {
    let engine = test_engine(demo_cards(20));
    let id = unique_user_id("rested");
    engine.ensure_user(&id, None).await?;

    let started = OffsetDateTime::now_utc() - Duration::hours(25);
    let session = dealt(engine.deal_deck(&id, Some(started), Some(3)).await?);
    assert_eq!(session.cards.len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_zero_cooldown_never_blocks() -> Result<(), DomainError> {
    let engine = engine_with(10, 0, 20);
    let id = unique_user_id("impatient");
    engine.ensure_user(&id, None).await?;

    let just_now = OffsetDateTime::now_utc();
    let session = dealt(engine.deal_deck(&id, Some(just_now), Some(1)).await?);
    assert_eq!(session.cards.len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_exhausted_catalog_deals_what_is_left() -> Result<(), DomainError> {
    let engine = engine_with(10, 24, 4);
    let (a, b) = onboarded_pair(&engine).await;

    for i in 0..3 {
        engine
            .record_decision(&a, &b, &card_id(i), Decision::Like)
            .await?;
    }
    let session = dealt(engine.deal_deck(&a, None, Some(9)).await?);
    assert_eq!(session.card_ids(), vec![card_id(3)]);

    engine
        .record_decision(&a, &b, &card_id(3), Decision::Dislike)
        .await?;
    let empty = dealt(engine.deal_deck(&a, None, Some(9)).await?);
    assert!(empty.cards.is_empty(), "nothing left to deal");
    Ok(())
}

#[tokio::test]
async fn test_deal_for_unknown_user_fails() {
    let engine = test_engine(demo_cards(20));
    let ghost = unique_user_id("ghost");

    let err = engine
        .deal_deck(&ghost, None, Some(1))
        .await
        .expect_err("no such user");
    assert!(matches!(err, DomainError::UserNotFound { .. }));
}
