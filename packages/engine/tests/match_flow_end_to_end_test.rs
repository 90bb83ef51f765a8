mod common;

use std::time::Duration as StdDuration;

use common::{demo_cards, test_engine};
use engine::{DealOutcome, Decision, DomainError, User};
use engine_test_support::unique_helpers::unique_user_id;
use time::{Duration, OffsetDateTime};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Test: the whole journey of one couple, end to end.
///
/// This test verifies that:
/// 1. Two users onboard independently and receive shareable codes.
/// 2. The second user links the pair by typing the first user's code.
/// 3. Both swipe through their own decks; decisions stay private.
/// 4. The second like on a shared card creates a match, announced live to the
///    partner who was not swiping.
/// 5. Acknowledgement and completion are tracked per user.
/// 6. The next deal excludes everything already decided and honors the
///    cooldown.
#[tokio::test]
async fn test_couple_journey_end_to_end() -> Result<(), DomainError> {
    let engine = test_engine(demo_cards(12));

    // Onboarding.
    let ana = unique_user_id("ana");
    let ben = unique_user_id("ben");
    let ana_record = engine.ensure_user(&ana, Some("Ana")).await?;
    engine.ensure_user(&ben, Some("Ben")).await?;
    assert_eq!(ana_record.short_code.as_str().len(), 6);

    // Ben types Ana's code, badly.
    let typed = format!(" {} ", ana_record.short_code.as_str().to_lowercase());
    let partner = engine.link_with_code(&ben, &typed).await?;
    assert_eq!(partner, ana);
    assert_eq!(engine.partners_of(&ben).await?[0].id, ana);

    // Ben listens for changes on his own record.
    let (tx, mut ben_feed) = mpsc::unbounded_channel::<User>();
    let sub = engine.subscribe_user(&ben, move |record| {
        let _ = tx.send(record);
    });
    let initial = timeout(StdDuration::from_secs(2), ben_feed.recv())
        .await
        .expect("initial state delivered")
        .expect("channel open");
    assert_eq!(initial.display_name.as_deref(), Some("Ben"));

    // Ana swipes her session: likes three cards, passes on two.
    let session = match engine.deal_deck(&ana, None, Some(21)).await? {
        DealOutcome::Dealt(session) => session,
        DealOutcome::CoolingDown { until } => panic!("fresh user cooling down until {until}"),
    };
    assert_eq!(session.cards.len(), 10);
    let dealt = session.card_ids();
    for card in &dealt[0..3] {
        engine.record_decision(&ana, &ben, card, Decision::Like).await?;
    }
    for card in &dealt[3..5] {
        engine
            .record_decision(&ana, &ben, card, Decision::Dislike)
            .await?;
    }

    // Ben's own deck is untouched by Ana's swiping.
    let ben_session = match engine.deal_deck(&ben, None, Some(22)).await? {
        DealOutcome::Dealt(session) => session,
        DealOutcome::CoolingDown { until } => panic!("fresh user cooling down until {until}"),
    };
    assert_eq!(ben_session.cards.len(), 10);

    // Ben likes one of the cards Ana liked. That closes a match.
    let shared = dealt[0].clone();
    let outcome = engine
        .record_decision(&ben, &ana, &shared, Decision::Like)
        .await?;
    assert!(outcome.matched());

    // The match reaches Ben's live feed.
    let announced = loop {
        let record = timeout(StdDuration::from_secs(2), ben_feed.recv())
            .await
            .expect("match announcement delivered")
            .expect("channel open");
        if record.recent_match.is_some() {
            break record;
        }
    };
    assert_eq!(announced.recent_match, Some(shared.clone()));
    assert!(announced.matches.contains(&shared));

    // Both see the matched card with its catalog data.
    for user in [&ana, &ben] {
        let matched = engine.matched_cards(user).await?;
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, shared);
    }

    // Ben acknowledges; Ana's announcement stays hers.
    assert!(engine.clear_recent_match(&ben, &shared).await?);
    assert_eq!(engine.get_user(&ana).await?.recent_match, Some(shared.clone()));

    // They finish the activity at their own pace.
    assert!(engine.set_done(&ben, &shared, true).await?);
    assert!(!engine.is_done(&ana, &shared).await?);
    assert!(engine.set_done(&ana, &shared, true).await?);

    // Ana wants more cards the same evening: cooldown says no.
    let earlier = OffsetDateTime::now_utc() - Duration::hours(2);
    match engine.deal_deck(&ana, Some(earlier), None).await? {
        DealOutcome::CoolingDown { until } => {
            assert_eq!(until, earlier + Duration::hours(24));
        }
        DealOutcome::Dealt(_) => panic!("cooldown must hold for another 22 hours"),
    }

    // A day later the next session deals only undecided cards.
    let yesterday = OffsetDateTime::now_utc() - Duration::hours(25);
    let next = match engine.deal_deck(&ana, Some(yesterday), Some(23)).await? {
        DealOutcome::Dealt(session) => session,
        DealOutcome::CoolingDown { until } => panic!("cooldown ended, yet blocked until {until}"),
    };
    assert_eq!(next.cards.len(), 7, "twelve cards minus five decisions");
    for card in next.card_ids() {
        assert!(!dealt[0..5].contains(&card), "decided cards never resurface");
    }

    sub.cancel();
    Ok(())
}
