//! Live update fan-out.
//!
//! Each subscription bridges a store watch channel to a caller-supplied
//! callback on its own task. Watch channels hold only the latest committed
//! state, so a subscriber that falls behind skips intermediate versions and
//! lands on the newest one; it never sees versions out of order.

use std::sync::Arc;

use dashmap::DashMap;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::domain::card::CardId;
use crate::domain::user::{User, UserId};
use crate::store::DocumentStore;

/// Handle to an active subscription.
///
/// Delivery continues while the handle is alive; dropping it cancels the
/// subscription.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    token: CancellationToken,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop delivery. Safe to call any number of times, including after the
    /// subscription already ended on its own.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Fans committed record changes out to subscribers.
pub struct SyncHub {
    store: Arc<dyn DocumentStore>,
    active: Arc<DashMap<Uuid, CancellationToken>>,
}

impl SyncHub {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            active: Arc::new(DashMap::new()),
        }
    }

    /// Subscribe to a user record.
    ///
    /// The callback fires once with the current state, then on every
    /// committed change (coalesced under load). Subscribing to a user that
    /// does not exist yet is fine; the first delivery happens at creation.
    /// Re-subscribing after a gap starts from the current state, so nothing
    /// is owed for changes made in between.
    pub fn subscribe_user(
        &self,
        user_id: &UserId,
        mut on_change: impl FnMut(User) + Send + 'static,
    ) -> Subscription {
        self.spawn_delivery(user_id, move |record| on_change(record))
    }

    /// Subscribe to the completion flag of one (user, card) pair.
    ///
    /// Fires with the current value, then only when the flag actually flips;
    /// unrelated record changes are filtered out.
    pub fn subscribe_done(
        &self,
        user_id: &UserId,
        card: &CardId,
        mut on_change: impl FnMut(bool) + Send + 'static,
    ) -> Subscription {
        let card = card.clone();
        let mut last: Option<bool> = None;
        self.spawn_delivery(user_id, move |record: User| {
            let done = record.is_done(&card);
            if last != Some(done) {
                last = Some(done);
                on_change(done);
            }
        })
    }

    fn spawn_delivery(
        &self,
        user_id: &UserId,
        mut deliver: impl FnMut(User) + Send + 'static,
    ) -> Subscription {
        let sub_id = Uuid::new_v4();
        let token = CancellationToken::new();
        let rx = self.store.watch(user_id);
        self.active.insert(sub_id, token.clone());

        let task_token = token.clone();
        let registry = Arc::clone(&self.active);
        let task_user = user_id.clone();
        tokio::spawn(async move {
            let mut stream = WatchStream::new(rx);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    next = stream.next() => match next {
                        Some(Some(record)) => deliver(record),
                        // Record not created yet; nothing to deliver.
                        Some(None) => {}
                        // Store side of the channel dropped.
                        None => break,
                    },
                }
            }
            registry.remove(&sub_id);
            debug!(user_id = %task_user, subscription = %sub_id, "subscription ended");
        });

        Subscription { id: sub_id, token }
    }

    /// Number of subscriptions whose delivery task is still running.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
