//! Fault-injecting store wrapper
//!
//! `FlakyStore` delegates to an in-memory store but fails an armed number of
//! upcoming commits with a transient error. Tests use it to drive the retry
//! paths without a real backend outage.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use engine::{DocumentStore, MemoryStore, ShortCode, StoreError, User, UserId, WriteBatch};
use tokio::sync::watch;
use tracing::debug;

/// In-memory store that can be armed to fail the next N commits.
///
/// Reads, creates and watches always pass through; only `commit` is subject
/// to injection. Each injected failure is `StoreError::Unavailable`, which the
/// engine classifies as transient and retries.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_commits: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the wrapper: the next `n` commits fail with a transient error.
    pub fn fail_next_commits(&self, n: u32) {
        self.fail_commits.store(n, Ordering::SeqCst);
    }

    /// Injected failures not yet consumed.
    pub fn injected_remaining(&self) -> u32 {
        self.fail_commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.inner.get(id).await
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<Option<User>>, StoreError> {
        self.inner.get_many(ids).await
    }

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<User>, StoreError> {
        self.inner.find_by_short_code(code).await
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        self.inner.create(user).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let consumed = self
            .fail_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            debug!("injecting transient commit failure");
            return Err(StoreError::unavailable("injected commit failure"));
        }
        self.inner.commit(batch).await
    }

    fn watch(&self, id: &UserId) -> watch::Receiver<Option<User>> {
        self.inner.watch(id)
    }
}
