//! Document store abstraction.
//!
//! The engine treats persistence as a small contract: point reads, a short
//! code lookup, create, an atomic conditional multi-record commit, and a
//! watch channel per record. Anything that can honor that contract can back
//! the engine; `memory::MemoryStore` is the in-process implementation.

pub mod memory;
pub mod retry;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::user::{ShortCode, User, UserId};
use crate::errors::store::StoreError;

pub use memory::MemoryStore;
pub use retry::{retry_transient, RetryPolicy};

/// Store-assigned commit counter for a record.
pub type Revision = u64;

/// An atomic conditional write over one or two user records.
///
/// Every batch carries a read set (record revisions the caller based its
/// reasoning on) and a write set. The store applies all writes only if every
/// expectation still holds; otherwise nothing is applied.
///
/// `write` registers the record's own loaded revision as an expectation, so a
/// plain single-record update needs no extra calls. `expect` adds a record to
/// the read set without writing it; decision recording uses this to make the
/// commit fail when the partner record moved between read and write.
#[derive(Debug, Default)]
pub struct WriteBatch {
    expectations: Vec<(UserId, Revision)>,
    writes: Vec<User>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `snapshot` to the read set without writing it.
    pub fn expect(mut self, snapshot: &User) -> Self {
        self.note_expectation(snapshot.id.clone(), snapshot.revision);
        self
    }

    /// Write `record` back, expecting it to be unchanged since it was loaded.
    pub fn write(mut self, record: User) -> Self {
        self.note_expectation(record.id.clone(), record.revision);
        self.writes.push(record);
        self
    }

    pub fn expectations(&self) -> &[(UserId, Revision)] {
        &self.expectations
    }

    pub fn writes(&self) -> &[User] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<(UserId, Revision)>, Vec<User>) {
        (self.expectations, self.writes)
    }

    fn note_expectation(&mut self, id: UserId, revision: Revision) {
        if !self.expectations.iter().any(|(existing, _)| *existing == id) {
            self.expectations.push((id, revision));
        }
    }
}

/// Persistence contract for user records.
///
/// Reads return snapshots; mutations go through `create` for new records and
/// `commit` for everything else. Implementations must apply a commit
/// atomically and notify watchers of each written record in commit order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Fetch several records from one consistent snapshot.
    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<Option<User>>, StoreError>;

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<User>, StoreError>;

    /// Insert a fresh record. Fails if the id or short code is taken. The
    /// stored record (with its store-assigned revision) is returned.
    async fn create(&self, user: User) -> Result<User, StoreError>;

    /// Apply a conditional batch. All writes land or none do.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Watch a record for committed changes. The receiver starts at the
    /// record's current state (`None` while it does not exist yet) and moves
    /// to each committed version, coalescing under load.
    fn watch(&self, id: &UserId) -> watch::Receiver<Option<User>>;
}
