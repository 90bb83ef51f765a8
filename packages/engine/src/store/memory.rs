//! In-memory document store.
//!
//! Backed by a single `RwLock` over both the record map and the short code
//! index. Commits validate every expectation and apply every write under one
//! write lock; watch notifications are sent while the lock is still held, so
//! subscribers observe versions in commit order.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::debug;

use crate::domain::user::{ShortCode, User, UserId};
use crate::errors::store::StoreError;
use crate::store::{DocumentStore, WriteBatch};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    codes: HashMap<ShortCode, UserId>,
}

/// Process-local store, also the reference implementation for the
/// `DocumentStore` contract.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    // Lock order is always `inner` first, then this map.
    watchers: DashMap<UserId, watch::Sender<Option<User>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, record: &User) {
        if let Some(sender) = self.watchers.get(&record.id) {
            sender.send_replace(Some(record.clone()));
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().users.get(id).cloned())
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<Option<User>>, StoreError> {
        let inner = self.inner.read();
        Ok(ids.iter().map(|id| inner.users.get(id).cloned()).collect())
    }

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .codes
            .get(code)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn create(&self, mut user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write();

        if inner.users.contains_key(&user.id) {
            return Err(StoreError::AlreadyExists { id: user.id });
        }
        if inner.codes.contains_key(&user.short_code) {
            return Err(StoreError::CodeTaken {
                code: user.short_code,
            });
        }

        user.revision = 1;
        inner.codes.insert(user.short_code.clone(), user.id.clone());
        inner.users.insert(user.id.clone(), user.clone());
        debug!(user_id = %user.id, "record created");
        self.notify(&user);
        Ok(user)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let (expectations, writes) = batch.into_parts();
        let mut inner = self.inner.write();

        // Validate the whole read set before touching anything.
        for (id, expected) in &expectations {
            match inner.users.get(id) {
                None => return Err(StoreError::Missing { id: id.clone() }),
                Some(current) if current.revision != *expected => {
                    return Err(StoreError::RevisionMismatch {
                        id: id.clone(),
                        expected: *expected,
                        found: current.revision,
                    });
                }
                Some(_) => {}
            }
        }

        let now = OffsetDateTime::now_utc();
        for mut record in writes {
            if let Some(current) = inner.users.get(&record.id) {
                // Short codes are immutable once issued.
                debug_assert_eq!(current.short_code, record.short_code);
            }
            debug_assert!(record.is_consistent(), "refusing inconsistent record");

            record.revision += 1;
            record.updated_at = now;
            inner.users.insert(record.id.clone(), record.clone());
            self.notify(&record);
        }
        Ok(())
    }

    fn watch(&self, id: &UserId) -> watch::Receiver<Option<User>> {
        // Holding the read lock here keeps the seeded value and the sender
        // registration atomic with respect to concurrent commits.
        let inner = self.inner.read();
        let current = inner.users.get(id).cloned();
        let sender = self
            .watchers
            .entry(id.clone())
            .or_insert_with(|| watch::channel(current).0);
        sender.subscribe()
    }
}
