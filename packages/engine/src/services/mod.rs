//! Service layer: orchestration over the store.
//!
//! Services are stateless; every operation loads fresh snapshots, runs pure
//! domain logic, and writes back through conditional commits. Concurrency is
//! handled uniformly: revision conflicts re-read and re-evaluate, transient
//! store failures back off and retry.

pub mod completion;
pub mod decisions;
pub mod pairing;
pub mod profiles;
pub mod registry;
pub mod sessions;

pub use completion::CompletionService;
pub use decisions::DecisionService;
pub use pairing::PairingService;
pub use registry::CodeRegistry;
pub use sessions::DeckService;

use tracing::warn;

use crate::errors::domain::DomainError;
use crate::errors::store::StoreError;

/// Upper bound on re-read rounds after commit conflicts within one operation.
/// A pair of writers settles in a round or two; the bound keeps a bug from
/// spinning forever.
pub(crate) const MAX_COMMIT_RETRIES: u32 = 8;

/// Terminal error once the conflict budget is used up.
pub(crate) fn conflict_exhausted(op: &'static str, last: Option<StoreError>) -> DomainError {
    warn!(op, "commit conflict budget exhausted");
    match last {
        Some(err) => DomainError::Store(err),
        None => DomainError::Store(StoreError::unavailable(format!(
            "{op}: conflict budget exhausted with no recorded error"
        ))),
    }
}
