//! Test helpers for generating unique test data
//!
//! ULID-based generators for ids that must not collide across tests sharing
//! a store.

use engine::{CardId, UserId};
use ulid::Ulid;

/// Generate a unique string with the given prefix.
///
/// # Examples
/// ```
/// use engine_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("code");
/// let b = unique_str("code");
/// assert_ne!(a, b);
/// assert!(a.starts_with("code-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique user id with the given prefix.
///
/// # Examples
/// ```
/// use engine_test_support::unique_helpers::unique_user_id;
///
/// let a = unique_user_id("alice");
/// let b = unique_user_id("alice");
/// assert_ne!(a, b);
/// ```
pub fn unique_user_id(prefix: &str) -> UserId {
    UserId::from(unique_str(prefix))
}

/// Generate a unique card id with the given prefix.
pub fn unique_card_id(prefix: &str) -> CardId {
    CardId::from(unique_str(prefix))
}
