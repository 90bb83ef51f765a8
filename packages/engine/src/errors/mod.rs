//! Error handling for the matching engine.

pub mod domain;
pub mod store;

pub use domain::DomainError;
pub use store::StoreError;
