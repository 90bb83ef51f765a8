//! Engine test support utilities
//!
//! This crate provides utilities specifically for engine testing, including
//! fault-injecting store wrappers, unique test data helpers, and unified
//! logging initialization.

pub mod flaky;
pub mod logging;
pub mod unique_helpers;
