//! Small shared utilities.

pub mod short_code;
