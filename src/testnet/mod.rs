//! Shared helpers for unit tests: temporary snapshot stores, seeded account
//! ledgers and prebuilt chains.

pub mod test_utils;

pub use test_utils::*;
