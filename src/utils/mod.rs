//! Utility functions and helpers
//!
//! Hashing, timestamps and the snapshot codec used throughout the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, display_timestamp, sha256_digest, TIMESTAMP_LEN};

pub use serialization::{deserialize, serialize};
