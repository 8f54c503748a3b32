//! Data storage and persistence
//!
//! The sled account database, the pending transfer pool and the chain/pool
//! snapshot files.

pub mod accounts;
pub mod memory_pool;
pub mod snapshot;

pub use accounts::{AccountLedger, AccountStore, MemoryAccounts};
pub use memory_pool::{RejectedTransaction, Selection, TransactionPool};
pub use snapshot::{SnapshotStore, CHAIN_FILE, POOL_FILE};
