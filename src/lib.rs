//! # Workchain
//!
//! A single-node proof-of-work ledger. Registered accounts queue transfers
//! into a pool; a mining pass picks an affordable batch, searches for a nonce
//! whose SHA-256 digest starts with `difficulty` zero bytes, settles balances
//! and appends the block to the chain.
//!
//! ## Layout
//! - `core/`: blocks, transfers, hashing, proof-of-work, difficulty, the chain,
//!   settlement and the mining pass
//! - `storage/`: the sled account database, the transfer pool and snapshots
//! - `wallet/`: addresses, accounts and the logged-in session
//! - `config/`: settings from defaults, `workchain.toml` and the environment
//! - `utils/`: digests, timestamps and snapshot encoding
//! - `cli/`: argument parsing and printable views

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

pub use cli::{BlockView, Command, Opt, TransactionView};
pub use config::{Config, Settings, GLOBAL_CONFIG};
pub use core::{
    Block, BlockVerdict, Blockchain, DifficultyAdjustment, Digest, MiningOutcome, MiningPass,
    ProofOfWork, Settlement, SettlementPlan, Transaction, TransactionStatus, BLOCK_CAPACITY,
    GRANT_AMOUNT, TRANSACTION_FEE,
};
pub use error::{BlockchainError, Result};
pub use storage::{
    AccountLedger, AccountStore, MemoryAccounts, RejectedTransaction, Selection, SnapshotStore,
    TransactionPool,
};
pub use utils::{current_timestamp, sha256_digest};
pub use wallet::{Account, Address, Session, ADDRESS_SIZE};
