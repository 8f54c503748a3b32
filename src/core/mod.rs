//! Core ledger functionality
//!
//! Blocks, transfers, hashing, proof-of-work, difficulty control, the chain
//! itself, settlement of balances and the end-to-end mining pass.

pub mod block;
pub mod blockchain;
pub mod difficulty;
pub mod hashing;
pub mod mining;
pub mod monetary;
pub mod proof_of_work;
pub mod settlement;
pub mod transaction;

pub use block::{Block, GENESIS_DIFFICULTY};
pub use blockchain::{BlockVerdict, Blockchain};
pub use difficulty::DifficultyAdjustment;
pub use hashing::{hash_block, Digest, DIGEST_LEN};
pub use mining::{MiningOutcome, MiningPass};
pub use monetary::{BLOCK_CAPACITY, GRANT_AMOUNT, TRANSACTION_FEE};
pub use proof_of_work::ProofOfWork;
pub use settlement::{BalanceChange, Settlement, SettlementPlan};
pub use transaction::{Transaction, TransactionStatus};
