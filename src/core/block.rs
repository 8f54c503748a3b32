use crate::core::hashing::{self, Digest};
use crate::core::{ProofOfWork, Transaction, TransactionStatus};
use crate::utils::{display_timestamp, TIMESTAMP_LEN};
use crate::wallet::Address;
use log::info;

/// Identities behind the sentinel transfer in the genesis block
const GENESIS_SENDER: &str = "Genesis";
const GENESIS_RECEIVER: &str = "Blockchain";
const GENESIS_AMOUNT: u64 = 10;
/// The genesis block is always mined at this difficulty
pub const GENESIS_DIFFICULTY: u32 = 1;

// Field order matches the chain snapshot record layout.
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Block {
    index: u32,
    timestamp: [u8; TIMESTAMP_LEN],
    nonce: u64,
    previous_hash: Digest,
    current_hash: Digest,
    transactions: Vec<Transaction>,
}

impl Block {
    /// An unmined block stamped with the current local time
    pub fn new(index: u32, previous_hash: Digest, transactions: Vec<Transaction>) -> Block {
        Block::with_timestamp(index, display_timestamp(), previous_hash, transactions)
    }

    pub fn with_timestamp(
        index: u32,
        timestamp: [u8; TIMESTAMP_LEN],
        previous_hash: Digest,
        transactions: Vec<Transaction>,
    ) -> Block {
        Block {
            index,
            timestamp,
            nonce: 0,
            previous_hash,
            current_hash: Digest::ZERO,
            transactions,
        }
    }

    pub fn generate_genesis_block() -> Block {
        let sentinel = Transaction::new(
            0,
            Address::derive(GENESIS_SENDER),
            Address::derive(GENESIS_RECEIVER),
            GENESIS_AMOUNT,
            TransactionStatus::Settled,
        );
        let mut block = Block::new(0, Digest::ZERO, vec![sentinel]);
        block.mine(GENESIS_DIFFICULTY);
        block
    }

    /// Search for a nonce meeting `difficulty`, then freeze nonce and hash
    pub fn mine(&mut self, difficulty: u32) -> Digest {
        info!("Mining block {} at difficulty {difficulty}...", self.index);
        let (nonce, hash) = ProofOfWork::new(self, difficulty).run();
        self.nonce = nonce;
        self.current_hash = hash;
        info!("Block {} mined with nonce: {nonce}", self.index);
        hash
    }

    /// Recompute the digest from the block's contents
    pub fn calculate_hash(&self) -> Digest {
        hashing::hash_block(self)
    }

    pub fn get_index(&self) -> u32 {
        self.index
    }

    pub fn get_timestamp(&self) -> &[u8; TIMESTAMP_LEN] {
        &self.timestamp
    }

    /// Timestamp without the trailing newline and padding
    pub fn get_timestamp_str(&self) -> String {
        let end = self
            .timestamp
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(TIMESTAMP_LEN);
        String::from_utf8_lossy(&self.timestamp[..end])
            .trim_end()
            .to_string()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_previous_hash(&self) -> &Digest {
        &self.previous_hash
    }

    pub fn get_hash(&self) -> &Digest {
        &self.current_hash
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    /// Fees the miner collects for this block
    pub fn total_fees(&self, fee: u64) -> u64 {
        fee.saturating_mul(self.transactions.len() as u64)
    }

    #[cfg(test)]
    pub fn transactions_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.transactions
    }

    #[cfg(test)]
    pub fn set_hash(&mut self, hash: Digest) {
        self.current_hash = hash;
    }

    #[cfg(test)]
    pub fn set_previous_hash(&mut self, hash: Digest) {
        self.previous_hash = hash;
    }
}
