//! Block hashing
//!
//! The preimage layout below is what every stored hash was computed over.
//! Changing the order or width of any field invalidates all persisted chains.

use crate::core::Block;
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use std::fmt;

pub const DIGEST_LEN: usize = 32;

/// SHA-256 output
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub const ZERO: Digest = Digest([0u8; DIGEST_LEN]);

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Digest {
        Digest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// Canonical preimage of a block:
/// index (u32 BE) | timestamp bytes | previous hash | nonce (u64 LE) |
/// per transaction: sender | receiver | amount (u64 LE) | status tag (u32 LE)
pub fn prepare_data(block: &Block, nonce: u64) -> Vec<u8> {
    let transactions = block.get_transactions();
    let mut data_bytes = Vec::with_capacity(
        4 + block.get_timestamp().len() + DIGEST_LEN + 8 + transactions.len() * 44,
    );
    data_bytes.extend(block.get_index().to_be_bytes());
    data_bytes.extend(block.get_timestamp());
    data_bytes.extend(block.get_previous_hash().as_bytes());
    data_bytes.extend(nonce.to_le_bytes());
    for tx in transactions {
        data_bytes.extend(tx.get_sender().as_bytes());
        data_bytes.extend(tx.get_receiver().as_bytes());
        data_bytes.extend(tx.get_amount().to_le_bytes());
        data_bytes.extend(tx.get_status().tag().to_le_bytes());
    }
    data_bytes
}

/// Hash a block at its current nonce
pub fn hash_block(block: &Block) -> Digest {
    hash_with_nonce(block, block.get_nonce())
}

pub fn hash_with_nonce(block: &Block, nonce: u64) -> Digest {
    Digest(sha256_digest(&prepare_data(block, nonce)))
}
