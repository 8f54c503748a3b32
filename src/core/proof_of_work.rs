use crate::core::hashing::{hash_with_nonce, Digest, DIGEST_LEN};
use crate::core::Block;

/// Brute-force nonce search over one block.
///
/// Difficulty counts leading zero *bytes*, so each step multiplies the
/// expected work by 256. There is no nonce ceiling and no cancellation.
pub struct ProofOfWork<'a> {
    block: &'a Block,
    difficulty: u32,
}

impl<'a> ProofOfWork<'a> {
    pub fn new(block: &'a Block, difficulty: u32) -> ProofOfWork<'a> {
        ProofOfWork { block, difficulty }
    }

    /// True iff the first `difficulty` bytes of `hash` are zero
    pub fn is_valid(hash: &Digest, difficulty: u32) -> bool {
        let required = difficulty as usize;
        if required > DIGEST_LEN {
            return false;
        }
        hash.as_bytes()[..required].iter().all(|b| *b == 0)
    }

    /// Validate proof-of-work of an already mined block
    pub fn validate(block: &Block, difficulty: u32) -> bool {
        let hash = block.calculate_hash();
        hash == *block.get_hash() && Self::is_valid(&hash, difficulty)
    }

    /// Returns the first nonce, counting from zero, whose digest is valid
    pub fn run(&self) -> (u64, Digest) {
        let mut nonce: u64 = 0;
        loop {
            let hash = hash_with_nonce(self.block, nonce);
            if Self::is_valid(&hash, self.difficulty) {
                return (nonce, hash);
            }
            nonce += 1;
        }
    }
}
