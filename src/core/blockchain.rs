// The chain lives in memory as an owned Vec ordered genesis -> tip.
// Persistence is handled separately by storage::SnapshotStore.

use crate::core::hashing::Digest;
use crate::core::{Block, DifficultyAdjustment, Transaction};
use crate::error::{BlockchainError, Result};
use log::{info, warn};

/// Outcome of re-checking one block during an audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockVerdict {
    pub index: u32,
    pub valid: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blockchain {
    blocks: Vec<Block>,
    difficulty: u32,
}

impl Blockchain {
    /// A fresh chain holding only the genesis block
    pub fn init() -> Blockchain {
        Self::init_with_difficulty(DifficultyAdjustment::get_initial_difficulty())
    }

    pub fn init_with_difficulty(difficulty: u32) -> Blockchain {
        info!("Creating genesis block");
        let genesis = Block::generate_genesis_block();
        Blockchain {
            blocks: vec![genesis],
            difficulty: difficulty.max(1),
        }
    }

    /// Rebuild a chain from restored parts; contents are not re-validated here
    pub fn from_parts(difficulty: u32, blocks: Vec<Block>) -> Result<Blockchain> {
        if blocks.is_empty() {
            return Err(BlockchainError::Serialization(
                "Chain snapshot contains no blocks".to_string(),
            ));
        }
        DifficultyAdjustment::validate_difficulty(difficulty)?;
        Ok(Blockchain { blocks, difficulty })
    }

    /// O(1) tail insertion; `None` is ignored
    pub fn append(&mut self, block: Option<Block>) {
        if let Some(block) = block {
            self.blocks.push(block);
        }
    }

    /// Unmined candidate that extends the current tip
    pub fn next_block(&self, transactions: Vec<Transaction>) -> Block {
        Block::new(self.len() as u32, *self.tip_hash(), transactions)
    }

    /// Walk from genesis recomputing every hash. The expected previous hash is
    /// the prior block's *recomputed* hash, so a forged previous-hash field
    /// does not hide tampering upstream.
    pub fn validate(&self) -> Result<()> {
        let mut expected_previous = Digest::ZERO;
        for (position, block) in self.blocks.iter().enumerate() {
            let calculated = block.calculate_hash();
            if let Some(reason) =
                Self::check_block(block, position, &calculated, &expected_previous)
            {
                return Err(BlockchainError::InvalidChain {
                    index: block.get_index(),
                    reason,
                });
            }
            expected_previous = calculated;
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }

    /// Per-block verdicts. Once a block fails, every later block is reported
    /// invalid too; earlier blocks are unaffected.
    pub fn audit(&self) -> Vec<BlockVerdict> {
        let mut expected_previous = Digest::ZERO;
        let mut broken_at: Option<u32> = None;
        let mut verdicts = Vec::with_capacity(self.blocks.len());

        for (position, block) in self.blocks.iter().enumerate() {
            let calculated = block.calculate_hash();
            let reason = match broken_at {
                Some(index) => Some(format!("descends from invalid block {index}")),
                None => Self::check_block(block, position, &calculated, &expected_previous),
            };
            if reason.is_some() && broken_at.is_none() {
                broken_at = Some(block.get_index());
            }
            verdicts.push(BlockVerdict {
                index: block.get_index(),
                valid: reason.is_none(),
                reason,
            });
            expected_previous = calculated;
        }
        verdicts
    }

    fn check_block(
        block: &Block,
        position: usize,
        calculated: &Digest,
        expected_previous: &Digest,
    ) -> Option<String> {
        if block.get_index() as usize != position {
            return Some(format!(
                "index {} stored at position {position}",
                block.get_index()
            ));
        }
        if block.get_hash() != calculated {
            return Some(format!(
                "stored hash {} does not match computed {}",
                block.get_hash(),
                calculated
            ));
        }
        if block.get_previous_hash() != expected_previous {
            return Some(format!(
                "previous hash {} does not match {}",
                block.get_previous_hash(),
                expected_previous
            ));
        }
        None
    }

    /// Apply one step of difficulty control after a block was mined
    pub fn retune_difficulty(&mut self, prev_time: u64, curr_time: u64) -> u32 {
        self.difficulty = DifficultyAdjustment::retune(prev_time, curr_time, self.difficulty);
        self.difficulty
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tail(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn tip_hash(&self) -> &Digest {
        self.tail().map(Block::get_hash).unwrap_or(&Digest::ZERO)
    }

    pub fn get_blocks(&self) -> &[Block] {
        self.blocks.as_slice()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    #[cfg(test)]
    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}

impl<'a> IntoIterator for &'a Blockchain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
