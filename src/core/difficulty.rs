use crate::error::{BlockchainError, Result};
use log::info;

// Retuning band, in seconds of wall time spent mining the last block
const FAST_BLOCK_SECS: u64 = 10;
const SLOW_BLOCK_SECS: u64 = 40;
const INITIAL_DIFFICULTY: u32 = 1; // Starting difficulty
const MIN_DIFFICULTY: u32 = 1; // Minimum difficulty
const MAX_DIFFICULTY: u32 = 32; // A SHA-256 digest has 32 bytes

/// Reactive difficulty control: one step per block, no history
pub struct DifficultyAdjustment;

impl DifficultyAdjustment {
    /// Next difficulty given when mining of the last block started and ended
    pub fn retune(prev_time: u64, curr_time: u64, difficulty: u32) -> u32 {
        let elapsed = curr_time.saturating_sub(prev_time);
        let next = if elapsed < FAST_BLOCK_SECS {
            difficulty.saturating_add(1).min(MAX_DIFFICULTY)
        } else if elapsed > SLOW_BLOCK_SECS && difficulty > MIN_DIFFICULTY {
            difficulty - 1
        } else {
            difficulty
        };

        if next != difficulty {
            info!("Difficulty adjustment: {difficulty} -> {next} (block took {elapsed}s)");
        }
        next
    }

    /// Get the initial difficulty for a fresh chain
    pub fn get_initial_difficulty() -> u32 {
        INITIAL_DIFFICULTY
    }

    /// Difficulties outside this range are never accepted from config or snapshots
    pub fn validate_difficulty(difficulty: u32) -> Result<()> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return Err(BlockchainError::Config(format!(
                "Difficulty {difficulty} is outside valid range \
                 [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}]"
            )));
        }
        Ok(())
    }
}
