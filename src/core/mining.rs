//! One end-to-end mining pass
//!
//! Load chain and pool, pick an affordable batch, assemble and mine a block,
//! stage its settlement, extend and re-validate the chain, then persist the
//! chain and commit balances. Either the whole pass lands or the chain
//! snapshot and balances are left as they were and the claimed batch is back
//! at the head of the pool. Transfers dropped as unaffordable stay dropped.

use crate::config::Settings;
use crate::core::{
    Block, Blockchain, DifficultyAdjustment, Digest, Settlement, Transaction, TransactionStatus,
    BLOCK_CAPACITY, TRANSACTION_FEE,
};
use crate::error::{BlockchainError, Result};
use crate::storage::{AccountLedger, RejectedTransaction, SnapshotStore, TransactionPool};
use crate::utils::current_timestamp;
use crate::wallet::{Address, Session};
use log::{error, info};

/// What a successful pass produced
#[derive(Debug, Clone)]
pub struct MiningOutcome {
    pub block: Block,
    /// Difficulty the block was mined at
    pub difficulty: u32,
    /// Chain difficulty after retuning
    pub next_difficulty: u32,
    pub elapsed_secs: u64,
    pub fees_collected: u64,
    pub rejected: Vec<RejectedTransaction>,
}

impl MiningOutcome {
    pub fn get_index(&self) -> u32 {
        self.block.get_index()
    }

    pub fn get_hash(&self) -> &Digest {
        self.block.get_hash()
    }

    pub fn get_nonce(&self) -> u64 {
        self.block.get_nonce()
    }

    pub fn accepted(&self) -> usize {
        self.block.get_transactions().len()
    }
}

pub struct MiningPass<'a, A: AccountLedger + ?Sized> {
    store: &'a SnapshotStore,
    accounts: &'a A,
    fee: u64,
    capacity: usize,
    initial_difficulty: u32,
}

impl<'a, A: AccountLedger + ?Sized> MiningPass<'a, A> {
    pub fn new(store: &'a SnapshotStore, accounts: &'a A) -> MiningPass<'a, A> {
        MiningPass {
            store,
            accounts,
            fee: TRANSACTION_FEE,
            capacity: BLOCK_CAPACITY,
            initial_difficulty: DifficultyAdjustment::get_initial_difficulty(),
        }
    }

    pub fn from_settings(
        settings: &Settings,
        store: &'a SnapshotStore,
        accounts: &'a A,
    ) -> MiningPass<'a, A> {
        MiningPass {
            store,
            accounts,
            fee: settings.transaction_fee,
            capacity: settings.block_capacity,
            initial_difficulty: settings.initial_difficulty,
        }
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Mine the next block, crediting fees to the session's account
    pub fn run(&self, session: &Session) -> Result<MiningOutcome> {
        let miner = self
            .accounts
            .lookup_current_session(session)?
            .ok_or_else(|| {
                BlockchainError::AccountNotFound(format!("miner {}", session.get_identity()))
            })?
            .get_address();

        let chain = self.store.load_chain(self.initial_difficulty)?;
        // a broken snapshot must not cost the pool anything
        chain.validate()?;

        let mut pool = TransactionPool::open(self.store)?;
        let selection = pool.select_for_block(self.capacity, self.fee, self.accounts)?;
        if selection.batch.is_empty() {
            return Err(BlockchainError::EmptyBatch);
        }

        let claimed = selection.batch.clone();
        match self.land_block(chain, selection.batch, &miner) {
            Ok(mut outcome) => {
                info!(
                    "Block {} accepted: {} transfers, {} in fees to {}",
                    outcome.get_index(),
                    outcome.accepted(),
                    outcome.fees_collected,
                    session.get_identity()
                );
                outcome.rejected = selection.rejected;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(requeue_err) = pool.requeue(claimed) {
                    error!("Could not return claimed transactions to the pool: {requeue_err}");
                }
                Err(e)
            }
        }
    }

    // Everything after selection. On error the chain snapshot and balances
    // are as they were; the caller owns putting the batch back.
    fn land_block(
        &self,
        mut chain: Blockchain,
        batch: Vec<Transaction>,
        miner: &Address,
    ) -> Result<MiningOutcome> {
        // status is part of the hash, so it is fixed before the nonce search
        let transactions = batch
            .into_iter()
            .map(|tx| tx.with_status(TransactionStatus::Settled))
            .collect();
        let mut block = chain.next_block(transactions);

        let difficulty = chain.get_difficulty();
        let started = current_timestamp()?;
        block.mine(difficulty);
        let finished = current_timestamp()?;

        let plan = Settlement::plan(&block, miner, self.fee, self.accounts)?;

        chain.append(Some(block.clone()));
        let next_difficulty = chain.retune_difficulty(started, finished);
        chain.validate()?;

        let backup = self.store.backup_chain()?;
        self.store.save_chain(&chain)?;
        if let Err(e) = self.accounts.commit(&plan) {
            error!("Settlement of block {} failed: {e}", block.get_index());
            self.store.restore_chain(backup)?;
            return Err(e);
        }

        Ok(MiningOutcome {
            block,
            difficulty,
            next_difficulty,
            elapsed_secs: finished.saturating_sub(started),
            fees_collected: plan.get_fees_collected(),
            rejected: vec![],
        })
    }
}
