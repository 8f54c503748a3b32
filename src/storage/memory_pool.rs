use crate::core::{Transaction, TransactionStatus};
use crate::error::{BlockchainError, Result};
use crate::storage::{AccountLedger, SnapshotStore};
use crate::wallet::{Address, Session};
use log::{info, warn};
use std::collections::{HashMap, VecDeque};

/// A transfer dropped during selection, and why
#[derive(Debug, Clone)]
pub struct RejectedTransaction {
    pub transaction: Transaction,
    pub reason: BlockchainError,
}

/// Result of one selection pass
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub batch: Vec<Transaction>,
    pub rejected: Vec<RejectedTransaction>,
}

/// FIFO of pending transfers awaiting a block.
///
/// When opened from a `SnapshotStore` every mutation is written back before
/// the call returns.
pub struct TransactionPool {
    pending: VecDeque<Transaction>,
    store: Option<SnapshotStore>,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionPool {
    /// Unpersisted, empty pool
    pub fn new() -> TransactionPool {
        TransactionPool {
            pending: VecDeque::new(),
            store: None,
        }
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> TransactionPool {
        TransactionPool {
            pending: transactions.into(),
            store: None,
        }
    }

    /// Load the pool snapshot and keep writing back to it
    pub fn open(store: &SnapshotStore) -> Result<TransactionPool> {
        Ok(TransactionPool {
            pending: store.load_pool()?.into(),
            store: Some(store.clone()),
        })
    }

    /// Queue a transfer; its index is its position in the pool
    pub fn submit(
        &mut self,
        sender: Address,
        receiver: Address,
        amount: u64,
    ) -> Result<&Transaction> {
        if amount == 0 {
            return Err(BlockchainError::Transaction(
                "Amount must be positive".to_string(),
            ));
        }
        if sender == receiver {
            return Err(BlockchainError::Transaction(
                "Sender and receiver must differ".to_string(),
            ));
        }
        let index = u32::try_from(self.pending.len())
            .map_err(|_| BlockchainError::Transaction("Pool is full".to_string()))?;
        self.pending
            .push_back(Transaction::pending(index, sender, receiver, amount));
        self.persist()?;
        info!("Transaction {index} queued: {sender} -> {receiver}, {amount}");
        Ok(&self.pending[self.pending.len() - 1])
    }

    /// Queue a transfer on behalf of a logged-in user. The sender must be the
    /// session's own address and the receiver must be registered.
    pub fn send<A: AccountLedger + ?Sized>(
        &mut self,
        session: &Session,
        sender: &Address,
        receiver: &Address,
        amount: u64,
        accounts: &A,
    ) -> Result<&Transaction> {
        session.authorize_sender(sender)?;
        if accounts.lookup(receiver)?.is_none() {
            return Err(BlockchainError::AccountNotFound(format!("receiver {receiver}")));
        }
        self.submit(*sender, *receiver, amount)
    }

    /// Pull at most `capacity` affordable transfers off the front of the pool.
    ///
    /// Single left-to-right pass. A sender's balance is read once, when first
    /// seen, and reduced by every transfer of theirs already accepted, so one
    /// balance is never spent twice within a batch. Unaffordable transfers and
    /// transfers from unknown senders are deleted, not deferred.
    pub fn select_for_block<A: AccountLedger + ?Sized>(
        &mut self,
        capacity: usize,
        fee: u64,
        accounts: &A,
    ) -> Result<Selection> {
        if self.pending.is_empty() {
            return Err(BlockchainError::EmptyPool);
        }

        let mut selection = Selection::default();
        let mut projected: HashMap<Address, i64> = HashMap::new();

        while selection.batch.len() < capacity {
            let Some(tx) = self.pending.pop_front() else {
                break;
            };

            let available = match projected.get(tx.get_sender()) {
                Some(balance) => Some(*balance),
                None => accounts
                    .lookup(tx.get_sender())?
                    .map(|account| account.get_balance()),
            };

            let Some(available) = available else {
                warn!(
                    "Dropping transaction {}: unknown sender {}",
                    tx.get_index(),
                    tx.get_sender()
                );
                selection.rejected.push(RejectedTransaction {
                    reason: BlockchainError::AccountNotFound(tx.get_sender().to_string()),
                    transaction: tx.with_status(TransactionStatus::Failed),
                });
                continue;
            };

            let required = tx.cost(fee);
            let affordable = i64::try_from(required)
                .map(|required| available >= required)
                .unwrap_or(false);
            if !affordable {
                warn!(
                    "Insufficient balance for transaction {} from {}: \
                     required {required}, available {available}",
                    tx.get_index(),
                    tx.get_sender()
                );
                selection.rejected.push(RejectedTransaction {
                    reason: BlockchainError::InsufficientFunds {
                        required,
                        available,
                    },
                    transaction: tx.with_status(TransactionStatus::Failed),
                });
                continue;
            }

            // affordable implies required fits in i64
            projected.insert(*tx.get_sender(), available - required as i64);
            let mut accepted = tx;
            accepted.set_index(selection.batch.len() as u32);
            selection.batch.push(accepted);
        }

        self.reindex();
        self.persist()?;
        info!(
            "Selected {} transactions for mining, dropped {}, {} left pending",
            selection.batch.len(),
            selection.rejected.len(),
            self.pending.len()
        );
        Ok(selection)
    }

    /// Put a claimed batch back at the head of the queue, in its original
    /// order and Pending again, after a mining pass failed to land it
    pub fn requeue(&mut self, batch: Vec<Transaction>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let count = batch.len();
        for tx in batch.into_iter().rev() {
            self.pending
                .push_front(tx.with_status(TransactionStatus::Pending));
        }
        self.reindex();
        self.persist()?;
        info!("Returned {count} transactions to the pool");
        Ok(())
    }

    fn reindex(&mut self) {
        for (position, tx) in self.pending.iter_mut().enumerate() {
            tx.set_index(position as u32);
        }
    }

    fn persist(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.save_pool(self.pending.iter())?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Transaction> {
        self.pending.iter()
    }
}
