//! Balance effects of a mined block
//!
//! Settlement is staged first: every account the block touches is looked up
//! and the net change per address is computed. Nothing is written unless the
//! whole block resolves, and the resulting plan is committed by the account
//! store in one atomic step.

use crate::core::Block;
use crate::error::{BlockchainError, Result};
use crate::storage::AccountLedger;
use crate::wallet::Address;
use log::info;

/// Net balance change for one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    pub address: Address,
    pub delta: i64,
}

/// Staged, not yet applied, effects of one block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    changes: Vec<BalanceChange>,
    fees_collected: u64,
}

impl SettlementPlan {
    fn credit(&mut self, address: Address, delta: i64) -> Result<()> {
        match self.changes.iter_mut().find(|c| c.address == address) {
            Some(change) => {
                change.delta = change.delta.checked_add(delta).ok_or_else(|| {
                    BlockchainError::Settlement(format!("balance change overflow for {address}"))
                })?;
            }
            None => self.changes.push(BalanceChange { address, delta }),
        }
        Ok(())
    }

    /// Changes in the order their addresses first appear in the block
    pub fn get_changes(&self) -> &[BalanceChange] {
        self.changes.as_slice()
    }

    pub fn delta_for(&self, address: &Address) -> i64 {
        self.changes
            .iter()
            .find(|c| c.address == *address)
            .map(|c| c.delta)
            .unwrap_or(0)
    }

    pub fn get_fees_collected(&self) -> u64 {
        self.fees_collected
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn to_signed(value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| BlockchainError::Settlement(format!("amount {value} exceeds balance range")))
}

pub struct Settlement;

impl Settlement {
    /// Resolve every account the block touches and compute the net effects.
    /// Fails, with no side effects, if any account is missing.
    pub fn plan<A: AccountLedger + ?Sized>(
        block: &Block,
        miner: &Address,
        fee: u64,
        accounts: &A,
    ) -> Result<SettlementPlan> {
        if accounts.lookup(miner)?.is_none() {
            return Err(BlockchainError::AccountNotFound(format!("miner {miner}")));
        }

        let fee_signed = to_signed(fee)?;
        let mut plan = SettlementPlan::default();
        for tx in block.get_transactions() {
            if accounts.lookup(tx.get_sender())?.is_none() {
                return Err(BlockchainError::AccountNotFound(format!(
                    "sender {} of transaction {}",
                    tx.get_sender(),
                    tx.get_index()
                )));
            }
            if accounts.lookup(tx.get_receiver())?.is_none() {
                return Err(BlockchainError::AccountNotFound(format!(
                    "receiver {} of transaction {}",
                    tx.get_receiver(),
                    tx.get_index()
                )));
            }

            let amount = to_signed(tx.get_amount())?;
            let cost = amount.checked_add(fee_signed).ok_or_else(|| {
                BlockchainError::Settlement(format!(
                    "cost overflow in transaction {}",
                    tx.get_index()
                ))
            })?;
            plan.credit(*tx.get_sender(), -cost)?;
            plan.credit(*tx.get_receiver(), amount)?;
            // once per transaction, not once per block
            plan.credit(*miner, fee_signed)?;
            plan.fees_collected = plan.fees_collected.saturating_add(fee);
        }
        Ok(plan)
    }

    /// Stage and commit in one go
    pub fn settle<A: AccountLedger + ?Sized>(
        block: &Block,
        miner: &Address,
        fee: u64,
        accounts: &A,
    ) -> Result<SettlementPlan> {
        let plan = Self::plan(block, miner, fee, accounts)?;
        accounts.commit(&plan)?;
        info!(
            "Settled block {}: {} transfers, {} in fees to {miner}",
            block.get_index(),
            block.get_transactions().len(),
            plan.get_fees_collected()
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hashing::Digest;
    use crate::core::{Transaction, TransactionStatus};
    use crate::storage::MemoryAccounts;
    use crate::wallet::Account;

    const FEE: u64 = 250;

    fn settled(index: u32, from: &str, to: &str, amount: u64) -> Transaction {
        Transaction::new(
            index,
            Address::derive(from),
            Address::derive(to),
            amount,
            TransactionStatus::Settled,
        )
    }

    fn accounts() -> MemoryAccounts {
        MemoryAccounts::with_accounts(vec![
            Account::with_balance("alice", 10_000),
            Account::with_balance("bob", 500),
            Account::with_balance("miner", 0),
        ])
    }

    fn balance(accounts: &MemoryAccounts, who: &str) -> i64 {
        accounts
            .lookup(&Address::derive(who))
            .unwrap()
            .unwrap()
            .get_balance()
    }

    #[test]
    fn test_settle_single_transfer() {
        let accounts = accounts();
        let block = Block::new(1, Digest::ZERO, vec![settled(0, "alice", "bob", 100)]);
        let plan = Settlement::settle(&block, &Address::derive("miner"), FEE, &accounts).unwrap();

        assert_eq!(plan.get_fees_collected(), FEE);
        assert_eq!(balance(&accounts, "alice"), 10_000 - 100 - 250);
        assert_eq!(balance(&accounts, "bob"), 600);
        assert_eq!(balance(&accounts, "miner"), 250);
    }

    #[test]
    fn test_fee_is_paid_per_transaction() {
        let accounts = accounts();
        let block = Block::new(
            1,
            Digest::ZERO,
            vec![
                settled(0, "alice", "bob", 100),
                settled(1, "alice", "bob", 200),
                settled(2, "bob", "alice", 50),
            ],
        );
        let miner = Address::derive("miner");
        let plan = Settlement::plan(&block, &miner, FEE, &accounts).unwrap();
        assert_eq!(plan.delta_for(&miner), 750);
        assert_eq!(plan.delta_for(&Address::derive("alice")), -100 - 200 - 500 + 50);
        assert_eq!(plan.delta_for(&Address::derive("bob")), 300 - 50 - 250);
        // three distinct addresses, first-seen order
        let order: Vec<Address> = plan.get_changes().iter().map(|c| c.address).collect();
        assert_eq!(
            order,
            vec![Address::derive("alice"), Address::derive("bob"), miner]
        );
    }

    #[test]
    fn test_missing_receiver_changes_nothing() {
        let accounts = accounts();
        let block = Block::new(
            1,
            Digest::ZERO,
            vec![
                settled(0, "alice", "bob", 100),
                settled(1, "alice", "nobody", 100),
            ],
        );
        let result = Settlement::settle(&block, &Address::derive("miner"), FEE, &accounts);
        assert!(matches!(result, Err(BlockchainError::AccountNotFound(_))));

        assert_eq!(balance(&accounts, "alice"), 10_000);
        assert_eq!(balance(&accounts, "bob"), 500);
        assert_eq!(balance(&accounts, "miner"), 0);
    }

    #[test]
    fn test_missing_miner_fails_before_any_lookup() {
        let accounts = accounts();
        let block = Block::new(1, Digest::ZERO, vec![settled(0, "alice", "bob", 1)]);
        let result = Settlement::plan(&block, &Address::derive("ghost"), FEE, &accounts);
        assert!(matches!(result, Err(BlockchainError::AccountNotFound(_))));
    }

    #[test]
    fn test_miner_can_also_transact() {
        let accounts = MemoryAccounts::with_accounts(vec![
            Account::with_balance("miner", 1_000),
            Account::with_balance("bob", 0),
        ]);
        let block = Block::new(1, Digest::ZERO, vec![settled(0, "miner", "bob", 100)]);
        Settlement::settle(&block, &Address::derive("miner"), FEE, &accounts).unwrap();
        // pays amount + fee, collects the fee back
        assert_eq!(balance(&accounts, "miner"), 900);
        assert_eq!(balance(&accounts, "bob"), 100);
    }
}
