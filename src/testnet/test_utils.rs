//! Test utilities for ledger testing

use crate::core::{Blockchain, Transaction, TransactionStatus};
use crate::error::{BlockchainError, Result};
use crate::storage::{AccountLedger, MemoryAccounts, SnapshotStore};
use crate::wallet::{Account, Address};
use tempfile::TempDir;

/// Snapshot store rooted in a fresh temporary directory; keep the dir alive
pub fn create_temp_store() -> Result<(TempDir, SnapshotStore)> {
    let dir = tempfile::tempdir().map_err(|e| BlockchainError::Io(e.to_string()))?;
    let store = SnapshotStore::new(dir.path());
    Ok((dir, store))
}

/// In-memory accounts with the given starting balances
pub fn accounts_with(balances: &[(&str, i64)]) -> MemoryAccounts {
    MemoryAccounts::with_accounts(
        balances
            .iter()
            .map(|(identity, balance)| Account::with_balance(identity, *balance))
            .collect(),
    )
}

pub fn balance_of<A: AccountLedger + ?Sized>(accounts: &A, identity: &str) -> Result<i64> {
    accounts
        .lookup(&Address::derive(identity))?
        .map(|account| account.get_balance())
        .ok_or_else(|| BlockchainError::AccountNotFound(identity.to_string()))
}

pub fn settled_transfer(index: u32, from: &str, to: &str, amount: u64) -> Transaction {
    Transaction::new(
        index,
        Address::derive(from),
        Address::derive(to),
        amount,
        TransactionStatus::Settled,
    )
}

/// Genesis plus `extra` blocks, each mined at difficulty 1
pub fn build_chain(extra: u32) -> Blockchain {
    let mut chain = Blockchain::init();
    for i in 0..extra {
        let transfer = settled_transfer(0, "alice", "bob", u64::from(i) + 1);
        let mut block = chain.next_block(vec![transfer]);
        block.mine(1);
        chain.append(Some(block));
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chain() {
        let chain = build_chain(3);
        assert_eq!(chain.len(), 4);
        assert!(chain.is_valid());
        assert_eq!(chain.tail().unwrap().get_index(), 3);
    }

    #[test]
    fn test_accounts_with() {
        let accounts = accounts_with(&[("alice", 5)]);
        assert_eq!(balance_of(&accounts, "alice").unwrap(), 5);
        assert!(balance_of(&accounts, "bob").is_err());
    }

    #[test]
    fn test_temp_store_is_empty() {
        let (_dir, store) = create_temp_store().unwrap();
        assert!(!store.chain_exists());
        assert!(store.load_pool().unwrap().is_empty());
    }
}
