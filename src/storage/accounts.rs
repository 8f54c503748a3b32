use crate::core::SettlementPlan;
use crate::error::{BlockchainError, Result};
use crate::utils::{deserialize, serialize};
use crate::wallet::{Account, Address, Session};
use log::info;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

const ACCOUNTS_TREE: &str = "accounts";

/// What the ledger needs from whoever owns the accounts
pub trait AccountLedger {
    fn lookup(&self, address: &Address) -> Result<Option<Account>>;

    /// The caller-identity boundary
    fn lookup_current_session(&self, session: &Session) -> Result<Option<Account>> {
        self.lookup(session.get_address())
    }

    fn persist(&self, account: &Account) -> Result<()>;

    /// Apply every change in the plan, or none of them
    fn commit(&self, plan: &SettlementPlan) -> Result<()>;
}

/// Sled-backed account database
#[derive(Clone)]
pub struct AccountStore {
    db: Db,
    tree: Tree,
}

impl AccountStore {
    pub fn open(path: &Path) -> Result<AccountStore> {
        let db = sled::open(path)
            .map_err(|e| BlockchainError::Database(format!("Failed to open database: {e}")))?;
        let tree = db.open_tree(ACCOUNTS_TREE).map_err(|e| {
            BlockchainError::Database(format!("Failed to open accounts tree: {e}"))
        })?;
        Ok(AccountStore { db, tree })
    }

    /// Register a new identity with a zero balance
    pub fn register(&self, identity: &str) -> Result<Account> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(BlockchainError::Transaction(
                "Identity must not be empty".to_string(),
            ));
        }
        let account = Account::new(identity);
        if self.lookup(&account.get_address())?.is_some() {
            return Err(BlockchainError::AccountExists(identity.to_string()));
        }
        self.persist(&account)?;
        info!("Registered {identity} as {}", account.get_address());
        Ok(account)
    }

    /// Credit tokens to an existing account
    pub fn grant(&self, address: &Address, amount: u64) -> Result<Account> {
        let mut account = self
            .lookup(address)?
            .ok_or_else(|| BlockchainError::AccountNotFound(address.to_string()))?;
        let delta = i64::try_from(amount)
            .map_err(|_| BlockchainError::Transaction(format!("Grant {amount} too large")))?;
        account.apply_delta(delta)?;
        self.persist(&account)?;
        info!("Granted {amount} to {address}");
        Ok(account)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut accounts = vec![];
        for item in self.tree.iter() {
            let (_, v) = item.map_err(|e| {
                BlockchainError::Database(format!("Failed to iterate accounts tree: {e}"))
            })?;
            accounts.push(deserialize::<Account>(v.as_ref())?);
        }
        Ok(accounts)
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| BlockchainError::Database(format!("Failed to flush accounts: {e}")))?;
        Ok(())
    }
}

impl AccountLedger for AccountStore {
    fn lookup(&self, address: &Address) -> Result<Option<Account>> {
        match self
            .tree
            .get(address.as_bytes())
            .map_err(|e| BlockchainError::Database(format!("Failed to get account: {e}")))?
        {
            Some(bytes) => Ok(Some(deserialize(bytes.as_ref())?)),
            None => Ok(None),
        }
    }

    fn persist(&self, account: &Account) -> Result<()> {
        let bytes = serialize(account)?;
        self.tree
            .insert(account.get_address().as_bytes(), bytes)
            .map_err(|e| BlockchainError::Database(format!("Failed to store account: {e}")))?;
        self.flush()
    }

    fn commit(&self, plan: &SettlementPlan) -> Result<()> {
        self.tree
            .transaction(|tx_db| apply_changes(tx_db, plan))
            .map_err(|e: TransactionError<BlockchainError>| match e {
                TransactionError::Abort(inner) => inner,
                TransactionError::Storage(inner) => {
                    BlockchainError::Database(format!("Failed to commit settlement: {inner}"))
                }
            })?;
        self.flush()
    }
}

type TxResult<T> = std::result::Result<T, ConflictableTransactionError<BlockchainError>>;

// Runs inside a sled transaction; may be retried on conflict.
fn apply_changes(tx_db: &TransactionalTree, plan: &SettlementPlan) -> TxResult<()> {
    for change in plan.get_changes() {
        let key = change.address.as_bytes();
        let bytes = tx_db.get(key)?.ok_or_else(|| {
            ConflictableTransactionError::Abort(BlockchainError::AccountNotFound(
                change.address.to_string(),
            ))
        })?;
        let mut account: Account =
            deserialize(bytes.as_ref()).map_err(ConflictableTransactionError::Abort)?;
        account
            .apply_delta(change.delta)
            .map_err(ConflictableTransactionError::Abort)?;
        let encoded = serialize(&account).map_err(ConflictableTransactionError::Abort)?;
        tx_db.insert(key, encoded)?;
    }
    Ok(())
}

/// In-process account ledger
#[derive(Default)]
pub struct MemoryAccounts {
    inner: RwLock<HashMap<Address, Account>>,
}

impl MemoryAccounts {
    pub fn new() -> MemoryAccounts {
        MemoryAccounts::default()
    }

    pub fn with_accounts(accounts: Vec<Account>) -> MemoryAccounts {
        let map = accounts
            .into_iter()
            .map(|account| (account.get_address(), account))
            .collect();
        MemoryAccounts {
            inner: RwLock::new(map),
        }
    }

    fn poisoned() -> BlockchainError {
        BlockchainError::Database("account map lock poisoned".to_string())
    }
}

impl AccountLedger for MemoryAccounts {
    fn lookup(&self, address: &Address) -> Result<Option<Account>> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(address).cloned())
    }

    fn persist(&self, account: &Account) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.insert(account.get_address(), account.clone());
        Ok(())
    }

    fn commit(&self, plan: &SettlementPlan) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        // stage on copies so a failure part-way leaves the map untouched
        let mut staged = Vec::with_capacity(plan.get_changes().len());
        for change in plan.get_changes() {
            let mut account = map
                .get(&change.address)
                .cloned()
                .ok_or_else(|| BlockchainError::AccountNotFound(change.address.to_string()))?;
            account.apply_delta(change.delta)?;
            staged.push(account);
        }
        for account in staged {
            map.insert(account.get_address(), account);
        }
        Ok(())
    }
}
