// Chain and pool snapshots on disk.
// Both files start with an explicit count, so a truncated file fails to decode
// instead of silently reading as shorter. Writes land in a sibling temp file
// that is renamed over the target.

use crate::config::Settings;
use crate::core::{Block, Blockchain, Transaction, TransactionStatus};
use crate::error::{BlockchainError, Result};
use crate::utils::{deserialize, serialize};
use crate::wallet::Address;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const CHAIN_FILE: &str = "blockchain.dat";
pub const POOL_FILE: &str = "transaction.dat";

// Pending transfers are stored without their status
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
struct PendingRecord {
    index: u32,
    sender: Address,
    receiver: Address,
    amount: u64,
}

impl From<&Transaction> for PendingRecord {
    fn from(tx: &Transaction) -> Self {
        PendingRecord {
            index: tx.get_index(),
            sender: *tx.get_sender(),
            receiver: *tx.get_receiver(),
            amount: tx.get_amount(),
        }
    }
}

impl From<PendingRecord> for Transaction {
    fn from(record: PendingRecord) -> Self {
        Transaction::new(
            record.index,
            record.sender,
            record.receiver,
            record.amount,
            TransactionStatus::Pending,
        )
    }
}

/// Locations of the chain and pool snapshot files
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    chain_path: PathBuf,
    pool_path: PathBuf,
}

impl SnapshotStore {
    /// Default file names inside `data_dir`
    pub fn new(data_dir: &Path) -> SnapshotStore {
        SnapshotStore {
            chain_path: data_dir.join(CHAIN_FILE),
            pool_path: data_dir.join(POOL_FILE),
        }
    }

    pub fn from_settings(settings: &Settings) -> SnapshotStore {
        SnapshotStore {
            chain_path: settings.chain_path(),
            pool_path: settings.pool_path(),
        }
    }

    pub fn chain_path(&self) -> &Path {
        &self.chain_path
    }

    pub fn pool_path(&self) -> &Path {
        &self.pool_path
    }

    pub fn chain_exists(&self) -> bool {
        self.chain_path.exists()
    }

    /// Restore the chain, or start a fresh one if no snapshot exists yet
    pub fn load_chain(&self, initial_difficulty: u32) -> Result<Blockchain> {
        if !self.chain_exists() {
            warn!(
                "No chain snapshot at {}, starting a new chain",
                self.chain_path.display()
            );
            return Ok(Blockchain::init_with_difficulty(initial_difficulty));
        }
        let bytes = fs::read(&self.chain_path).map_err(|e| {
            BlockchainError::Io(format!("Failed to read {}: {e}", self.chain_path.display()))
        })?;
        let (difficulty, blocks): (u32, Vec<Block>) = deserialize(&bytes)?;
        let chain = Blockchain::from_parts(difficulty, blocks)?;
        info!(
            "Loaded {} blocks at difficulty {}",
            chain.len(),
            chain.get_difficulty()
        );
        Ok(chain)
    }

    pub fn save_chain(&self, chain: &Blockchain) -> Result<()> {
        let bytes = serialize(&(chain.get_difficulty(), chain.get_blocks()))?;
        write_atomically(&self.chain_path, &bytes)?;
        info!(
            "Chain snapshot written: {} blocks to {}",
            chain.len(),
            self.chain_path.display()
        );
        Ok(())
    }

    /// Raw bytes of the current chain snapshot, if there is one
    pub fn backup_chain(&self) -> Result<Option<Vec<u8>>> {
        if !self.chain_exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&self.chain_path)?))
    }

    /// Put back what `backup_chain` returned
    pub fn restore_chain(&self, backup: Option<Vec<u8>>) -> Result<()> {
        match backup {
            Some(bytes) => write_atomically(&self.chain_path, &bytes),
            None => {
                if self.chain_exists() {
                    fs::remove_file(&self.chain_path)?;
                }
                Ok(())
            }
        }
    }

    /// Pending transfers in queue order; an absent file is an empty pool
    pub fn load_pool(&self) -> Result<Vec<Transaction>> {
        if !self.pool_path.exists() {
            return Ok(vec![]);
        }
        let bytes = fs::read(&self.pool_path).map_err(|e| {
            BlockchainError::Io(format!("Failed to read {}: {e}", self.pool_path.display()))
        })?;
        let records: Vec<PendingRecord> = deserialize(&bytes)?;
        Ok(records.into_iter().map(Transaction::from).collect())
    }

    pub fn save_pool<'a>(&self, transactions: impl Iterator<Item = &'a Transaction>) -> Result<()> {
        let records: Vec<PendingRecord> = transactions.map(PendingRecord::from).collect();
        let bytes = serialize(&records)?;
        write_atomically(&self.pool_path, &bytes)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)
        .map_err(|e| BlockchainError::Io(format!("Failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path).map_err(|e| {
        BlockchainError::Io(format!("Failed to replace {}: {e}", path.display()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pending(index: u32, amount: u64) -> Transaction {
        Transaction::pending(index, Address::derive("alice"), Address::derive("bob"), amount)
    }

    #[test]
    fn test_missing_chain_starts_fresh() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let chain = store.load_chain(1).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.is_valid());
        assert!(!store.chain_exists());
    }

    #[test]
    fn test_chain_survives_reload() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let mut chain = Blockchain::init();
        let settled = pending(0, 5).with_status(TransactionStatus::Settled);
        let mut block = chain.next_block(vec![settled]);
        block.mine(chain.get_difficulty());
        chain.append(Some(block));
        chain.retune_difficulty(100, 101);
        store.save_chain(&chain).unwrap();

        let restored = store.load_chain(1).unwrap();
        assert_eq!(restored, chain);
        assert_eq!(restored.get_difficulty(), 2);
        assert!(restored.is_valid());
    }

    #[test]
    fn test_truncated_chain_is_an_error() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save_chain(&Blockchain::init()).unwrap();
        let bytes = fs::read(store.chain_path()).unwrap();
        fs::write(store.chain_path(), &bytes[..bytes.len() - 3]).unwrap();
        assert!(matches!(
            store.load_chain(1),
            Err(BlockchainError::Serialization(_))
        ));
    }

    #[test]
    fn test_pool_round_trip_drops_status() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.load_pool().unwrap().is_empty());

        let txs = vec![pending(0, 10), pending(1, 20).with_status(TransactionStatus::Failed)];
        store.save_pool(txs.iter()).unwrap();
        let restored = store.load_pool().unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[1].get_amount(), 20);
        assert!(restored
            .iter()
            .all(|tx| tx.get_status() == TransactionStatus::Pending));
    }

    #[test]
    fn test_truncated_pool_is_not_empty_pool() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save_pool([pending(0, 10)].iter()).unwrap();
        let bytes = fs::read(store.pool_path()).unwrap();
        fs::write(store.pool_path(), &bytes[..bytes.len() - 1]).unwrap();
        assert!(store.load_pool().is_err());
    }

    #[test]
    fn test_backup_and_restore() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert_eq!(store.backup_chain().unwrap(), None);

        let chain = Blockchain::init();
        store.save_chain(&chain).unwrap();
        let backup = store.backup_chain().unwrap();
        assert!(backup.is_some());

        let mut longer = chain.clone();
        let mut block = longer.next_block(vec![]);
        block.mine(1);
        longer.append(Some(block));
        store.save_chain(&longer).unwrap();

        store.restore_chain(backup).unwrap();
        assert_eq!(store.load_chain(1).unwrap().len(), 1);

        store.restore_chain(None).unwrap();
        assert!(!store.chain_exists());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save_chain(&Blockchain::init()).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![CHAIN_FILE.to_string()]);
    }
}
