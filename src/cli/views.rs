// Printable views of chain data, shared by text and JSON output
use crate::core::{Block, Transaction, TransactionStatus};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub index: u32,
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    pub status: TransactionStatus,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        TransactionView {
            index: tx.get_index(),
            sender: tx.get_sender().to_string(),
            receiver: tx.get_receiver().to_string(),
            amount: tx.get_amount(),
            status: tx.get_status(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    pub index: u32,
    pub timestamp: String,
    pub nonce: u64,
    pub previous_hash: String,
    pub hash: String,
    pub transactions: Vec<TransactionView>,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        BlockView {
            index: block.get_index(),
            timestamp: block.get_timestamp_str(),
            nonce: block.get_nonce(),
            previous_hash: block.get_previous_hash().to_hex(),
            hash: block.get_hash().to_hex(),
            transactions: block.get_transactions().iter().map(TransactionView::from).collect(),
        }
    }
}

impl fmt::Display for BlockView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block {}", self.index)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Pre block hash: {}", self.previous_hash)?;
        writeln!(f, "Cur block hash: {}", self.hash)?;
        for tx in &self.transactions {
            writeln!(
                f,
                "- Transaction {}: {} -> {}, amount = {} [{}]",
                tx.index, tx.sender, tx.receiver, tx.amount, tx.status
            )?;
        }
        Ok(())
    }
}
