use crate::wallet::Address;
use serde::Serialize;
use std::fmt;

/// Lifecycle of a transfer. The tag is part of the block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, bincode::Encode, bincode::Decode)]
pub enum TransactionStatus {
    Pending,
    Settled,
    Failed,
}

impl TransactionStatus {
    pub fn tag(self) -> u32 {
        match self {
            TransactionStatus::Pending => 0,
            TransactionStatus::Settled => 1,
            TransactionStatus::Failed => 2,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "PENDING"),
            TransactionStatus::Settled => write!(f, "SETTLED"),
            TransactionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// A value transfer, owned either by the pool or by one block
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    index: u32,
    sender: Address,
    receiver: Address,
    amount: u64,
    status: TransactionStatus,
}

impl Transaction {
    pub fn new(
        index: u32,
        sender: Address,
        receiver: Address,
        amount: u64,
        status: TransactionStatus,
    ) -> Transaction {
        Transaction {
            index,
            sender,
            receiver,
            amount,
            status,
        }
    }

    pub fn pending(index: u32, sender: Address, receiver: Address, amount: u64) -> Transaction {
        Transaction::new(index, sender, receiver, amount, TransactionStatus::Pending)
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Transaction {
        self.status = status;
        self
    }

    pub fn get_index(&self) -> u32 {
        self.index
    }

    pub fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    pub fn get_sender(&self) -> &Address {
        &self.sender
    }

    pub fn get_receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_status(&self) -> TransactionStatus {
        self.status
    }

    /// What the sender must hold for this transfer to be accepted
    pub fn cost(&self, fee: u64) -> u64 {
        self.amount.saturating_add(fee)
    }

    #[cfg(test)]
    pub fn set_amount(&mut self, amount: u64) {
        self.amount = amount;
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction {}: {} -> {}, Amount: {} Status: {}",
            self.index, self.sender, self.receiver, self.amount, self.status
        )
    }
}
