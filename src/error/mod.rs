//! Error handling for the ledger
//!
//! One error type for every fallible operation. Integrity problems found while
//! walking the chain are reported through `InvalidChain` and never leave the
//! chain half-modified.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// Account database errors
    Database(String),
    /// Snapshot encoding/decoding errors (includes truncated snapshots)
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Configuration errors
    Config(String),
    /// Address could not be parsed
    InvalidAddress(String),
    /// No account registered under this address
    AccountNotFound(String),
    /// Identity is already registered
    AccountExists(String),
    /// The session user is not allowed to perform this operation
    Unauthorized(String),
    /// Malformed transfer
    Transaction(String),
    /// Sender cannot cover amount plus fee
    InsufficientFunds { required: u64, available: i64 },
    /// Nothing pending in the pool
    EmptyPool,
    /// Selection dropped every candidate
    EmptyBatch,
    /// Hash mismatch found while validating the chain
    InvalidChain { index: u32, reason: String },
    /// Settlement could not be applied
    Settlement(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Database(msg) => write!(f, "Database error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            BlockchainError::AccountNotFound(addr) => write!(f, "Account not found: {addr}"),
            BlockchainError::AccountExists(name) => write!(f, "Account already exists: {name}"),
            BlockchainError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            BlockchainError::EmptyPool => write!(f, "No transactions to mine"),
            BlockchainError::EmptyBatch => {
                write!(f, "No affordable transactions left to mine")
            }
            BlockchainError::InvalidChain { index, reason } => {
                write!(f, "Invalid chain at block {index}: {reason}")
            }
            BlockchainError::Settlement(msg) => write!(f, "Settlement failed: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}
