use crate::error::{BlockchainError, Result};
use data_encoding::HEXLOWER;
use std::fmt;
use std::str::FromStr;

/// Addresses keep the first half of the SHA-256 of the identity string
pub const ADDRESS_SIZE: usize = 16;

/// Wallet identifier derived one-way from an identity string
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, bincode::Encode, bincode::Decode)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub fn derive(identity: &str) -> Address {
        let digest = crate::utils::sha256_digest(identity.as_bytes());
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&digest[..ADDRESS_SIZE]);
        Address(bytes)
    }

    pub fn from_bytes(bytes: [u8; ADDRESS_SIZE]) -> Address {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn from_hex(hex: &str) -> Result<Address> {
        let decoded = HEXLOWER
            .decode(hex.trim().to_ascii_lowercase().as_bytes())
            .map_err(|e| BlockchainError::InvalidAddress(format!("{hex}: {e}")))?;
        let bytes: [u8; ADDRESS_SIZE] = decoded.try_into().map_err(|v: Vec<u8>| {
            BlockchainError::InvalidAddress(format!(
                "{hex}: expected {ADDRESS_SIZE} bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", HEXLOWER.encode(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self> {
        Address::from_hex(s)
    }
}

/// A registered identity and its balance
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Account {
    address: Address,
    identity: String,
    balance: i64,
}

impl Account {
    pub fn new(identity: &str) -> Account {
        Account {
            address: Address::derive(identity),
            identity: identity.to_string(),
            balance: 0,
        }
    }

    pub fn with_balance(identity: &str, balance: i64) -> Account {
        Account {
            balance,
            ..Account::new(identity)
        }
    }

    pub fn get_address(&self) -> Address {
        self.address
    }

    pub fn get_identity(&self) -> &str {
        self.identity.as_str()
    }

    pub fn get_balance(&self) -> i64 {
        self.balance
    }

    pub fn apply_delta(&mut self, delta: i64) -> Result<()> {
        self.balance = self.balance.checked_add(delta).ok_or_else(|| {
            BlockchainError::Settlement(format!("balance overflow for {}", self.address))
        })?;
        Ok(())
    }
}
