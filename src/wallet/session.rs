use crate::error::{BlockchainError, Result};
use crate::storage::AccountLedger;
use crate::wallet::Address;

/// The authenticated caller, threaded through pool and mining calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: String,
    address: Address,
}

impl Session {
    /// Resolve an identity to a registered account
    pub fn login<A: AccountLedger + ?Sized>(identity: &str, accounts: &A) -> Result<Session> {
        let address = Address::derive(identity);
        match accounts.lookup(&address)? {
            Some(account) => Ok(Session {
                identity: account.get_identity().to_string(),
                address,
            }),
            None => Err(BlockchainError::AccountNotFound(format!(
                "{identity} ({address})"
            ))),
        }
    }

    pub fn get_identity(&self) -> &str {
        self.identity.as_str()
    }

    pub fn get_address(&self) -> &Address {
        &self.address
    }

    /// Only the logged-in user may spend from their own address
    pub fn authorize_sender(&self, sender: &Address) -> Result<()> {
        if *sender != self.address {
            return Err(BlockchainError::Unauthorized(format!(
                "{} cannot send from {sender}",
                self.identity
            )));
        }
        Ok(())
    }
}
