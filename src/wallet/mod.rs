//! Addresses, accounts and sessions
//!
//! Addresses are digests of identity strings. There are no keys: a session
//! proves nothing beyond "this identity is registered locally".

#[allow(clippy::module_inception)]
pub mod wallet;
pub mod session;

pub use session::Session;
pub use wallet::{Account, Address, ADDRESS_SIZE};
