//! Command-line interface
//!
//! Argument parsing and the printable views of chain data.

pub mod commands;
pub mod views;

pub use commands::{Command, Opt};
pub use views::{BlockView, TransactionView};
