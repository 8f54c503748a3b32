//! Configuration management
//!
//! Built-in defaults, overridden by an optional `workchain.toml` and then by
//! `WORKCHAIN_*` environment variables.

pub mod settings;

pub use settings::{Config, Settings, CONFIG_FILE, GLOBAL_CONFIG};
