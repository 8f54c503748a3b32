use crate::core::{DifficultyAdjustment, BLOCK_CAPACITY, GRANT_AMOUNT, TRANSACTION_FEE};
use crate::error::{BlockchainError, Result};
use crate::storage::{CHAIN_FILE, POOL_FILE};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

/// Optional file read from the working directory
pub const CONFIG_FILE: &str = "workchain.toml";

const DATA_DIR_KEY: &str = "WORKCHAIN_DATA_DIR";
const FEE_KEY: &str = "WORKCHAIN_FEE";
const BLOCK_CAPACITY_KEY: &str = "WORKCHAIN_BLOCK_CAPACITY";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ACCOUNTS_DB: &str = "accounts";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub chain_file: String,
    pub pool_file: String,
    pub accounts_db: String,
    pub transaction_fee: u64,
    pub block_capacity: usize,
    pub initial_difficulty: u32,
    pub grant_amount: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            chain_file: CHAIN_FILE.to_string(),
            pool_file: POOL_FILE.to_string(),
            accounts_db: DEFAULT_ACCOUNTS_DB.to_string(),
            transaction_fee: TRANSACTION_FEE,
            block_capacity: BLOCK_CAPACITY,
            initial_difficulty: DifficultyAdjustment::get_initial_difficulty(),
            grant_amount: GRANT_AMOUNT,
        }
    }
}

impl Settings {
    /// Defaults, then `path` if it exists, then environment overrides
    pub fn load(path: &Path) -> Result<Settings> {
        let mut settings = if path.exists() {
            info!("Reading configuration from {}", path.display());
            Settings::from_toml_str(&fs::read_to_string(path)?)?
        } else {
            Settings::default()
        };
        settings.apply_overrides(|key| env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_str(contents: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply overrides from any key lookup; the process environment in practice
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_KEY) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(fee) = lookup(FEE_KEY) {
            self.transaction_fee = fee
                .trim()
                .parse()
                .map_err(|e| BlockchainError::Config(format!("{FEE_KEY}={fee}: {e}")))?;
        }
        if let Some(capacity) = lookup(BLOCK_CAPACITY_KEY) {
            self.block_capacity = capacity.trim().parse().map_err(|e| {
                BlockchainError::Config(format!("{BLOCK_CAPACITY_KEY}={capacity}: {e}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_capacity == 0 {
            return Err(BlockchainError::Config(
                "block_capacity must be at least 1".to_string(),
            ));
        }
        DifficultyAdjustment::validate_difficulty(self.initial_difficulty)
    }

    pub fn chain_path(&self) -> PathBuf {
        self.data_dir.join(&self.chain_file)
    }

    pub fn pool_path(&self) -> PathBuf {
        self.data_dir.join(&self.pool_file)
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join(&self.accounts_db)
    }
}

/// Process-wide settings behind a lock so the CLI can adjust them after load
pub struct Config {
    inner: RwLock<Settings>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let settings = Settings::load(Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
            warn!("Ignoring configuration: {e}");
            Settings::default()
        });
        Config::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Config {
        Config {
            inner: RwLock::new(settings),
        }
    }

    pub fn get_settings(&self) -> Settings {
        // settings stay usable even if a writer panicked
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.clone()
    }

    pub fn set_data_dir(&self, data_dir: PathBuf) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.data_dir = data_dir;
    }

    pub fn get_data_dir(&self) -> PathBuf {
        self.get_settings().data_dir
    }
}
