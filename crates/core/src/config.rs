//! Configuration for talking to a node with the contract bindings

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SMARTCONTRACT";

/// Main configuration for the contract tooling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Node connection settings
    pub network: NetworkConfig,
    /// Signing account
    pub account: AccountConfig,
    /// Defaults applied to every transaction
    pub transaction: TransactionConfig,
    /// Logging output
    pub logging: LoggingConfig,
}

/// Node connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP JSON-RPC endpoint
    pub rpc_url: String,
    /// Expected chain id; the node's own id is used when absent
    pub chain_id: Option<u64>,
    /// Polling interval for receipts and log filters, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: None,
            poll_interval_ms: 1000,
        }
    }
}

/// Signing account
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Hex encoded secp256k1 private key
    pub private_key: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Defaults applied to every transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas limit per transaction
    pub gas_limit: u64,
    /// Gas price in gwei, as a decimal string
    pub gas_price_gwei: String,
    /// Value sent along with each transaction in gwei, as a decimal string
    pub value_gwei: String,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_limit: 1_600_000,
            gas_price_gwei: "39.576".to_string(),
            value_gwei: "0".to_string(),
        }
    }
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by RUST_LOG)
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing RPC URL")]
    MissingRpcUrl,
    #[error("Invalid RPC URL: '{url}'")]
    InvalidRpcUrl { url: String },
    #[error("Invalid gas limit: must be greater than 0")]
    InvalidGasLimit,
    #[error("Invalid poll interval: must be greater than 0")]
    InvalidPollInterval,
    #[error("Invalid {field} amount: '{value}'")]
    InvalidAmount { field: String, value: String },
    #[error("Invalid private key: expected 32 hex encoded bytes")]
    InvalidPrivateKey,
}

impl ContractConfig {
    /// Load configuration from a `.toml` or `.json` file and apply environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read configuration file {}: {}", path.display(), e)))?;

        let mut config: Self = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| Error::config(format!("Failed to parse TOML configuration file {}: {}", path.display(), e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Failed to parse JSON configuration file {}: {}", path.display(), e)))?,
            _ => return Err(Error::config("Unsupported configuration file format. Supported formats: .toml, .json")),
        };

        debug!(path = %path.display(), "Loaded configuration file");
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Build the default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Apply `SMARTCONTRACT_*` environment variable overrides
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        let var = |name: &str| env::var(format!("{}_{}", ENV_PREFIX, name)).ok();

        if let Some(rpc_url) = var("RPC_URL") {
            self.network.rpc_url = rpc_url;
        }
        if let Some(chain_id) = var("CHAIN_ID") {
            let chain_id = chain_id
                .parse()
                .map_err(|_| Error::config(format!("Invalid {}_CHAIN_ID value: {}", ENV_PREFIX, chain_id)))?;
            self.network.chain_id = Some(chain_id);
        }
        if let Some(interval) = var("POLL_INTERVAL_MS") {
            self.network.poll_interval_ms = interval
                .parse()
                .map_err(|_| Error::config(format!("Invalid {}_POLL_INTERVAL_MS value: {}", ENV_PREFIX, interval)))?;
        }
        if let Some(private_key) = var("PRIVATE_KEY") {
            self.account.private_key = Some(private_key);
        }
        if let Some(gas_limit) = var("GAS_LIMIT") {
            self.transaction.gas_limit = gas_limit
                .parse()
                .map_err(|_| Error::config(format!("Invalid {}_GAS_LIMIT value: {}", ENV_PREFIX, gas_limit)))?;
        }
        if let Some(gas_price) = var("GAS_PRICE_GWEI") {
            self.transaction.gas_price_gwei = gas_price;
        }
        if let Some(value) = var("VALUE_GWEI") {
            self.transaction.value_gwei = value;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let url = &self.network.rpc_url;
        if url.is_empty() {
            return Err(ConfigError::MissingRpcUrl);
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidRpcUrl { url: url.clone() });
        }

        if self.network.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        if self.transaction.gas_limit == 0 {
            return Err(ConfigError::InvalidGasLimit);
        }

        for (field, value) in [
            ("gas price", &self.transaction.gas_price_gwei),
            ("value", &self.transaction.value_gwei),
        ] {
            if !is_decimal(value) {
                return Err(ConfigError::InvalidAmount {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }

        if let Some(key) = &self.account.private_key {
            let key = key.strip_prefix("0x").unwrap_or(key);
            if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidPrivateKey);
            }
        }

        Ok(())
    }
}

fn is_decimal(value: &str) -> bool {
    let mut parts = value.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next().unwrap_or_default();
    !(whole.is_empty() && frac.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests;
