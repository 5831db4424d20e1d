//! Shared error, configuration and logging types for the contract crates

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigError, ContractConfig};
pub use error::{Error, Result};
