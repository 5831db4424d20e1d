//! Conversions between ether denominations

use contract_core::{Error, Result};
use ethers::types::U256;
use ethers::utils::{format_units, parse_units, ParseUnits};

const GWEI_DECIMALS: usize = 9;
const ETHER_DECIMALS: usize = 18;

/// Convert a decimal gwei amount (e.g. `"39.576"`) to wei
pub fn gwei_to_wei(gwei: &str) -> Result<U256> {
    parse_amount(gwei, "gwei", GWEI_DECIMALS)
}

/// Convert a decimal ether amount to wei
pub fn eth_to_wei(eth: &str) -> Result<U256> {
    parse_amount(eth, "ether", ETHER_DECIMALS)
}

fn parse_amount(amount: &str, unit: &str, decimals: usize) -> Result<U256> {
    if let Some((_, fraction)) = amount.split_once('.') {
        if fraction.len() > decimals {
            return Err(Error::parse(format!(
                "Invalid {} amount '{}': more than {} decimals",
                unit, amount, decimals
            )));
        }
    }

    match parse_units(amount, unit).map_err(|e| Error::parse(format!("Invalid {} amount '{}': {}", unit, amount, e)))? {
        ParseUnits::U256(wei) => Ok(wei),
        ParseUnits::I256(_) => Err(Error::parse(format!("Invalid {} amount '{}': negative", unit, amount))),
    }
}

/// Render a wei amount in gwei
pub fn wei_to_gwei(wei: U256) -> Result<String> {
    format_units(wei, "gwei").map_err(|e| Error::parse(format!("Cannot format {} wei as gwei: {}", wei, e)))
}

/// Render a wei amount in ether
pub fn wei_to_eth(wei: U256) -> Result<String> {
    format_units(wei, "ether").map_err(|e| Error::parse(format!("Cannot format {} wei as ether: {}", wei, e)))
}
