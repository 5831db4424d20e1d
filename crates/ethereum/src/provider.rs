use std::time::Duration;

use contract_core::config::NetworkConfig;
use contract_core::{Error, Result};
use ethers::providers::{Http, Middleware, Provider};
use tracing::{debug, info};

/// Configuration for the Ethereum provider
#[derive(Debug, Clone)]
pub struct EthereumProviderConfig {
    /// RPC URL
    pub rpc_url: String,

    /// Polling interval for pending transactions and filters, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for EthereumProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            poll_interval_ms: 1000,
        }
    }
}

impl From<&NetworkConfig> for EthereumProviderConfig {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            rpc_url: network.rpc_url.clone(),
            poll_interval_ms: network.poll_interval_ms,
        }
    }
}

/// Build an HTTP provider for the configured node
pub fn connect(config: &EthereumProviderConfig) -> Result<Provider<Http>> {
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| Error::chain(format!("Failed to create Ethereum HTTP provider for {}: {}", config.rpc_url, e)))?
        .interval(Duration::from_millis(config.poll_interval_ms));

    debug!(rpc_url = %config.rpc_url, poll_interval_ms = config.poll_interval_ms, "Created HTTP provider");
    Ok(provider)
}

/// Ask the node for its chain id, checking it against an expected value if one is given
pub async fn resolve_chain_id<M: Middleware>(provider: &M, expected: Option<u64>) -> Result<u64> {
    let chain_id = provider
        .get_chainid()
        .await
        .map_err(|e| Error::chain(format!("Failed to get chain id: {}", e)))?
        .as_u64();

    if let Some(expected) = expected {
        if expected != chain_id {
            return Err(Error::config(format!(
                "Configured chain id {} does not match node chain id {}",
                expected, chain_id
            )));
        }
    }

    info!(chain_id, "Connected to Ethereum node");
    Ok(chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    #[test]
    fn test_connect_sets_poll_interval() {
        let config = EthereumProviderConfig {
            poll_interval_ms: 25,
            ..Default::default()
        };
        let provider = connect(&config).unwrap();
        assert_eq!(provider.get_interval(), Duration::from_millis(25));
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let config = EthereumProviderConfig {
            rpc_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(connect(&config), Err(Error::Chain(_))));
    }

    #[tokio::test]
    async fn test_resolve_chain_id_checks_expected() {
        let (provider, mock) = Provider::mocked();
        mock.push(U256::from(1337u64)).unwrap();
        assert_eq!(resolve_chain_id(&provider, Some(1337)).await.unwrap(), 1337);

        mock.push(U256::from(1u64)).unwrap();
        let result = resolve_chain_id(&provider, Some(1337)).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
