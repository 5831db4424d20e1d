//! Signing client used to deploy and drive contract bindings

use std::sync::Arc;

use contract_core::{ContractConfig, Error, Result};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, JsonRpcClient, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, BlockNumber, TransactionReceipt, TxHash, U256, U64};
use tracing::{debug, info};

use crate::currency::gwei_to_wei;
use crate::options::{CallOpts, TransactOpts};
use crate::provider::{self, resolve_chain_id};

/// Middleware stack that signs transactions with a local key
pub type SignerClient<P = Http> = SignerMiddleware<Provider<P>, LocalWallet>;

/// Ethereum client bound to a single signing account
#[derive(Debug, Clone)]
pub struct EthereumClient<P = Http> {
    backend: Arc<SignerClient<P>>,
    chain_id: u64,
}

impl EthereumClient<Http> {
    /// Connect to the configured node with the configured account
    pub async fn connect(config: &ContractConfig) -> Result<Self> {
        let provider = provider::connect(&(&config.network).into())?;
        let key = config
            .account
            .private_key
            .as_deref()
            .ok_or_else(|| Error::config("No private key configured"))?;

        Self::new(provider, parse_wallet(key)?, config.network.chain_id).await
    }
}

impl<P: JsonRpcClient + 'static> EthereumClient<P> {
    /// Wrap a provider and a wallet, binding the wallet to the node's chain id
    pub async fn new(provider: Provider<P>, wallet: LocalWallet, expected_chain_id: Option<u64>) -> Result<Self> {
        let chain_id = resolve_chain_id(&provider, expected_chain_id).await?;
        let wallet = wallet.with_chain_id(chain_id);
        info!(address = ?wallet.address(), chain_id, "Created signing client");

        Ok(Self {
            backend: Arc::new(SignerMiddleware::new(provider, wallet)),
            chain_id,
        })
    }

    /// Middleware handed to contract bindings
    pub fn backend(&self) -> Arc<SignerClient<P>> {
        Arc::clone(&self.backend)
    }

    /// Address of the signing account
    pub fn address(&self) -> Address {
        self.backend.address()
    }

    /// Chain id transactions are signed for
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Current balance of the signing account in wei
    pub async fn balance(&self) -> Result<U256> {
        self.backend
            .get_balance(self.address(), None)
            .await
            .map_err(|e| Error::chain(format!("Failed to get balance of {:?}: {}", self.address(), e)))
    }

    /// Transaction options pinned to the account's next pending nonce
    pub async fn new_transact_opts(&self, gas_limit: u64, gas_price: U256, value_gwei: &str) -> Result<TransactOpts> {
        let value = gwei_to_wei(value_gwei)?;
        let nonce = self
            .backend
            .get_transaction_count(self.address(), Some(BlockNumber::Pending.into()))
            .await
            .map_err(|e| Error::chain(format!("Failed to get pending nonce: {}", e)))?;

        debug!(%nonce, gas_limit, %gas_price, %value, "Built transaction options");
        Ok(TransactOpts {
            from: Some(self.address()),
            nonce: Some(nonce),
            gas_limit: Some(gas_limit.into()),
            gas_price: Some(gas_price),
            value,
        })
    }

    /// Call options for reads made on behalf of this account
    pub fn new_call_opts(&self) -> CallOpts {
        CallOpts {
            from: Some(self.address()),
            ..Default::default()
        }
    }

    /// Wait until the transaction is mined and check that it succeeded
    pub async fn wait_mined(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
        let receipt = PendingTransaction::new(tx_hash, self.backend.provider())
            .await
            .map_err(|e| Error::chain(format!("Failed waiting for transaction {:?}: {}", tx_hash, e)))?
            .ok_or_else(|| Error::chain(format!("Transaction {:?} was dropped from the mempool", tx_hash)))?;

        if receipt.status == Some(U64::zero()) {
            return Err(Error::reverted(format!(
                "transaction {:?} failed in block {:?}",
                tx_hash, receipt.block_number
            )));
        }

        debug!(?tx_hash, block = ?receipt.block_number, gas_used = ?receipt.gas_used, "Transaction mined");
        Ok(receipt)
    }
}

/// Parse a hex encoded private key, with or without `0x`
pub fn parse_wallet(private_key: &str) -> Result<LocalWallet> {
    private_key
        .parse::<LocalWallet>()
        .map_err(|e| Error::parse(format!("Invalid private key: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;

    // First dev account of anvil/hardhat.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    async fn mocked_client() -> (EthereumClient<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        mock.push(U256::from(31337u64)).unwrap();
        let client = EthereumClient::new(provider, parse_wallet(DEV_KEY).unwrap(), None)
            .await
            .unwrap();
        (client, mock)
    }

    #[test]
    fn test_parse_wallet() {
        let wallet = parse_wallet(DEV_KEY).unwrap();
        assert_eq!(wallet.address(), DEV_ADDRESS.parse::<Address>().unwrap());

        let wallet = parse_wallet(DEV_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(wallet.address(), DEV_ADDRESS.parse::<Address>().unwrap());

        assert!(matches!(parse_wallet("0xdeadbeef"), Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_client_binds_wallet_to_node_chain() {
        let (client, _mock) = mocked_client().await;
        assert_eq!(client.chain_id(), 31337);
        assert_eq!(client.address(), DEV_ADDRESS.parse::<Address>().unwrap());
        assert_eq!(client.backend().signer().chain_id(), 31337);
    }

    #[tokio::test]
    async fn test_new_transact_opts() {
        let (client, mock) = mocked_client().await;
        mock.push(U256::from(4u64)).unwrap();

        let gas_price = gwei_to_wei("39.576").unwrap();
        let opts = client.new_transact_opts(1_600_000, gas_price, "0").await.unwrap();

        assert_eq!(opts.from, Some(client.address()));
        assert_eq!(opts.nonce, Some(U256::from(4u64)));
        assert_eq!(opts.gas_limit, Some(U256::from(1_600_000u64)));
        assert_eq!(opts.gas_price, Some(gas_price));
        assert_eq!(opts.value, U256::zero());
    }

    #[tokio::test]
    async fn test_new_transact_opts_rejects_bad_value() {
        let (client, _mock) = mocked_client().await;
        let result = client.new_transact_opts(21_000, U256::one(), "one").await;
        assert!(matches!(result, Err(Error::Parse(_))));

        let result = client.new_transact_opts(21_000, U256::one(), "-1").await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_new_call_opts() {
        let (client, _mock) = mocked_client().await;
        let opts = client.new_call_opts();
        assert_eq!(opts.from, Some(client.address()));
        assert!(!opts.pending);
        assert_eq!(opts.block_id(), None);
    }
}
