//! Bindings for the `Basic` contract.
//!
//! `Basic` stores a `string => uint256` mapping (`Items`), exposes a constant
//! `Version` string and emits `ItemSet` whenever an item is written. Every
//! method here marshals its arguments through the ABI and forwards to the
//! generic [`ethers::contract::Contract`]; nothing is retried or cached.

mod events;


use std::ops::Deref;
use std::sync::Arc;

use contract_core::{Error, Result};
use ethers::abi::{Abi, AbiError};
use ethers::contract::{Contract, ContractError, EthCall, EthDisplay, EthEvent};
use ethers::providers::{FilterKind, Middleware};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockNumber, Bytes, Filter, TransactionRequest, TxHash, U256};
use ethers::utils::get_contract_address;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::options::{CallOpts, FilterOpts, TransactOpts, WatchOpts};
use crate::subscription::{watch_logs, Subscription};

pub use events::{parse_item_set, BasicItemSet, BasicItemSetIterator, ItemSetFilter};

/// ABI of the `Basic` contract
pub const BASIC_ABI: &str = include_str!("../../contracts/basic/Basic.abi");

/// Deployment bytecode of the `Basic` contract, hex encoded
pub const BASIC_BIN: &str = include_str!("../../contracts/basic/Basic.bin");

/// ABI and bytecode of a compiled contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractMetadata {
    pub abi: &'static str,
    pub bin: &'static str,
}

impl ContractMetadata {
    /// Parse the ABI
    pub fn abi(&self) -> Result<Abi> {
        serde_json::from_str(self.abi).map_err(|e| Error::abi(format!("Invalid contract ABI: {}", e)))
    }

    /// Decode the deployment bytecode
    pub fn bytecode(&self) -> Result<Bytes> {
        let bin = self.bin.trim();
        hex::decode(bin.strip_prefix("0x").unwrap_or(bin))
            .map(Bytes::from)
            .map_err(|e| Error::abi(format!("Invalid contract bytecode: {}", e)))
    }
}

/// Metadata of the `Basic` contract
pub const BASIC_METADATA: ContractMetadata = ContractMetadata {
    abi: BASIC_ABI,
    bin: BASIC_BIN,
};

/// Input of `Items(string)`
#[derive(Clone, Debug, Default, Eq, PartialEq, EthCall, EthDisplay)]
#[ethcall(name = "Items", abi = "Items(string)")]
pub struct ItemsCall(pub String);

/// Input of `SetItem(string,uint256)`
#[derive(Clone, Debug, Default, Eq, PartialEq, EthCall, EthDisplay)]
#[ethcall(name = "SetItem", abi = "SetItem(string,uint256)")]
pub struct SetItemCall {
    pub key: String,
    pub value: U256,
}

/// Input of `Version()`
#[derive(Clone, Debug, Default, Eq, PartialEq, EthCall, EthDisplay)]
#[ethcall(name = "Version", abi = "Version()")]
pub struct VersionCall;

fn abi_err(err: AbiError) -> Error {
    Error::abi(err.to_string())
}

fn contract_err<M: Middleware>(err: ContractError<M>) -> Error {
    Error::contract(err.to_string())
}

fn bind<M: Middleware>(address: Address, client: Arc<M>) -> Result<Contract<M>> {
    let abi = BASIC_METADATA.abi()?;
    Ok(Contract::new(address, abi, client))
}

/// Deploy a new `Basic` contract and bind to it.
///
/// Returns as soon as the creation transaction is accepted by the node; the
/// contract address is derived from the sender and nonce. Use
/// [`EthereumClient::wait_mined`](crate::EthereumClient::wait_mined) before calling it.
pub async fn deploy_basic<M: Middleware + 'static>(
    opts: &TransactOpts,
    client: Arc<M>,
) -> Result<(Address, TxHash, Basic<M>)> {
    let abi = BASIC_METADATA.abi()?;
    let bytecode = BASIC_METADATA.bytecode()?;
    let data = match abi.constructor() {
        Some(constructor) => constructor
            .encode_input(bytecode.to_vec(), &[])
            .map_err(|e| Error::abi(format!("Failed to encode constructor: {}", e)))?,
        None => bytecode.to_vec(),
    };

    let from = opts
        .from
        .or_else(|| client.default_sender())
        .ok_or_else(|| Error::contract("No sender available to deploy Basic"))?;
    let nonce = match opts.nonce {
        Some(nonce) => nonce,
        None => client
            .get_transaction_count(from, Some(BlockNumber::Pending.into()))
            .await
            .map_err(|e| Error::chain(format!("Failed to get pending nonce for {:?}: {}", from, e)))?,
    };

    let mut tx: TypedTransaction = TransactionRequest::new().data(data).into();
    opts.apply(&mut tx);
    tx.set_from(from);
    tx.set_nonce(nonce);

    let tx_hash = *client
        .send_transaction(tx, None)
        .await
        .map_err(|e| Error::chain(format!("Failed to send Basic deployment: {}", e)))?;
    let address = get_contract_address(from, nonce);

    info!(?address, ?tx_hash, "Deployed Basic");
    Ok((address, tx_hash, Basic::new(address, client)?))
}

/// Read-only binding to a deployed `Basic` contract
#[derive(Debug)]
pub struct BasicCaller<M> {
    contract: Contract<M>,
}

impl<M> Clone for BasicCaller<M> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
        }
    }
}

impl<M: Middleware> BasicCaller<M> {
    pub fn new(address: Address, client: Arc<M>) -> Result<Self> {
        Ok(Self {
            contract: bind(address, client)?,
        })
    }

    /// Calls `Items(string)`
    pub async fn items(&self, opts: &CallOpts, key: impl Into<String>) -> Result<U256> {
        let mut call = self.contract.method::<_, U256>("Items", key.into()).map_err(abi_err)?;
        opts.apply(&mut call.tx);
        if let Some(block) = opts.block_id() {
            call = call.block(block);
        }
        call.call().await.map_err(contract_err)
    }

    /// Calls `Version()`
    pub async fn version(&self, opts: &CallOpts) -> Result<String> {
        let mut call = self.contract.method::<_, String>("Version", ()).map_err(abi_err)?;
        opts.apply(&mut call.tx);
        if let Some(block) = opts.block_id() {
            call = call.block(block);
        }
        call.call().await.map_err(contract_err)
    }

    pub fn session(&self, call_opts: CallOpts) -> BasicCallerSession<M> {
        BasicCallerSession {
            contract: self.clone(),
            call_opts,
        }
    }
}

/// Write-only binding to a deployed `Basic` contract
#[derive(Debug)]
pub struct BasicTransactor<M> {
    contract: Contract<M>,
}

impl<M> Clone for BasicTransactor<M> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
        }
    }
}

impl<M: Middleware> BasicTransactor<M> {
    pub fn new(address: Address, client: Arc<M>) -> Result<Self> {
        Ok(Self {
            contract: bind(address, client)?,
        })
    }

    /// Sends `SetItem(string,uint256)` and returns the transaction hash without waiting for it to be mined
    pub async fn set_item(&self, opts: &TransactOpts, key: impl Into<String>, value: U256) -> Result<TxHash> {
        let key = key.into();
        let mut call = self
            .contract
            .method::<_, ()>("SetItem", (key.clone(), value))
            .map_err(abi_err)?;
        opts.apply(&mut call.tx);

        let pending = call.send().await.map_err(contract_err)?;
        let tx_hash = *pending;
        debug!(%key, %value, ?tx_hash, "Sent SetItem");
        Ok(tx_hash)
    }

    pub fn session(&self, transact_opts: TransactOpts) -> BasicTransactorSession<M> {
        BasicTransactorSession {
            contract: self.clone(),
            transact_opts,
        }
    }
}

/// Log filtering binding to a deployed `Basic` contract
#[derive(Debug)]
pub struct BasicFilterer<M> {
    address: Address,
    client: Arc<M>,
}

impl<M> Clone for BasicFilterer<M> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            client: Arc::clone(&self.client),
        }
    }
}

impl<M: Middleware + 'static> BasicFilterer<M> {
    pub fn new(address: Address, client: Arc<M>) -> Result<Self> {
        BASIC_METADATA.abi()?;
        Ok(Self { address, client })
    }

    fn item_set_filter(&self) -> Filter {
        Filter::new()
            .address(self.address)
            .topic0(ItemSetFilter::signature())
    }

    /// Query past `ItemSet` events in a block range
    pub async fn filter_item_set(&self, opts: &FilterOpts) -> Result<BasicItemSetIterator> {
        let mut filter = self.item_set_filter().from_block(opts.start);
        if let Some(end) = opts.end {
            filter = filter.to_block(end);
        }

        let logs = self
            .client
            .get_logs(&filter)
            .await
            .map_err(|e| Error::chain(format!("Failed to fetch ItemSet logs: {}", e)))?;

        debug!(from = opts.start, to = ?opts.end, count = logs.len(), "Fetched ItemSet logs");
        Ok(BasicItemSetIterator::new(logs))
    }

    /// Deliver `ItemSet` events into `sink` as they are mined.
    ///
    /// The node-side filter is installed before this returns.
    pub async fn watch_item_set(&self, opts: &WatchOpts, sink: mpsc::Sender<BasicItemSet>) -> Result<Subscription> {
        let mut filter = self.item_set_filter();
        if let Some(start) = opts.start {
            filter = filter.from_block(start);
        }

        let filter_id = self
            .client
            .new_filter(FilterKind::Logs(&filter))
            .await
            .map_err(|e| Error::chain(format!("Failed to install ItemSet filter: {}", e)))?;

        let client = Arc::clone(&self.client);
        let poll_interval = opts.poll_interval;
        info!(address = ?self.address, %filter_id, "Watching ItemSet events");

        Ok(Subscription::spawn(move |cancel| {
            watch_logs(client, filter_id, poll_interval, parse_item_set, sink, cancel)
        }))
    }

    /// Decode a raw log into an `ItemSet` event
    pub fn parse_item_set(&self, log: ethers::types::Log) -> Result<BasicItemSet> {
        parse_item_set(log)
    }
}

/// Binding to a deployed `Basic` contract.
///
/// Dereferences to the generic contract for by-name calls.
#[derive(Debug)]
pub struct Basic<M> {
    address: Address,
    caller: BasicCaller<M>,
    transactor: BasicTransactor<M>,
    filterer: BasicFilterer<M>,
}

impl<M> Clone for Basic<M> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            caller: self.caller.clone(),
            transactor: self.transactor.clone(),
            filterer: self.filterer.clone(),
        }
    }
}

impl<M> Deref for Basic<M> {
    type Target = Contract<M>;

    fn deref(&self) -> &Self::Target {
        &self.caller.contract
    }
}

impl<M: Middleware + 'static> Basic<M> {
    /// Bind to a `Basic` contract deployed at `address`
    pub fn new(address: Address, client: Arc<M>) -> Result<Self> {
        let contract = bind(address, Arc::clone(&client))?;

        Ok(Self {
            address,
            caller: BasicCaller {
                contract: contract.clone(),
            },
            transactor: BasicTransactor { contract },
            filterer: BasicFilterer { address, client },
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn caller(&self) -> &BasicCaller<M> {
        &self.caller
    }

    pub fn transactor(&self) -> &BasicTransactor<M> {
        &self.transactor
    }

    pub fn filterer(&self) -> &BasicFilterer<M> {
        &self.filterer
    }

    /// Calls `Items(string)`
    pub async fn items(&self, opts: &CallOpts, key: impl Into<String>) -> Result<U256> {
        self.caller.items(opts, key).await
    }

    /// Calls `Version()`
    pub async fn version(&self, opts: &CallOpts) -> Result<String> {
        self.caller.version(opts).await
    }

    /// Sends `SetItem(string,uint256)`
    pub async fn set_item(&self, opts: &TransactOpts, key: impl Into<String>, value: U256) -> Result<TxHash> {
        self.transactor.set_item(opts, key, value).await
    }

    /// Query past `ItemSet` events
    pub async fn filter_item_set(&self, opts: &FilterOpts) -> Result<BasicItemSetIterator> {
        self.filterer.filter_item_set(opts).await
    }

    /// Subscribe to `ItemSet` events
    pub async fn watch_item_set(&self, opts: &WatchOpts, sink: mpsc::Sender<BasicItemSet>) -> Result<Subscription> {
        self.filterer.watch_item_set(opts, sink).await
    }

    /// Decode a raw log into an `ItemSet` event
    pub fn parse_item_set(&self, log: ethers::types::Log) -> Result<BasicItemSet> {
        parse_item_set(log)
    }

    /// Pair the binding with fixed call and transact options
    pub fn session(&self, call_opts: CallOpts, transact_opts: TransactOpts) -> BasicSession<M> {
        BasicSession {
            contract: self.clone(),
            call_opts,
            transact_opts,
        }
    }
}

/// `Basic` binding with pre-set call and transact options
#[derive(Debug, Clone)]
pub struct BasicSession<M> {
    pub contract: Basic<M>,
    pub call_opts: CallOpts,
    pub transact_opts: TransactOpts,
}

impl<M: Middleware + 'static> BasicSession<M> {
    pub async fn items(&self, key: impl Into<String>) -> Result<U256> {
        self.contract.items(&self.call_opts, key).await
    }

    pub async fn version(&self) -> Result<String> {
        self.contract.version(&self.call_opts).await
    }

    pub async fn set_item(&self, key: impl Into<String>, value: U256) -> Result<TxHash> {
        self.contract.set_item(&self.transact_opts, key, value).await
    }
}

/// Read-only `Basic` binding with pre-set call options
#[derive(Debug, Clone)]
pub struct BasicCallerSession<M> {
    pub contract: BasicCaller<M>,
    pub call_opts: CallOpts,
}

impl<M: Middleware> BasicCallerSession<M> {
    pub async fn items(&self, key: impl Into<String>) -> Result<U256> {
        self.contract.items(&self.call_opts, key).await
    }

    pub async fn version(&self) -> Result<String> {
        self.contract.version(&self.call_opts).await
    }
}

/// Write-only `Basic` binding with pre-set transact options
#[derive(Debug, Clone)]
pub struct BasicTransactorSession<M> {
    pub contract: BasicTransactor<M>,
    pub transact_opts: TransactOpts,
}

impl<M: Middleware> BasicTransactorSession<M> {
    pub async fn set_item(&self, key: impl Into<String>, value: U256) -> Result<TxHash> {
        self.contract.set_item(&self.transact_opts, key, value).await
    }
}
