//! Typed Ethereum bindings for the `Basic` contract
//!
//! The binding itself lives in [`basic`]; the remaining modules provide the
//! signing client, per-call options, log subscriptions and a local chain to run
//! it against.

pub mod basic;
pub mod client;
pub mod currency;
pub mod options;
pub mod provider;
pub mod simulated;
pub mod subscription;

#[cfg(feature = "codegen")]
pub mod codegen;

pub use basic::{
    deploy_basic, parse_item_set, Basic, BasicCaller, BasicCallerSession, BasicFilterer, BasicItemSet,
    BasicItemSetIterator, BasicSession, BasicTransactor, BasicTransactorSession, ContractMetadata, ItemSetFilter,
    ItemsCall, SetItemCall, VersionCall, BASIC_ABI, BASIC_BIN, BASIC_METADATA,
};
pub use client::{parse_wallet, EthereumClient, SignerClient};
pub use options::{CallOpts, FilterOpts, TransactOpts, WatchOpts};
pub use provider::EthereumProviderConfig;
pub use simulated::SimulatedBackend;
pub use subscription::Subscription;
