//! Round trip of the `Basic` binding against a local anvil node.
//!
//! Needs an anvil binary (`ANVIL_BIN` or `PATH`); run with `cargo test -- --ignored`.

use std::time::Duration;

use contract_ethereum::currency::gwei_to_wei;
use contract_ethereum::{deploy_basic, Basic, EthereumClient, FilterOpts, SignerClient, SimulatedBackend, WatchOpts};
use ethers::types::U256;
use tokio::sync::mpsc;

const GAS_LIMIT: u64 = 1_600_000;
const GAS_PRICE_GWEI: &str = "39.576";

fn start_backend() -> SimulatedBackend {
    SimulatedBackend::new(1, true, 100).unwrap_or_else(|e| panic!("failed to start simulated backend: {}", e))
}

async fn deploy(client: &EthereumClient) -> Basic<SignerClient> {
    let gas_price = gwei_to_wei(GAS_PRICE_GWEI).unwrap();
    let opts = client.new_transact_opts(GAS_LIMIT, gas_price, "0").await.unwrap();

    let (address, tx_hash, basic) = deploy_basic(&opts, client.backend()).await.unwrap();
    let receipt = client.wait_mined(tx_hash).await.unwrap();
    assert_eq!(receipt.contract_address, Some(address));
    basic
}

async fn set_item(client: &EthereumClient, basic: &Basic<SignerClient>, key: &str, value: u64) {
    let gas_price = gwei_to_wei(GAS_PRICE_GWEI).unwrap();
    let opts = client.new_transact_opts(GAS_LIMIT, gas_price, "0").await.unwrap();

    let tx_hash = basic.set_item(&opts, key, U256::from(value)).await.unwrap();
    client.wait_mined(tx_hash).await.unwrap();
}

#[tokio::test]
#[ignore = "requires anvil"]
async fn test_deploy_version_and_items() {
    let backend = start_backend();
    let client = backend.client(0).await.unwrap();
    let basic = deploy(&client).await;

    let version = basic.version(&client.new_call_opts()).await.unwrap();
    assert_eq!(version, "1.1");

    set_item(&client, &basic, "bill", 100_000).await;

    let value = basic.items(&client.new_call_opts(), "bill").await.unwrap();
    assert_eq!(value, U256::from(100_000u64));

    let missing = basic.items(&client.new_call_opts(), "ann").await.unwrap();
    assert_eq!(missing, U256::zero());
}

#[tokio::test]
#[ignore = "requires anvil"]
async fn test_filter_item_set() {
    let backend = start_backend();
    let client = backend.client(0).await.unwrap();
    let basic = deploy(&client).await;

    set_item(&client, &basic, "bill", 100_000).await;
    set_item(&client, &basic, "ann", 7).await;

    let events: Vec<_> = basic
        .filter_item_set(&FilterOpts::default())
        .await
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].key, "bill");
    assert_eq!(events[0].value, U256::from(100_000u64));
    assert_eq!(events[1].key, "ann");
    assert_eq!(events[0].raw.address, basic.address());
}

#[tokio::test]
#[ignore = "requires anvil"]
async fn test_watch_item_set() {
    let backend = start_backend();
    let client = backend.client(0).await.unwrap();
    let basic = deploy(&client).await;

    let (tx, mut rx) = mpsc::channel(8);
    let opts = WatchOpts {
        poll_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let mut sub = basic.watch_item_set(&opts, tx).await.unwrap();

    set_item(&client, &basic, "bill", 100_000).await;

    let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("no ItemSet event delivered")
        .expect("sink closed");
    assert_eq!(event.key, "bill");
    assert_eq!(event.value, U256::from(100_000u64));

    sub.unsubscribe();
    assert!(sub.err().await.is_none());
}
