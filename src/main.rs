/// Command line driver for the Basic contract
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use ethers::types::{Address, TxHash, U256};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;

use contract_core::logging::init_logging;
use contract_core::ContractConfig;
use contract_ethereum::codegen::{generate_bindings, CodegenConfig};
use contract_ethereum::currency::{gwei_to_wei, wei_to_eth};
use contract_ethereum::{deploy_basic, Basic, EthereumClient, FilterOpts, SignerClient, TransactOpts, WatchOpts};

#[derive(Parser)]
#[command(name = "basic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ethereum RPC URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Hex encoded private key of the signing account
    #[arg(long, global = true)]
    private_key: Option<String>,

    /// Log level or filter directive
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new Basic contract and wait for it to be mined
    Deploy,

    /// Read the contract version
    Version {
        /// Contract address
        #[arg(long)]
        contract: String,
    },

    /// Read the value stored under a key
    Item {
        /// Contract address
        #[arg(long)]
        contract: String,

        key: String,
    },

    /// Store a value under a key and wait for the transaction to be mined
    SetItem {
        /// Contract address
        #[arg(long)]
        contract: String,

        key: String,

        /// Decimal value
        value: String,
    },

    /// Print past ItemSet events as JSON lines
    Events {
        /// Contract address
        #[arg(long)]
        contract: String,

        /// First block to search
        #[arg(long, default_value_t = 0)]
        from_block: u64,

        /// Last block to search, latest when absent
        #[arg(long)]
        to_block: Option<u64>,
    },

    /// Print ItemSet events as they are mined, until interrupted
    Watch {
        /// Contract address
        #[arg(long)]
        contract: String,

        /// First block to deliver events from
        #[arg(long)]
        from_block: Option<u64>,
    },

    /// Print the balance of the signing account
    Balance,

    /// Generate Rust bindings from an ABI file
    Generate {
        /// Name of the generated contract type
        #[arg(long, default_value = "Basic")]
        name: String,

        /// ABI JSON file
        #[arg(long)]
        abi: PathBuf,

        /// Hex encoded bytecode file
        #[arg(long)]
        bin: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "basic.rs")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Generate { name, abi, bin, output } => {
            let output = generate_bindings(&CodegenConfig {
                contract_name: name,
                abi_path: abi,
                bin_path: bin,
                output,
            })?;
            println!("{}", output.display());
        }
        Commands::Deploy => {
            let client = EthereumClient::connect(&config).await?;
            let opts = transact_opts(&client, &config).await?;

            let (address, tx_hash, _basic) = deploy_basic(&opts, client.backend()).await?;
            println!("transaction: {:?}", tx_hash);
            client.wait_mined(tx_hash).await?;
            println!("contract: {:?}", address);
        }
        Commands::Version { contract } => {
            let client = EthereumClient::connect(&config).await?;
            let basic = bind(&client, &contract)?;
            println!("{}", basic.version(&client.new_call_opts()).await?);
        }
        Commands::Item { contract, key } => {
            let client = EthereumClient::connect(&config).await?;
            let basic = bind(&client, &contract)?;
            println!("{}", basic.items(&client.new_call_opts(), key).await?);
        }
        Commands::SetItem { contract, key, value } => {
            let value = U256::from_dec_str(&value).map_err(|e| anyhow!("Invalid value {}: {:?}", value, e))?;
            let client = EthereumClient::connect(&config).await?;
            let basic = bind(&client, &contract)?;
            let opts = transact_opts(&client, &config).await?;

            let tx_hash: TxHash = basic.set_item(&opts, key, value).await?;
            let receipt = client.wait_mined(tx_hash).await?;
            println!("transaction: {:?} block: {:?}", tx_hash, receipt.block_number);
        }
        Commands::Events {
            contract,
            from_block,
            to_block,
        } => {
            let client = EthereumClient::connect(&config).await?;
            let basic = bind(&client, &contract)?;
            let opts = FilterOpts {
                start: from_block,
                end: to_block,
            };

            for event in basic.filter_item_set(&opts).await? {
                println!("{}", serde_json::to_string(&event?)?);
            }
        }
        Commands::Watch { contract, from_block } => {
            let client = EthereumClient::connect(&config).await?;
            let basic = bind(&client, &contract)?;
            let opts = WatchOpts {
                start: from_block,
                poll_interval: Duration::from_millis(config.network.poll_interval_ms),
            };

            let (tx, mut rx) = mpsc::channel(64);
            let mut sub = basic.watch_item_set(&opts, tx).await?;
            info!("Watching ItemSet events, press Ctrl+C to stop");

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(event) => println!("{}", serde_json::to_string(&event)?),
                        None => break,
                    },
                    _ = signal::ctrl_c() => {
                        info!("Stopping watch");
                        sub.unsubscribe();
                        break;
                    }
                }
            }

            if let Some(e) = sub.err().await {
                return Err(e.into());
            }
        }
        Commands::Balance => {
            let client = EthereumClient::connect(&config).await?;
            let balance = client.balance().await?;
            println!("{:?}: {} ETH", client.address(), wei_to_eth(balance)?);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ContractConfig> {
    let mut config = match &cli.config {
        Some(path) => ContractConfig::load_from_file(path)?,
        None => ContractConfig::from_env()?,
    };

    if let Some(rpc_url) = &cli.rpc_url {
        config.network.rpc_url = rpc_url.clone();
    }
    if let Some(private_key) = &cli.private_key {
        config.account.private_key = Some(private_key.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.json = true;
    }

    config.validate()?;
    Ok(config)
}

fn bind(client: &EthereumClient, contract: &str) -> Result<Basic<SignerClient>> {
    let address: Address = contract
        .parse()
        .map_err(|e| anyhow!("Invalid contract address {}: {}", contract, e))?;
    Ok(Basic::new(address, client.backend())?)
}

async fn transact_opts(client: &EthereumClient, config: &ContractConfig) -> Result<TransactOpts> {
    let gas_price = gwei_to_wei(&config.transaction.gas_price_gwei)?;
    Ok(client
        .new_transact_opts(config.transaction.gas_limit, gas_price, &config.transaction.value_gwei)
        .await?)
}
