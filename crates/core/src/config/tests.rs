use super::*;
use std::io::Write;
use tempfile::Builder;

const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[test]
fn test_contract_config_default() {
    let config = ContractConfig::default();
    assert_eq!(config.network.rpc_url, "http://localhost:8545");
    assert_eq!(config.network.poll_interval_ms, 1000);
    assert_eq!(config.transaction.gas_limit, 1_600_000);
    assert_eq!(config.transaction.gas_price_gwei, "39.576");
    assert_eq!(config.transaction.value_gwei, "0");
    assert!(config.account.private_key.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_rpc_url_validation() {
    let mut config = ContractConfig::default();

    config.network.rpc_url = String::new();
    assert_eq!(config.validate(), Err(ConfigError::MissingRpcUrl));

    config.network.rpc_url = "ws://localhost:8546".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidRpcUrl { .. })));

    config.network.rpc_url = "https://rpc.example.org".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_transaction_validation() {
    let mut config = ContractConfig::default();
    config.transaction.gas_limit = 0;
    assert_eq!(config.validate(), Err(ConfigError::InvalidGasLimit));

    let mut config = ContractConfig::default();
    config.transaction.gas_price_gwei = "39,5".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidAmount { ref field, .. }) if field == "gas price"
    ));

    let mut config = ContractConfig::default();
    config.transaction.value_gwei = ".".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidAmount { .. })));

    let mut config = ContractConfig::default();
    config.network.poll_interval_ms = 0;
    assert_eq!(config.validate(), Err(ConfigError::InvalidPollInterval));
}

#[test]
fn test_private_key_validation() {
    let mut config = ContractConfig::default();

    config.account.private_key = Some(format!("0x{}", TEST_KEY));
    assert!(config.validate().is_ok());

    config.account.private_key = Some(TEST_KEY.to_string());
    assert!(config.validate().is_ok());

    config.account.private_key = Some("0x1234".to_string());
    assert_eq!(config.validate(), Err(ConfigError::InvalidPrivateKey));
}

#[test]
fn test_private_key_is_redacted_in_debug_output() {
    let mut config = ContractConfig::default();
    config.account.private_key = Some(TEST_KEY.to_string());
    let printed = format!("{:?}", config);
    assert!(!printed.contains(TEST_KEY));
    assert!(printed.contains("<redacted>"));
}

#[test]
fn test_load_partial_toml_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[network]
rpc_url = "http://127.0.0.1:9545"

[transaction]
gas_limit = 300000
"#
    )
    .unwrap();

    let config = ContractConfig::load_from_file(file.path()).unwrap();
    assert!(config.network.rpc_url.starts_with("http://"));
    assert_eq!(config.transaction.gas_limit, 300_000);
    assert_eq!(config.transaction.gas_price_gwei, "39.576");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_json_file() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"logging": {{"level": "debug", "json": true}}}}"#).unwrap();

    let config = ContractConfig::load_from_file(file.path()).unwrap();
    assert!(config.logging.json);
    assert_eq!(config.network.poll_interval_ms, 1000);
}

#[test]
fn test_unsupported_extension() {
    let file = Builder::new().suffix(".ini").tempfile().unwrap();
    let result = ContractConfig::load_from_file(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_decimal_amounts() {
    assert!(is_decimal("0"));
    assert!(is_decimal("39.576"));
    assert!(is_decimal(".5"));
    assert!(is_decimal("10."));
    assert!(!is_decimal(""));
    assert!(!is_decimal("1e9"));
    assert!(!is_decimal("-1"));
}
