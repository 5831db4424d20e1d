//! Binding generation for Ethereum contracts
//!
//! Wraps `ethers` abigen so bindings can be regenerated from an ABI JSON file,
//! optionally paired with deployment bytecode.


use std::fs;
use std::path::{Path, PathBuf};

use contract_core::{Error, Result};
use ethers::contract::Abigen;
use tracing::info;

/// Configuration for binding generation
#[derive(Debug, Clone)]
pub struct CodegenConfig {
    /// Name of the generated contract type
    pub contract_name: String,
    /// Path to the contract ABI JSON file
    pub abi_path: PathBuf,
    /// Path to the hex encoded deployment bytecode; enables the generated deploy function
    pub bin_path: Option<PathBuf>,
    /// File the bindings are written to
    pub output: PathBuf,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            contract_name: "Basic".to_string(),
            abi_path: PathBuf::from("crates/ethereum/contracts/basic/Basic.abi"),
            bin_path: Some(PathBuf::from("crates/ethereum/contracts/basic/Basic.bin")),
            output: PathBuf::from("basic.rs"),
        }
    }
}

/// Generate bindings and write them to `config.output`
pub fn generate_bindings(config: &CodegenConfig) -> Result<PathBuf> {
    let source = read_source(config)?;
    let code = render_bindings(&config.contract_name, &source)?;

    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.output, code)?;

    info!(contract = %config.contract_name, output = %config.output.display(), "Generated contract bindings");
    Ok(config.output.clone())
}

/// Generate bindings for an ABI, or an `{"abi", "bytecode"}` artifact, held in memory
pub fn render_bindings(contract_name: &str, source: &str) -> Result<String> {
    let bindings = Abigen::new(contract_name, source)
        .and_then(|abigen| abigen.generate())
        .map_err(|e| Error::codegen(format!("Failed to generate bindings for {}: {}", contract_name, e)))?;

    Ok(bindings.to_string())
}

fn read_source(config: &CodegenConfig) -> Result<String> {
    let abi = read_file(&config.abi_path)?;
    let Some(bin_path) = &config.bin_path else {
        return Ok(abi);
    };

    let abi: serde_json::Value = serde_json::from_str(&abi)
        .map_err(|e| Error::abi(format!("Invalid ABI in {}: {}", config.abi_path.display(), e)))?;
    let bin = read_file(bin_path)?;
    let bin = bin.trim();
    if bin.is_empty() {
        return Err(Error::codegen(format!("Bytecode file {} is empty", bin_path.display())));
    }
    let bytecode = if bin.starts_with("0x") {
        bin.to_string()
    } else {
        format!("0x{}", bin)
    };

    Ok(serde_json::json!({ "abi": abi, "bytecode": bytecode }).to_string())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::codegen(format!("Failed to read {}: {}", path.display(), e)))
}
