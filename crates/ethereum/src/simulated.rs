//! Local development chain for exercising bindings end to end

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use contract_core::{Error, Result};
use ethers::providers::{Http, Provider};
use ethers::signers::LocalWallet;
use ethers::types::Address;
use ethers::utils::{Anvil, AnvilInstance};
use tracing::{debug, info};

use crate::client::EthereumClient;

/// Environment variable naming the `anvil` binary to run
pub const ANVIL_BIN_ENV: &str = "ANVIL_BIN";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// An `anvil` dev node with funded accounts.
///
/// The node is killed when the backend is dropped.
pub struct SimulatedBackend {
    anvil: AnvilInstance,
    wallets: Vec<LocalWallet>,
}

impl SimulatedBackend {
    /// Start a node with `accounts` accounts holding `balance_eth` ether each.
    ///
    /// With `auto_commit` every transaction is mined immediately, otherwise a
    /// block is produced each second.
    ///
    /// # Panics
    ///
    /// Panics if anvil starts but does not report its accounts in time.
    pub fn new(accounts: usize, auto_commit: bool, balance_eth: u64) -> Result<Self> {
        if accounts == 0 {
            return Err(Error::config("Simulated backend needs at least one account"));
        }
        let path = find_anvil()?;
        check_anvil(&path)?;

        let mut anvil = Anvil::new()
            .path(path)
            .arg("--accounts")
            .arg(accounts.to_string())
            .arg("--balance")
            .arg(balance_eth.to_string());
        if !auto_commit {
            anvil = anvil.block_time(1u64);
        }
        let anvil = anvil.spawn();

        let wallets: Vec<LocalWallet> = anvil.keys().iter().cloned().map(LocalWallet::from).collect();
        info!(
            endpoint = %anvil.endpoint(),
            chain_id = anvil.chain_id(),
            accounts = wallets.len(),
            auto_commit,
            "Started simulated backend"
        );

        Ok(Self { anvil, wallets })
    }

    /// HTTP endpoint of the node
    pub fn endpoint(&self) -> String {
        self.anvil.endpoint()
    }

    pub fn chain_id(&self) -> u64 {
        self.anvil.chain_id()
    }

    /// Addresses of the funded accounts
    pub fn addresses(&self) -> &[Address] {
        self.anvil.addresses()
    }

    /// Hex encoded private keys of the funded accounts
    pub fn private_keys(&self) -> Vec<String> {
        self.anvil
            .keys()
            .iter()
            .map(|key| format!("0x{}", hex::encode(key.to_bytes())))
            .collect()
    }

    /// Provider polling the node at a short interval
    pub fn provider(&self) -> Result<Provider<Http>> {
        let provider = Provider::<Http>::try_from(self.endpoint())
            .map_err(|e| Error::chain(format!("Failed to connect to simulated backend: {}", e)))?;
        Ok(provider.interval(POLL_INTERVAL))
    }

    /// Signing client for the account at `index`
    pub async fn client(&self, index: usize) -> Result<EthereumClient> {
        let wallet = self
            .wallets
            .get(index)
            .cloned()
            .ok_or_else(|| Error::config(format!("Simulated backend has no account {}", index)))?;

        EthereumClient::new(self.provider()?, wallet, Some(self.chain_id())).await
    }
}

fn find_anvil() -> Result<PathBuf> {
    if let Some(path) = env::var_os(ANVIL_BIN_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(path);
        }
        return Err(Error::backend_unavailable(format!(
            "{} points to {}, which is not a file",
            ANVIL_BIN_ENV,
            path.display()
        )));
    }

    env::var_os("PATH")
        .and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join("anvil"))
                .find(|candidate| candidate.is_file())
        })
        .ok_or_else(|| Error::backend_unavailable("anvil was not found on PATH"))
}

/// Run `anvil --version` so a broken binary is reported instead of panicking in `spawn`
fn check_anvil(path: &Path) -> Result<()> {
    let output = Command::new(path).arg("--version").output().map_err(|e| {
        Error::backend_unavailable(format!("Failed to run {}: {}", path.display(), e))
    })?;
    if !output.status.success() {
        return Err(Error::backend_unavailable(format!(
            "{} --version exited with {}",
            path.display(),
            output.status
        )));
    }

    debug!(version = %String::from_utf8_lossy(&output.stdout).trim(), "Found anvil");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_needs_an_account() {
        assert!(matches!(SimulatedBackend::new(0, true, 100), Err(Error::Config(_))));
    }

    #[test]
    fn test_unrunnable_anvil_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let fake = dir.path().join("anvil");
        fs::write(&fake, "not a program").unwrap();

        assert!(matches!(check_anvil(&fake), Err(Error::BackendUnavailable(_))));
        assert!(matches!(
            check_anvil(&dir.path().join("missing")),
            Err(Error::BackendUnavailable(_))
        ));
    }
}
