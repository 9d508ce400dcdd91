use crate::core::constants::{
    DEFAULT_FEE_LAMPORTS, DEVNET_RPC_URL, LOCALNET_RPC_URL, MAINNET_RPC_URL, TESTNET_RPC_URL,
};
use crate::error::{Result, WalletError};
use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::fs;
use std::path::Path;

/// Ledger network the wallet talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Testnet,
    #[default]
    Devnet,
    Localnet,
}

impl Cluster {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => MAINNET_RPC_URL,
            Cluster::Testnet => TESTNET_RPC_URL,
            Cluster::Devnet => DEVNET_RPC_URL,
            Cluster::Localnet => LOCALNET_RPC_URL,
        }
    }

    /// Faucet funding exists only on test networks
    pub fn allows_faucet(&self) -> bool {
        !matches!(self, Cluster::MainnetBeta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        match commitment {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Wallet configuration, usually loaded from a TOML file:
///
/// ```toml
/// cluster = "devnet"
/// commitment = "confirmed"
/// fee_lamports = 5000
///
/// [logging]
/// level = "info"
/// format = "human"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub cluster: Cluster,
    /// Overrides the cluster's public endpoint
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub commitment: Commitment,
    /// Fixed fee estimate used by balance checks
    #[serde(default = "default_fee_lamports")]
    pub fee_lamports: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            rpc_url: None,
            commitment: Commitment::default(),
            fee_lamports: default_fee_lamports(),
            logging: LoggingConfig::default(),
        }
    }
}

impl WalletConfig {
    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WalletConfig =
            toml::from_str(content).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fee_lamports == 0 {
            return Err(WalletError::Config("fee_lamports must be positive".to_string()));
        }
        if let Some(url) = &self.rpc_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(WalletError::Config(format!(
                    "rpc_url must be http(s), got {}",
                    url
                )));
            }
        }
        Ok(())
    }

    /// Endpoint to connect to
    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.cluster.default_rpc_url().to_string())
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        self.commitment.into()
    }
}

fn default_fee_lamports() -> u64 {
    DEFAULT_FEE_LAMPORTS
}

fn default_log_level() -> String {
    "info".to_string()
}
