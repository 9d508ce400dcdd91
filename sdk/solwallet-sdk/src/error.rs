use crate::types::StakeState;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::SignerError;
use thiserror::Error;

/// Boxed cause carried by [`WalletError::Network`].
pub type NetworkCause = Box<dyn std::error::Error + Send + Sync>;

/// Error types for wallet operations
#[derive(Debug, Error)]
pub enum WalletError {
    /// No keypair is held by the account manager
    #[error("No active identity: generate or import a keypair first")]
    NoActiveIdentity,

    /// Secret blob does not decode to a valid keypair
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// String does not parse as a ledger address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Human amount cannot be expressed in minor units
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Balance does not cover the amount plus fees, both in minor units
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// Token mint account does not resolve
    #[error("Unknown token mint: {0}")]
    UnknownToken(Pubkey),

    /// Withdraw attempted before the stake account became inactive
    #[error("Stake account is not inactive (observed: {observed_state})")]
    StakeNotInactive { observed_state: StakeState },

    /// Faucet funding requested outside a test network
    #[error("Faucet funding is not supported on mainnet")]
    NotSupportedOnMainnet,

    /// A transaction referenced a signer that was not supplied
    #[error("Missing signature for required signer {0}")]
    MissingSigner(Pubkey),

    /// A supplied keypair could not sign the compiled message, e.g. a
    /// co-signer the instructions never reference
    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),

    /// On-ledger account data could not be interpreted
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// RPC or submission failure, surfaced verbatim
    #[error("Network error: {0}")]
    Network(#[source] NetworkCause),
}

impl WalletError {
    /// Wrap any transport error as [`WalletError::Network`].
    pub fn network<E>(cause: E) -> Self
    where
        E: Into<NetworkCause>,
    {
        WalletError::Network(cause.into())
    }
}

/// Result type alias for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;
