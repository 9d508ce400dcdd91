use crate::error::{Result, WalletError};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::fmt;
use tracing::info;

const KEYPAIR_LEN: usize = 64;

/// Address and exported secret of a freshly generated identity
pub struct GeneratedIdentity {
    pub address: Pubkey,
    /// Base58 secret blob, same format as [`AccountManager::export`]
    pub secret: String,
}

impl fmt::Debug for GeneratedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Owns the single signing identity of a wallet.
///
/// The keypair lives only in memory. Secrets leave through
/// [`AccountManager::export`] and are never logged.
#[derive(Default)]
pub struct AccountManager {
    keypair: Option<Keypair>,
}

impl AccountManager {
    pub fn new() -> Self {
        Self { keypair: None }
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Some(keypair),
        }
    }

    /// Generate a random keypair and make it the held identity
    pub fn generate(&mut self) -> GeneratedIdentity {
        let keypair = Keypair::new();
        let identity = GeneratedIdentity {
            address: keypair.pubkey(),
            secret: keypair.to_base58_string(),
        };
        info!(address = %identity.address, "generated identity");
        self.keypair = Some(keypair);
        identity
    }

    /// Replace the held identity with one decoded from `secret`.
    ///
    /// Accepts the base58 export format or a JSON array of 64 bytes.
    /// On failure the current identity is left untouched.
    pub fn import(&mut self, secret: &str) -> Result<Pubkey> {
        let keypair = decode_keypair(secret)?;
        let address = keypair.pubkey();
        info!(address = %address, "imported identity");
        self.keypair = Some(keypair);
        Ok(address)
    }

    /// Base58 encoding of the 64-byte keypair
    pub fn export(&self) -> Result<String> {
        Ok(self.keypair()?.to_base58_string())
    }

    pub fn address(&self) -> Result<Pubkey> {
        Ok(self.keypair()?.pubkey())
    }

    pub fn has_identity(&self) -> bool {
        self.keypair.is_some()
    }

    /// Drop the held identity
    pub fn clear(&mut self) {
        self.keypair = None;
    }

    /// Signing identity for the engines
    pub fn keypair(&self) -> Result<&Keypair> {
        self.keypair.as_ref().ok_or(WalletError::NoActiveIdentity)
    }
}

impl fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountManager")
            .field("address", &self.keypair.as_ref().map(|k| k.pubkey()))
            .finish()
    }
}

fn decode_keypair(secret: &str) -> Result<Keypair> {
    let secret = secret.trim();
    let bytes = if secret.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(secret)
            .map_err(|e| WalletError::InvalidKeyMaterial(format!("invalid byte array: {}", e)))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|e| WalletError::InvalidKeyMaterial(format!("invalid base58: {}", e)))?
    };

    if bytes.len() != KEYPAIR_LEN {
        return Err(WalletError::InvalidKeyMaterial(format!(
            "expected {} bytes, got {}",
            KEYPAIR_LEN,
            bytes.len()
        )));
    }

    let keypair =
        Keypair::from_bytes(&bytes).map_err(|e| WalletError::InvalidKeyMaterial(e.to_string()))?;
    if keypair.pubkey().to_bytes()[..] != bytes[32..] {
        return Err(WalletError::InvalidKeyMaterial(
            "public key does not match secret key".to_string(),
        ));
    }
    Ok(keypair)
}
