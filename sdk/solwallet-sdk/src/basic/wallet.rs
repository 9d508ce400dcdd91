use crate::basic::account::AccountManager;
use crate::basic::stake::StakeManager;
use crate::basic::token::TokenTransferEngine;
use crate::basic::transfer::TransferEngine;
use crate::config::WalletConfig;
use crate::core::connection::LedgerClient;
use crate::core::rpc::RpcLedgerClient;
use crate::error::Result;
use crate::utils;
use solana_sdk::signature::Signature;
use tracing::info;

/// A ledger connection plus the one identity that signs for it.
pub struct Wallet<C: LedgerClient> {
    connection: C,
    accounts: AccountManager,
    config: WalletConfig,
}

impl Wallet<RpcLedgerClient> {
    /// Wallet talking JSON-RPC to the endpoint named in `config`
    pub fn from_config(config: WalletConfig) -> Self {
        let connection = RpcLedgerClient::from_config(&config);
        Self::new(connection, AccountManager::new(), config)
    }
}

impl<C: LedgerClient> Wallet<C> {
    pub fn new(connection: C, accounts: AccountManager, config: WalletConfig) -> Self {
        Self {
            connection,
            accounts,
            config,
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn accounts(&self) -> &AccountManager {
        &self.accounts
    }

    /// Mutable access for generate/import
    pub fn accounts_mut(&mut self) -> &mut AccountManager {
        &mut self.accounts
    }

    /// Lamport balance of the held identity
    pub async fn balance(&self) -> Result<u64> {
        let address = self.accounts.address()?;
        self.connection.get_balance(&address).await
    }

    /// Fund the held identity from the faucet. Test networks only.
    pub async fn request_airdrop(&self, amount: f64) -> Result<Signature> {
        let address = self.accounts.address()?;
        let lamports = utils::sol_to_lamports(amount)?;
        let signature = self.connection.request_airdrop(&address, lamports).await?;
        info!(%address, lamports, %signature, "airdrop confirmed");
        Ok(signature)
    }

    pub fn transfers(&self) -> TransferEngine<'_, C> {
        TransferEngine::new(&self.connection, &self.accounts).with_fee(self.config.fee_lamports)
    }

    pub fn tokens(&self) -> TokenTransferEngine<'_, C> {
        TokenTransferEngine::new(&self.connection, &self.accounts)
    }

    pub fn staking(&self) -> StakeManager<'_, C> {
        StakeManager::new(&self.connection, &self.accounts).with_fee(self.config.fee_lamports)
    }
}
