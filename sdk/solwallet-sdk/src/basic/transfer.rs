use crate::advanced::builders::TransactionIntent;
use crate::advanced::instructions;
use crate::basic::account::AccountManager;
use crate::core::connection::LedgerClient;
use crate::core::constants::DEFAULT_FEE_LAMPORTS;
use crate::error::{Result, WalletError};
use crate::types::TransferReceipt;
use crate::utils;
use solana_sdk::signature::Signer;
use tracing::{info, warn};

/// Native-currency transfers from the held identity.
pub struct TransferEngine<'a, C: LedgerClient> {
    connection: &'a C,
    accounts: &'a AccountManager,
    fee_lamports: u64,
}

impl<'a, C: LedgerClient> TransferEngine<'a, C> {
    pub fn new(connection: &'a C, accounts: &'a AccountManager) -> Self {
        Self {
            connection,
            accounts,
            fee_lamports: DEFAULT_FEE_LAMPORTS,
        }
    }

    /// Override the fixed fee used by the balance check
    pub fn with_fee(mut self, fee_lamports: u64) -> Self {
        self.fee_lamports = fee_lamports;
        self
    }

    /// Lamport balance of the held identity
    pub async fn balance(&self) -> Result<u64> {
        let address = self.accounts.address()?;
        self.connection.get_balance(&address).await
    }

    /// Send `amount` SOL to `destination`.
    ///
    /// Identity, address and amount are validated before any network call.
    /// The balance must cover the amount plus the fixed fee; otherwise
    /// [`WalletError::InsufficientFunds`] is returned and nothing is
    /// submitted.
    pub async fn transfer(&self, destination: &str, amount: f64) -> Result<TransferReceipt> {
        let payer = self.accounts.keypair()?;
        let to = utils::parse_address(destination)?;
        let lamports = utils::sol_to_lamports(amount)?;
        let from = payer.pubkey();

        let available = self.connection.get_balance(&from).await?;
        let required = lamports
            .checked_add(self.fee_lamports)
            .ok_or_else(|| WalletError::InvalidAmount(format!("{} overflows with fee", amount)))?;
        if available < required {
            warn!(%from, required, available, "transfer rejected: insufficient funds");
            return Err(WalletError::InsufficientFunds {
                required,
                available,
            });
        }

        let signature = TransactionIntent::new(payer)
            .add_instruction(instructions::native_transfer(&from, &to, lamports))
            .submit(self.connection)
            .await?;

        info!(%from, %to, lamports, %signature, "transfer confirmed");

        Ok(TransferReceipt {
            signature,
            from,
            to,
            amount,
            lamports,
            fee_lamports: self.fee_lamports,
        })
    }
}
