use crate::advanced::builders::TransactionIntent;
use crate::advanced::instructions;
use crate::basic::account::AccountManager;
use crate::core::connection::LedgerClient;
use crate::error::{Result, WalletError};
use crate::types::{TokenAccountRef, TokenBalance, TokenTransferReceipt};
use crate::utils;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use tracing::{debug, info, warn};

/// Fungible-token balances and transfers through associated token accounts.
pub struct TokenTransferEngine<'a, C: LedgerClient> {
    connection: &'a C,
    accounts: &'a AccountManager,
}

impl<'a, C: LedgerClient> TokenTransferEngine<'a, C> {
    pub fn new(connection: &'a C, accounts: &'a AccountManager) -> Self {
        Self {
            connection,
            accounts,
        }
    }

    /// Derive the associated token account of `owner` and check whether it
    /// exists on-ledger.
    pub async fn resolve_token_account(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<TokenAccountRef> {
        let address = self.connection.resolve_associated_account(owner, mint);
        let exists = self.connection.get_account(&address).await?.is_some();
        Ok(TokenAccountRef {
            owner: *owner,
            mint: *mint,
            address,
            exists,
        })
    }

    /// Balance of the held identity for `mint`.
    ///
    /// A missing token account is a zero balance, not an error.
    pub async fn token_balance(&self, mint: &str) -> Result<TokenBalance> {
        let owner = self.accounts.address()?;
        let mint = utils::parse_address(mint)?;
        let account = self.connection.resolve_associated_account(&owner, &mint);

        let balance = match self.connection.get_token_account_balance(&account).await? {
            Some(amount) => TokenBalance {
                mint,
                account,
                balance: amount.ui_amount,
                raw_balance: amount.amount,
                decimals: amount.decimals,
            },
            None => {
                debug!(%owner, %mint, "no token account, reporting zero balance");
                TokenBalance {
                    mint,
                    account,
                    balance: 0.0,
                    raw_balance: 0,
                    decimals: 0,
                }
            },
        };
        Ok(balance)
    }

    /// Send `amount` (in whole tokens) of `mint` to the owner `destination`.
    ///
    /// The destination's token account is created in the same transaction
    /// when absent; the sender pays for it. A sender without a token account
    /// is reported as [`WalletError::InsufficientFunds`] with zero available.
    pub async fn token_transfer(
        &self,
        mint: &str,
        destination: &str,
        amount: f64,
    ) -> Result<TokenTransferReceipt> {
        let sender = self.accounts.keypair()?;
        let mint = utils::parse_address(mint)?;
        let destination_owner = utils::parse_address(destination)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(WalletError::InvalidAmount(format!(
                "{} is not a non-negative finite number",
                amount
            )));
        }
        let owner = sender.pubkey();

        let mint_info = self
            .connection
            .get_mint_info(&mint)
            .await?
            .ok_or(WalletError::UnknownToken(mint))?;
        let raw_amount = utils::ui_amount_to_base_units(amount, mint_info.decimals)?;

        let source = self.connection.resolve_associated_account(&owner, &mint);
        let available = match self.connection.get_token_account_balance(&source).await? {
            Some(balance) => balance.amount,
            None => {
                warn!(%owner, %mint, required = raw_amount, "token transfer rejected: no source token account");
                return Err(WalletError::InsufficientFunds {
                    required: raw_amount,
                    available: 0,
                });
            },
        };
        if available < raw_amount {
            warn!(%owner, %mint, required = raw_amount, available, "token transfer rejected: insufficient funds");
            return Err(WalletError::InsufficientFunds {
                required: raw_amount,
                available,
            });
        }

        let destination = self
            .resolve_token_account(&destination_owner, &mint)
            .await?;

        let mut intent = TransactionIntent::new(sender);
        if !destination.exists {
            info!(
                owner = %destination_owner,
                account = %destination.address,
                "destination token account missing, creating it"
            );
            intent = intent.add_instruction(instructions::create_associated_token_account(
                &owner,
                &destination_owner,
                &mint,
            ));
        }
        let intent = intent.add_instruction(instructions::token_transfer_checked(
            &source,
            &mint,
            &destination.address,
            &owner,
            raw_amount,
            mint_info.decimals,
        )?);

        let signature = intent.submit(self.connection).await?;

        info!(%mint, from = %source, to = %destination.address, raw_amount, %signature, "token transfer confirmed");

        Ok(TokenTransferReceipt {
            signature,
            mint,
            source_account: source,
            destination_account: destination.address,
            destination_owner,
            amount,
            raw_amount,
            decimals: mint_info.decimals,
            created_destination_account: !destination.exists,
        })
    }
}
