use crate::error::Result;
use crate::types::{MintInfo, StakeActivation, TokenAmount};
use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

/// Named account-scan filters.
///
/// Byte offsets into raw account layouts are resolved by the
/// [`LedgerClient`] implementation, never by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountFilter {
    /// Stake accounts whose withdraw authority is the given key
    WithdrawalAuthority(Pubkey),
    /// Accounts with exactly this many data bytes
    DataSize(u64),
}

/// Select stake accounts withdrawable by `address`.
pub fn filter_by_withdrawal_authority(address: &Pubkey) -> AccountFilter {
    AccountFilter::WithdrawalAuthority(*address)
}

/// Everything the wallet needs from the ledger.
///
/// Every method may fail with [`crate::WalletError::Network`]. Transactions
/// handed to [`LedgerClient::send_and_confirm_transaction`] are already
/// signed; the implementation submits and waits for confirmation.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Native balance in lamports
    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    /// Fresh anti-replay token. Never cache across submissions.
    async fn get_latest_blockhash(&self) -> Result<Hash>;

    async fn send_and_confirm_transaction(&self, tx: &Transaction) -> Result<Signature>;

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// Balance of a token account, `None` when the account does not exist
    async fn get_token_account_balance(&self, token_account: &Pubkey)
        -> Result<Option<TokenAmount>>;

    /// Mint metadata, `None` when the address is not a token mint
    async fn get_mint_info(&self, mint: &Pubkey) -> Result<Option<MintInfo>>;

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64>;

    async fn get_stake_activation(&self, stake_account: &Pubkey) -> Result<StakeActivation>;

    /// Activation of stake accounts already fetched by a program scan, in
    /// input order. Implementations should classify them all against one
    /// epoch; this default queries each account separately.
    async fn get_stake_activations(
        &self,
        accounts: &[(Pubkey, Account)],
    ) -> Result<Vec<StakeActivation>> {
        let mut activations = Vec::with_capacity(accounts.len());
        for (address, _) in accounts {
            activations.push(self.get_stake_activation(address).await?);
        }
        Ok(activations)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>>;

    /// Test-network funding; fails with
    /// [`crate::WalletError::NotSupportedOnMainnet`] elsewhere.
    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature>;

    /// Deterministic associated token account derivation, no round-trip.
    fn resolve_associated_account(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        crate::utils::derive_associated_token_address(owner, mint)
    }
}
