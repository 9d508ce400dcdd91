use crate::config::{Cluster, WalletConfig};
use crate::core::connection::{AccountFilter, LedgerClient};
use crate::error::{Result, WalletError};
use crate::types::{MintInfo, StakeActivation, TokenAmount};
use crate::utils;
use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::clock::Epoch;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::stake::{self, state::StakeStateV2};
use solana_sdk::sysvar::stake_history::{self, StakeHistory};
use solana_sdk::transaction::Transaction;
use spl_token::solana_program::program_pack::Pack;
use tracing::debug;

/// Offset of the withdraw authority inside a serialized `StakeStateV2`:
/// 4-byte enum tag, 8-byte rent reserve, 32-byte staker.
const STAKE_WITHDRAWER_OFFSET: usize = 44;

/// [`LedgerClient`] over the JSON-RPC API.
pub struct RpcLedgerClient {
    rpc: RpcClient,
    cluster: Cluster,
}

impl RpcLedgerClient {
    pub fn new(url: String, commitment: CommitmentConfig, cluster: Cluster) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(url, commitment),
            cluster,
        }
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.rpc_url(), config.commitment_config(), config.cluster)
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    /// Underlying RPC client, for calls the wallet does not wrap
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Current epoch plus the stake history sysvar, read once per
    /// classification pass
    async fn epoch_and_history(&self) -> Result<(Epoch, StakeHistory)> {
        let epoch = self
            .rpc
            .get_epoch_info()
            .await
            .map_err(WalletError::network)?
            .epoch;
        let account = self.get_account(&stake_history::id()).await?.ok_or_else(|| {
            WalletError::InvalidAccountData("stake history sysvar unavailable".to_string())
        })?;
        let history = bincode::deserialize(&account.data)
            .map_err(|e| WalletError::InvalidAccountData(format!("stake history: {}", e)))?;
        Ok((epoch, history))
    }
}

//=============================================================================
// Account Decoding
//=============================================================================

/// Classify a raw stake account at `epoch`.
///
/// A never-delegated (`Initialized`) account reports `Inactive`, so it can be
/// withdrawn right away.
pub fn stake_activation_from_account(
    address: &Pubkey,
    account: &Account,
    epoch: Epoch,
    history: &StakeHistory,
) -> Result<StakeActivation> {
    if account.owner != stake::program::id() {
        return Err(WalletError::InvalidAccountData(format!(
            "{} is not a stake account",
            address
        )));
    }

    let state: StakeStateV2 = bincode::deserialize(&account.data)
        .map_err(|e| WalletError::InvalidAccountData(format!("stake state: {}", e)))?;

    match state {
        StakeStateV2::Stake(meta, stake, _) => {
            // Warmup/cooldown rate change epoch is not looked up; it only
            // shifts partial amounts, not when a delegation settles.
            let status = stake
                .delegation
                .stake_activating_and_deactivating(epoch, history, None);

            Ok(StakeActivation::from_status(
                status.effective,
                status.activating,
                status.deactivating,
                account.lamports,
                meta.rent_exempt_reserve,
            ))
        },
        StakeStateV2::Initialized(meta) => Ok(StakeActivation::from_status(
            0,
            0,
            0,
            account.lamports,
            meta.rent_exempt_reserve,
        )),
        other => Err(WalletError::InvalidAccountData(format!(
            "stake account {} in unexpected state {:?}",
            address, other
        ))),
    }
}

/// Decode an SPL mint; `None` when the account is not one
pub fn mint_info_from_account(mint: &Pubkey, account: &Account) -> Option<MintInfo> {
    if account.owner != spl_token::id() {
        return None;
    }
    let state = spl_token::state::Mint::unpack(&account.data).ok()?;

    Some(MintInfo {
        address: *mint,
        decimals: state.decimals,
        supply: state.supply,
        mint_authority: state.mint_authority.into(),
        freeze_authority: state.freeze_authority.into(),
    })
}

fn to_rpc_filters(filters: &[AccountFilter]) -> Vec<RpcFilterType> {
    let mut rpc_filters = Vec::with_capacity(filters.len() + 1);
    for filter in filters {
        match filter {
            AccountFilter::WithdrawalAuthority(authority) => {
                rpc_filters.push(RpcFilterType::DataSize(StakeStateV2::size_of() as u64));
                rpc_filters.push(RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                    STAKE_WITHDRAWER_OFFSET,
                    authority.as_ref(),
                )));
            },
            AccountFilter::DataSize(size) => rpc_filters.push(RpcFilterType::DataSize(*size)),
        }
    }
    rpc_filters
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.rpc
            .get_balance(address)
            .await
            .map_err(WalletError::network)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.rpc
            .get_latest_blockhash()
            .await
            .map_err(WalletError::network)
    }

    async fn send_and_confirm_transaction(&self, tx: &Transaction) -> Result<Signature> {
        self.rpc
            .send_and_confirm_transaction(tx)
            .await
            .map_err(WalletError::network)
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await
            .map_err(WalletError::network)?
            .value)
    }

    async fn get_token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<Option<TokenAmount>> {
        if self.get_account(token_account).await?.is_none() {
            return Ok(None);
        }

        let ui = self
            .rpc
            .get_token_account_balance(token_account)
            .await
            .map_err(WalletError::network)?;
        let amount: u64 = ui.amount.parse().map_err(|_| {
            WalletError::InvalidAccountData(format!("token amount {:?} is not an integer", ui.amount))
        })?;

        Ok(Some(TokenAmount {
            amount,
            decimals: ui.decimals,
            ui_amount: ui
                .ui_amount
                .unwrap_or_else(|| utils::base_units_to_ui_amount(amount, ui.decimals)),
        }))
    }

    async fn get_mint_info(&self, mint: &Pubkey) -> Result<Option<MintInfo>> {
        Ok(self
            .get_account(mint)
            .await?
            .and_then(|account| mint_info_from_account(mint, &account)))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        self.rpc
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(WalletError::network)
    }

    async fn get_stake_activation(&self, stake_account: &Pubkey) -> Result<StakeActivation> {
        let account = self.get_account(stake_account).await?.ok_or_else(|| {
            WalletError::InvalidAccountData(format!("stake account {} not found", stake_account))
        })?;
        let (epoch, history) = self.epoch_and_history().await?;

        let activation = stake_activation_from_account(stake_account, &account, epoch, &history)?;
        debug!(%stake_account, epoch, state = %activation.state, "stake activation");
        Ok(activation)
    }

    async fn get_stake_activations(
        &self,
        accounts: &[(Pubkey, Account)],
    ) -> Result<Vec<StakeActivation>> {
        if accounts.is_empty() {
            return Ok(Vec::new());
        }
        let (epoch, history) = self.epoch_and_history().await?;
        debug!(epoch, count = accounts.len(), "classifying stake accounts");

        accounts
            .iter()
            .map(|(address, account)| {
                stake_activation_from_account(address, account, epoch, &history)
            })
            .collect()
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(to_rpc_filters(filters)),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.rpc.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        self.rpc
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(WalletError::network)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        if !self.cluster.allows_faucet() {
            return Err(WalletError::NotSupportedOnMainnet);
        }

        let signature = self
            .rpc
            .request_airdrop(address, lamports)
            .await
            .map_err(WalletError::network)?;
        self.rpc
            .poll_for_signature_with_commitment(&signature, self.rpc.commitment())
            .await
            .map_err(WalletError::network)?;
        Ok(signature)
    }
}
