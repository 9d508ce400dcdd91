use crate::advanced::builders::TransactionIntent;
use crate::advanced::instructions;
use crate::basic::account::AccountManager;
use crate::core::connection::{filter_by_withdrawal_authority, LedgerClient};
use crate::core::constants::DEFAULT_FEE_LAMPORTS;
use crate::error::{Result, WalletError};
use crate::types::{StakeAccountInfo, StakeReceipt, StakeState, WithdrawReceipt};
use crate::utils;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::stake;
use tracing::{debug, info, warn};

/// Drives stake accounts through create → delegate → deactivate → withdraw.
///
/// The manager never waits for epoch boundaries. A withdraw issued while the
/// stake is still cooling down fails with [`WalletError::StakeNotInactive`]
/// and the caller decides when to try again.
pub struct StakeManager<'a, C: LedgerClient> {
    connection: &'a C,
    accounts: &'a AccountManager,
    fee_lamports: u64,
}

impl<'a, C: LedgerClient> StakeManager<'a, C> {
    pub fn new(connection: &'a C, accounts: &'a AccountManager) -> Self {
        Self {
            connection,
            accounts,
            fee_lamports: DEFAULT_FEE_LAMPORTS,
        }
    }

    pub fn with_fee(mut self, fee_lamports: u64) -> Self {
        self.fee_lamports = fee_lamports;
        self
    }

    /// Stake `amount` SOL with `validator` (a vote account address).
    ///
    /// A new stake account is created, funded with the rent-exempt reserve
    /// plus the stake, initialized with the wallet as both staker and
    /// withdrawer, and delegated. The transaction carries two signatures:
    /// the wallet identity and the new stake account.
    pub async fn stake(&self, amount: f64, validator: &str) -> Result<StakeReceipt> {
        let authority = self.accounts.keypair()?;
        let vote_account = utils::parse_address(validator)?;
        let staked_lamports = utils::sol_to_lamports(amount)?;
        let owner = authority.pubkey();

        let rent_exempt_reserve = self
            .connection
            .get_minimum_balance_for_rent_exemption(instructions::stake_account_size())
            .await?;
        let funding = rent_exempt_reserve
            .checked_add(staked_lamports)
            .ok_or_else(|| WalletError::InvalidAmount(format!("{} overflows with rent", amount)))?;

        // Two signatures: wallet identity and the new stake account.
        let required = funding.saturating_add(self.fee_lamports.saturating_mul(2));
        let available = self.connection.get_balance(&owner).await?;
        if available < required {
            warn!(%owner, required, available, "stake rejected: insufficient funds");
            return Err(WalletError::InsufficientFunds {
                required,
                available,
            });
        }

        let stake_account = Keypair::new();
        debug!(
            stake_account = %stake_account.pubkey(),
            from = %StakeState::Uninitialized,
            to = %StakeState::Initializing,
            "creating stake account"
        );

        let signature = TransactionIntent::new(authority)
            .add_instructions(instructions::create_and_delegate_stake(
                &owner,
                &stake_account.pubkey(),
                &vote_account,
                funding,
            ))
            .with_signer(&stake_account)
            .submit(self.connection)
            .await?;

        info!(
            stake_account = %stake_account.pubkey(),
            validator = %vote_account,
            staked_lamports,
            %signature,
            "stake delegated"
        );

        Ok(StakeReceipt {
            signature,
            stake_account: stake_account.pubkey(),
            validator: vote_account,
            staked_lamports,
            rent_exempt_reserve,
        })
    }

    /// All stake accounts withdrawable by the held identity, with their
    /// current activation. Read-only.
    pub async fn list_stake_accounts(&self) -> Result<Vec<StakeAccountInfo>> {
        let owner = self.accounts.address()?;
        let accounts = self
            .connection
            .get_program_accounts(
                &stake::program::id(),
                &[filter_by_withdrawal_authority(&owner)],
            )
            .await?;

        let activations = self.connection.get_stake_activations(&accounts).await?;
        if activations.len() != accounts.len() {
            return Err(WalletError::InvalidAccountData(format!(
                "{} activations for {} stake accounts",
                activations.len(),
                accounts.len()
            )));
        }
        let infos: Vec<StakeAccountInfo> = accounts
            .into_iter()
            .zip(activations)
            .map(|((address, account), activation)| StakeAccountInfo {
                address,
                state: activation.state,
                active_amount: activation.active,
                inactive_amount: activation.inactive,
                total_amount: account.lamports,
            })
            .collect();

        debug!(%owner, count = infos.len(), "listed stake accounts");
        Ok(infos)
    }

    /// Current ledger-observed state of one stake account
    pub async fn stake_state(&self, stake_address: &str) -> Result<StakeState> {
        let address = utils::parse_address(stake_address)?;
        Ok(self.connection.get_stake_activation(&address).await?.state)
    }

    /// Begin cooldown. Takes effect at the next epoch boundary; a second
    /// deactivation is rejected by the ledger as a submission error.
    pub async fn deactivate(&self, stake_address: &str) -> Result<Signature> {
        let authority = self.accounts.keypair()?;
        let stake_account = utils::parse_address(stake_address)?;

        let signature = TransactionIntent::new(authority)
            .add_instruction(instructions::deactivate_stake(
                &stake_account,
                &authority.pubkey(),
            ))
            .submit(self.connection)
            .await?;

        info!(
            %stake_account,
            to = %StakeState::Deactivating,
            %signature,
            "stake deactivation submitted"
        );
        Ok(signature)
    }

    /// Return the full balance of an inactive stake account to the wallet.
    ///
    /// The activation state is re-read first; anything but `Inactive` fails
    /// with [`WalletError::StakeNotInactive`] and nothing is submitted.
    pub async fn withdraw(&self, stake_address: &str) -> Result<WithdrawReceipt> {
        let authority = self.accounts.keypair()?;
        let stake_account = utils::parse_address(stake_address)?;
        let recipient = authority.pubkey();

        let activation = self.connection.get_stake_activation(&stake_account).await?;
        if !activation.state.is_withdrawable() {
            warn!(%stake_account, observed = %activation.state, "withdraw rejected: stake not inactive");
            return Err(WalletError::StakeNotInactive {
                observed_state: activation.state,
            });
        }

        let lamports = self.connection.get_balance(&stake_account).await?;

        let signature = TransactionIntent::new(authority)
            .add_instruction(instructions::withdraw_stake(
                &stake_account,
                &recipient,
                &recipient,
                lamports,
            ))
            .submit(self.connection)
            .await?;

        info!(
            %stake_account,
            from = %StakeState::Inactive,
            to = %StakeState::Withdrawn,
            lamports,
            %signature,
            "stake withdrawn"
        );

        Ok(WithdrawReceipt {
            signature,
            stake_account,
            recipient,
            lamports,
        })
    }
}
