use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::fmt;

/// Lifecycle of a stake account as seen by the wallet.
///
/// `Activating`, `Active`, `Deactivating` and `Inactive` are observed on the
/// ledger; the remaining states only exist on the client side around
/// creation and final withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StakeState {
    Uninitialized,
    Initializing,
    Activating,
    Active,
    Deactivating,
    Inactive,
    /// Terminal: funds returned to the wallet identity
    Withdrawn,
}

impl StakeState {
    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Transitions out of `Activating`/`Deactivating` only complete at an
    /// epoch boundary; this table says nothing about timing.
    pub fn can_transition_to(self, next: StakeState) -> bool {
        use StakeState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Initializing, Activating)
                | (Initializing, Inactive)
                | (Activating, Active)
                | (Activating, Deactivating)
                | (Active, Deactivating)
                | (Deactivating, Inactive)
                | (Inactive, Withdrawn)
        )
    }

    /// True once the ledger reports the stake fully cooled down.
    pub fn is_withdrawable(self) -> bool {
        self == StakeState::Inactive
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StakeState::Uninitialized => "uninitialized",
            StakeState::Initializing => "initializing",
            StakeState::Activating => "activating",
            StakeState::Active => "active",
            StakeState::Deactivating => "deactivating",
            StakeState::Inactive => "inactive",
            StakeState::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for StakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger-observed activation of a stake account, in lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeActivation {
    pub state: StakeState,
    pub active: u64,
    pub inactive: u64,
}

impl StakeActivation {
    /// Classify a delegation from its effective/activating/deactivating split.
    ///
    /// `inactive` excludes the rent-exempt reserve, which can never be staked.
    pub fn from_status(
        effective: u64,
        activating: u64,
        deactivating: u64,
        lamports: u64,
        rent_exempt_reserve: u64,
    ) -> Self {
        let state = if deactivating > 0 {
            StakeState::Deactivating
        } else if activating > 0 {
            StakeState::Activating
        } else if effective > 0 {
            StakeState::Active
        } else {
            StakeState::Inactive
        };

        Self {
            state,
            active: effective,
            inactive: lamports
                .saturating_sub(effective)
                .saturating_sub(rent_exempt_reserve),
        }
    }
}

/// One entry of [`crate::basic::stake::StakeManager::list_stake_accounts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeAccountInfo {
    pub address: Pubkey,
    pub state: StakeState,
    pub active_amount: u64,
    pub inactive_amount: u64,
    /// Full lamport balance, rent reserve included
    pub total_amount: u64,
}

/// Raw token account balance as reported by the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAmount {
    pub amount: u64,
    pub decimals: u8,
    pub ui_amount: f64,
}

/// Mint metadata needed to normalize amounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintInfo {
    pub address: Pubkey,
    pub decimals: u8,
    pub supply: u64,
    pub mint_authority: Option<Pubkey>,
    pub freeze_authority: Option<Pubkey>,
}

/// Associated token account for an (owner, mint) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccountRef {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub address: Pubkey,
    /// Whether the account was found on-ledger when resolved
    pub exists: bool,
}

/// Token balance of the wallet identity
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalance {
    pub mint: Pubkey,
    pub account: Pubkey,
    /// Human-facing amount; never use for arithmetic
    pub balance: f64,
    /// Minor units
    pub raw_balance: u64,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub signature: Signature,
    pub from: Pubkey,
    pub to: Pubkey,
    /// Amount as requested by the caller
    pub amount: f64,
    pub lamports: u64,
    pub fee_lamports: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenTransferReceipt {
    pub signature: Signature,
    pub mint: Pubkey,
    pub source_account: Pubkey,
    pub destination_account: Pubkey,
    pub destination_owner: Pubkey,
    pub amount: f64,
    pub raw_amount: u64,
    pub decimals: u8,
    /// The transaction also created the destination token account,
    /// funded by the sender
    pub created_destination_account: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StakeReceipt {
    pub signature: Signature,
    pub stake_account: Pubkey,
    pub validator: Pubkey,
    pub staked_lamports: u64,
    pub rent_exempt_reserve: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawReceipt {
    pub signature: Signature,
    pub stake_account: Pubkey,
    pub recipient: Pubkey,
    pub lamports: u64,
}
