use crate::error::{Result, WalletError};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::stake::{
    self,
    instruction as stake_instruction,
    state::{Authorized, Lockup, StakeStateV2},
};
use solana_sdk::system_instruction;

/// Bytes allocated for a stake account
pub fn stake_account_size() -> usize {
    StakeStateV2::size_of()
}

pub fn native_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    system_instruction::transfer(from, to, lamports)
}

/// Create the associated token account of `owner` for `mint`, paid by
/// `payer`. Idempotent, so a concurrent creation does not fail the transfer.
pub fn create_associated_token_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account_idempotent(
        payer,
        owner,
        mint,
        &spl_token::id(),
    )
}

/// `TransferChecked` between two token accounts; the ledger re-validates
/// `decimals` against the mint.
pub fn token_transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction> {
    spl_token::instruction::transfer_checked(
        &spl_token::id(),
        source,
        mint,
        destination,
        authority,
        &[],
        amount,
        decimals,
    )
    .map_err(|e| WalletError::InvalidAccountData(format!("transfer_checked: {}", e)))
}

/// Create, initialize and delegate a stake account in one sequence:
///
/// 1. `CreateAccount` funded with `lamports` (rent reserve + stake)
/// 2. `Initialize` with staker = withdrawer = `authority`, no lockup
/// 3. `DelegateStake` to `vote_account`
///
/// Both `authority` and `stake_account` must sign.
pub fn create_and_delegate_stake(
    authority: &Pubkey,
    stake_account: &Pubkey,
    vote_account: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        system_instruction::create_account(
            authority,
            stake_account,
            lamports,
            stake_account_size() as u64,
            &stake::program::id(),
        ),
        stake_instruction::initialize(
            stake_account,
            &Authorized::auto(authority),
            &Lockup::default(),
        ),
        stake_instruction::delegate_stake(stake_account, authority, vote_account),
    ]
}

pub fn deactivate_stake(stake_account: &Pubkey, staker: &Pubkey) -> Instruction {
    stake_instruction::deactivate_stake(stake_account, staker)
}

pub fn withdraw_stake(
    stake_account: &Pubkey,
    withdrawer: &Pubkey,
    recipient: &Pubkey,
    lamports: u64,
) -> Instruction {
    stake_instruction::withdraw(stake_account, withdrawer, recipient, lamports, None)
}
