pub mod advanced;
pub mod basic;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

pub use crate::basic::account::{AccountManager, GeneratedIdentity};
pub use crate::basic::stake::StakeManager;
pub use crate::basic::token::TokenTransferEngine;
pub use crate::basic::transfer::TransferEngine;
pub use crate::basic::wallet::Wallet;
pub use crate::config::{Cluster, WalletConfig};
pub use crate::core::connection::{filter_by_withdrawal_authority, AccountFilter, LedgerClient};
pub use crate::core::rpc::{mint_info_from_account, stake_activation_from_account, RpcLedgerClient};
pub use crate::error::{Result, WalletError};
pub use crate::types::{
    MintInfo, StakeAccountInfo, StakeActivation, StakeReceipt, StakeState, TokenAccountRef,
    TokenAmount, TokenBalance, TokenTransferReceipt, TransferReceipt, WithdrawReceipt,
};
pub use crate::utils::{
    base_units_to_ui_amount, derive_associated_token_address, lamports_to_sol, parse_address,
    sol_to_lamports, ui_amount_to_base_units,
};
