use crate::core::constants::NATIVE_DECIMALS;
use crate::error::{Result, WalletError};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

//=============================================================================
// Address Helpers
//=============================================================================

/// Parse a base58 ledger address
pub fn parse_address(address: &str) -> Result<Pubkey> {
    Pubkey::from_str(address.trim()).map_err(|_| WalletError::InvalidAddress(address.to_string()))
}

/// Derive the associated token account for an (owner, mint) pair
pub fn derive_associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, mint)
}

//=============================================================================
// Amount Conversion
//=============================================================================

/// Convert a human amount to integer minor units, rounding down.
///
/// The conversion works on the shortest decimal representation of `amount`
/// instead of multiplying floats, so `0.29` with 9 decimals is exactly
/// `290_000_000` and digits past `decimals` are truncated.
pub fn ui_amount_to_base_units(amount: f64, decimals: u8) -> Result<u64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(WalletError::InvalidAmount(format!(
            "{} is not a non-negative finite number",
            amount
        )));
    }
    if amount == 0.0 {
        return Ok(0);
    }

    let repr = amount.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    let frac = frac_part.as_bytes();
    for i in 0..decimals as usize {
        digits.push(frac.get(i).map(|b| *b as char).unwrap_or('0'));
    }

    let value: u128 = digits
        .parse()
        .map_err(|_| WalletError::InvalidAmount(format!("{} overflows minor units", amount)))?;

    u64::try_from(value)
        .map_err(|_| WalletError::InvalidAmount(format!("{} overflows minor units", amount)))
}

/// Presentation-only conversion of minor units to a human amount
pub fn base_units_to_ui_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

pub fn sol_to_lamports(sol: f64) -> Result<u64> {
    ui_amount_to_base_units(sol, NATIVE_DECIMALS)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    base_units_to_ui_amount(lamports, NATIVE_DECIMALS)
}
