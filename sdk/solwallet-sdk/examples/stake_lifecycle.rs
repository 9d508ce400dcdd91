// Example: Delegating stake and inspecting stake accounts
//
// This example demonstrates how to:
// 1. Import an existing identity
// 2. Delegate stake to a validator vote account
// 3. List stake accounts and start deactivation
//
// Withdrawal only succeeds once the stake is inactive, which takes at least
// one epoch boundary after deactivation.

use solwallet_sdk::logging::{init_logging, LogFormat};
use solwallet_sdk::{StakeState, Wallet, WalletConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Human, "info");

    // 1. Identity exported earlier (base58 or a JSON byte array)
    let secret = std::env::var("WALLET_SECRET")?;
    let validator = std::env::var("VOTE_ACCOUNT")?;

    let mut wallet = Wallet::from_config(WalletConfig::default());
    let address = wallet.accounts_mut().import(&secret)?;
    println!("Using identity: {}", address);

    // 2. Delegate 0.5 SOL
    let staking = wallet.staking();
    let receipt = staking.stake(0.5, &validator).await?;
    println!("Stake account: {}", receipt.stake_account);
    println!("  Rent reserve: {} lamports", receipt.rent_exempt_reserve);

    // 3. Every stake account this identity can withdraw from
    for info in staking.list_stake_accounts().await? {
        println!(
            "  {} {} active={} inactive={}",
            info.address, info.state, info.active_amount, info.inactive_amount
        );
        if info.state == StakeState::Inactive {
            let withdrawn = staking.withdraw(&info.address.to_string()).await?;
            println!("  Withdrew {} lamports", withdrawn.lamports);
        }
    }

    let signature = staking
        .deactivate(&receipt.stake_account.to_string())
        .await?;
    println!("Deactivation submitted: {}", signature);

    Ok(())
}
