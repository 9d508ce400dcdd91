// Example: Funding a fresh identity on devnet and sending SOL
//
// This example demonstrates how to:
// 1. Load a wallet config (or fall back to devnet defaults)
// 2. Generate an identity and request a faucet airdrop
// 3. Transfer part of the balance to another address

use solana_sdk::pubkey::Pubkey;
use solwallet_sdk::logging::init_logging;
use solwallet_sdk::{lamports_to_sol, Wallet, WalletConfig};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Config from ./wallet.toml when present
    let path = Path::new("wallet.toml");
    let config = if path.exists() {
        WalletConfig::load(path)?
    } else {
        WalletConfig::default()
    };
    init_logging(config.logging.format, &config.logging.level);

    let mut wallet = Wallet::from_config(config);

    // 2. New identity, funded from the faucet
    let identity = wallet.accounts_mut().generate();
    println!("Generated identity: {}", identity.address);

    wallet.request_airdrop(1.0).await?;
    println!("Balance: {} SOL", lamports_to_sol(wallet.balance().await?));

    // 3. Send 0.1 SOL somewhere
    let destination = Pubkey::new_unique(); // Replace with a real recipient
    let receipt = wallet
        .transfers()
        .transfer(&destination.to_string(), 0.1)
        .await?;

    println!("Transfer confirmed: {}", receipt.signature);
    println!("Balance: {} SOL", lamports_to_sol(wallet.balance().await?));

    Ok(())
}
