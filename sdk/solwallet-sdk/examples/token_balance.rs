// Example: Checking a token balance and sending tokens
//
// Creates the recipient's token account when it does not exist yet.

use solwallet_sdk::logging::{init_logging, LogFormat};
use solwallet_sdk::{Wallet, WalletConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Human, "info");

    let secret = std::env::var("WALLET_SECRET")?;
    let mint = std::env::var("TOKEN_MINT")?;
    let recipient = std::env::var("RECIPIENT")?;

    let mut wallet = Wallet::from_config(WalletConfig::default());
    wallet.accounts_mut().import(&secret)?;

    let tokens = wallet.tokens();
    let balance = tokens.token_balance(&mint).await?;
    println!("Token account: {}", balance.account);
    println!("  Balance: {} (raw {})", balance.balance, balance.raw_balance);

    let receipt = tokens.token_transfer(&mint, &recipient, 1.0).await?;
    println!("Sent {} to {}", receipt.amount, receipt.destination_account);
    if receipt.created_destination_account {
        println!("  Recipient token account was created");
    }

    Ok(())
}
