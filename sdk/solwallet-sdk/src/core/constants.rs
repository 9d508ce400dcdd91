/// Lamports charged per signature; the fixed fee estimate used for
/// balance checks unless configured otherwise.
pub const DEFAULT_FEE_LAMPORTS: u64 = 5_000;

/// Decimal exponent of the native currency (lamports per SOL = 10^9)
pub const NATIVE_DECIMALS: u8 = 9;

pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const LOCALNET_RPC_URL: &str = "http://127.0.0.1:8899";
