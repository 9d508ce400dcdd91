pub mod account;
pub mod stake;
pub mod token;
pub mod transfer;
pub mod wallet;
