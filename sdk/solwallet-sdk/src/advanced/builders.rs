use crate::core::connection::LedgerClient;
use crate::error::{Result, WalletError};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tracing::debug;

/// Ordered instructions, a fee payer and the keypairs that will sign them.
///
/// An intent carries no blockhash. [`TransactionIntent::submit`] fetches one
/// right before signing, so a stale token is never embedded.
pub struct TransactionIntent<'a> {
    fee_payer: &'a Keypair,
    instructions: Vec<Instruction>,
    signers: Vec<&'a Keypair>,
}

impl<'a> TransactionIntent<'a> {
    pub fn new(fee_payer: &'a Keypair) -> Self {
        Self {
            fee_payer,
            instructions: Vec::new(),
            signers: vec![fee_payer],
        }
    }

    pub fn add_instruction(mut self, ix: Instruction) -> Self {
        self.instructions.push(ix);
        self
    }

    pub fn add_instructions(mut self, ixs: impl IntoIterator<Item = Instruction>) -> Self {
        self.instructions.extend(ixs);
        self
    }

    /// Add a co-signer; duplicates of an existing signer are ignored.
    pub fn with_signer(mut self, signer: &'a Keypair) -> Self {
        if !self.signers.iter().any(|s| s.pubkey() == signer.pubkey()) {
            self.signers.push(signer);
        }
        self
    }

    pub fn fee_payer(&self) -> Pubkey {
        self.fee_payer.pubkey()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Signers demanded by the compiled message, fee payer first
    pub fn required_signers(&self) -> Vec<Pubkey> {
        let message = Message::new(&self.instructions, Some(&self.fee_payer.pubkey()));
        let count = message.header.num_required_signatures as usize;
        message.account_keys.into_iter().take(count).collect()
    }

    /// Every authority referenced by the instructions must have a keypair.
    pub fn check_signers(&self) -> Result<()> {
        for required in self.required_signers() {
            if !self.signers.iter().any(|s| s.pubkey() == required) {
                return Err(WalletError::MissingSigner(required));
            }
        }
        Ok(())
    }

    /// Compile and sign against `blockhash`.
    pub fn sign(&self, blockhash: Hash) -> Result<Transaction> {
        self.check_signers()?;
        self.compile_and_sign(blockhash)
    }

    /// Fetch a fresh blockhash, sign, submit and wait for confirmation.
    /// Failures are returned as-is; nothing is retried.
    pub async fn submit(&self, connection: &impl LedgerClient) -> Result<Signature> {
        self.check_signers()?;

        let blockhash = connection.get_latest_blockhash().await?;
        let tx = self.compile_and_sign(blockhash)?;

        debug!(
            fee_payer = %self.fee_payer(),
            instructions = self.instructions.len(),
            signers = self.signers.len(),
            "submitting transaction"
        );

        connection.send_and_confirm_transaction(&tx).await
    }

    fn compile_and_sign(&self, blockhash: Hash) -> Result<Transaction> {
        let message = Message::new(&self.instructions, Some(&self.fee_payer.pubkey()));
        let mut tx = Transaction::new_unsigned(message);
        tx.try_sign(self.signers.as_slice(), blockhash)?;
        Ok(tx)
    }
}
