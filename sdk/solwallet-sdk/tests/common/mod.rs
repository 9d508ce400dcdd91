#![allow(dead_code)]

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    clock::Epoch,
    hash::Hash,
    instruction::CompiledInstruction,
    pubkey::Pubkey,
    signature::Signature,
    stake::{
        self,
        instruction::StakeInstruction,
        stake_flags::StakeFlags,
        state::{Delegation, Meta, Stake, StakeStateV2},
    },
    stake_history::StakeHistory,
    system_instruction::SystemInstruction,
    system_program,
    transaction::Transaction,
};
use solwallet_sdk::{
    mint_info_from_account, stake_activation_from_account, AccountFilter, LedgerClient, MintInfo,
    Result, StakeActivation, StakeState, TokenAmount, WalletError,
};
use spl_token::instruction::TokenInstruction;
use spl_token::solana_program::{program_option::COption, program_pack::Pack};
use std::collections::HashMap;
use tokio::sync::Mutex;

pub const FEE_PER_SIGNATURE: u64 = 5_000;
pub const TOKEN_ACCOUNT_RENT: u64 = 2_039_280;

/// Rent-exempt minimum with the default ledger rent parameters
pub fn rent_exempt_minimum(data_len: usize) -> u64 {
    (128 + data_len as u64) * 3_480 * 2
}

#[derive(Debug, Clone)]
pub struct MockStake {
    pub state: StakeState,
    pub staker: Pubkey,
    pub withdrawer: Pubkey,
    pub vote: Option<Pubkey>,
    pub rent_exempt_reserve: u64,
}

#[derive(Debug, Clone)]
enum Kind {
    System,
    Mint { decimals: u8, supply: u64 },
    Token { mint: Pubkey, owner: Pubkey, amount: u64 },
    Stake(StakeStateV2),
}

#[derive(Debug, Clone)]
struct MockAccount {
    lamports: u64,
    kind: Kind,
}

impl MockAccount {
    fn owner(&self) -> Pubkey {
        match self.kind {
            Kind::System => system_program::id(),
            Kind::Mint { .. } | Kind::Token { .. } => spl_token::id(),
            Kind::Stake(_) => stake::program::id(),
        }
    }

    /// Ledger view with real account data for mints and stake accounts
    fn to_account(&self) -> Account {
        let data = match &self.kind {
            Kind::System | Kind::Token { .. } => Vec::new(),
            Kind::Mint { decimals, supply } => {
                let mut data = vec![0u8; spl_token::state::Mint::LEN];
                spl_token::state::Mint::pack(
                    spl_token::state::Mint {
                        mint_authority: COption::None,
                        supply: *supply,
                        decimals: *decimals,
                        is_initialized: true,
                        freeze_authority: COption::None,
                    },
                    &mut data,
                )
                .expect("mint packs");
                data
            },
            Kind::Stake(state) => {
                let mut data = bincode::serialize(state).expect("stake state serializes");
                data.resize(StakeStateV2::size_of(), 0);
                data
            },
        };
        Account {
            lamports: self.lamports,
            data,
            owner: self.owner(),
            executable: false,
            rent_epoch: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, MockAccount>,
    blockhash: Hash,
    submitted: Vec<Transaction>,
    fail_next_submission: Option<String>,
    epoch: Epoch,
    activation_queries: usize,
    activation_batches: usize,
}

type Exec<T> = std::result::Result<T, String>;

impl LedgerState {
    fn lamports(&self, key: &Pubkey) -> u64 {
        self.accounts.get(key).map(|a| a.lamports).unwrap_or(0)
    }

    fn debit(&mut self, key: &Pubkey, lamports: u64) -> Exec<()> {
        let account = self
            .accounts
            .get_mut(key)
            .ok_or_else(|| format!("account {} not found", key))?;
        account.lamports = account
            .lamports
            .checked_sub(lamports)
            .ok_or_else(|| format!("insufficient lamports in {}", key))?;
        Ok(())
    }

    fn credit(&mut self, key: &Pubkey, lamports: u64) {
        self.accounts
            .entry(*key)
            .or_insert(MockAccount {
                lamports: 0,
                kind: Kind::System,
            })
            .lamports += lamports;
    }

    fn stake_mut(&mut self, key: &Pubkey) -> Exec<&mut StakeStateV2> {
        match self.accounts.get_mut(key) {
            Some(MockAccount {
                kind: Kind::Stake(state),
                ..
            }) => Ok(state),
            _ => Err(format!("{} is not a stake account", key)),
        }
    }

    /// Classification at the current epoch; no history is kept, so every
    /// transition settles after one epoch.
    fn activation(&self, key: &Pubkey) -> Result<StakeActivation> {
        let account = self
            .accounts
            .get(key)
            .map(MockAccount::to_account)
            .ok_or_else(|| WalletError::InvalidAccountData(format!("stake account {} not found", key)))?;
        stake_activation_from_account(key, &account, self.epoch, &StakeHistory::default())
    }

    fn execute(&mut self, tx: &Transaction) -> Exec<()> {
        let keys = &tx.message.account_keys;
        let signers = &keys[..tx.message.header.num_required_signatures as usize];
        self.debit(&keys[0], FEE_PER_SIGNATURE * tx.signatures.len() as u64)?;

        for ix in &tx.message.instructions {
            let program_id = keys[ix.program_id_index as usize];
            let accounts: Vec<Pubkey> = ix.accounts.iter().map(|i| keys[*i as usize]).collect();
            self.execute_instruction(&program_id, &accounts, ix, signers)?;
        }
        Ok(())
    }

    fn execute_instruction(
        &mut self,
        program_id: &Pubkey,
        accounts: &[Pubkey],
        ix: &CompiledInstruction,
        signers: &[Pubkey],
    ) -> Exec<()> {
        let require_signer = |key: &Pubkey| -> Exec<()> {
            if signers.contains(key) {
                Ok(())
            } else {
                Err(format!("missing signature for {}", key))
            }
        };

        if *program_id == system_program::id() {
            match bincode::deserialize::<SystemInstruction>(&ix.data).map_err(|e| e.to_string())? {
                SystemInstruction::Transfer { lamports } => {
                    require_signer(&accounts[0])?;
                    self.debit(&accounts[0], lamports)?;
                    self.credit(&accounts[1], lamports);
                },
                SystemInstruction::CreateAccount {
                    lamports, owner, ..
                } => {
                    require_signer(&accounts[0])?;
                    require_signer(&accounts[1])?;
                    if self.accounts.contains_key(&accounts[1]) {
                        return Err(format!("account {} already in use", accounts[1]));
                    }
                    self.debit(&accounts[0], lamports)?;
                    let kind = if owner == stake::program::id() {
                        Kind::Stake(StakeStateV2::Uninitialized)
                    } else {
                        Kind::System
                    };
                    self.accounts
                        .insert(accounts[1], MockAccount { lamports, kind });
                },
                other => return Err(format!("unsupported system instruction {:?}", other)),
            }
        } else if *program_id == stake::program::id() {
            match bincode::deserialize::<StakeInstruction>(&ix.data).map_err(|e| e.to_string())? {
                StakeInstruction::Initialize(authorized, lockup) => {
                    let rent_exempt_reserve = rent_exempt_minimum(StakeStateV2::size_of());
                    let state = self.stake_mut(&accounts[0])?;
                    if !matches!(state, StakeStateV2::Uninitialized) {
                        return Err("stake account already initialized".to_string());
                    }
                    *state = StakeStateV2::Initialized(Meta {
                        rent_exempt_reserve,
                        authorized,
                        lockup,
                    });
                },
                StakeInstruction::DelegateStake => {
                    let authority = *accounts.last().ok_or("no stake authority")?;
                    require_signer(&authority)?;
                    let (vote, epoch) = (accounts[1], self.epoch);
                    let lamports = self.lamports(&accounts[0]);
                    let state = self.stake_mut(&accounts[0])?;
                    let meta = match state {
                        StakeStateV2::Initialized(meta) => meta.clone(),
                        _ => return Err("stake account cannot be delegated".to_string()),
                    };
                    if meta.authorized.staker != authority {
                        return Err("stake authority mismatch".to_string());
                    }
                    let delegated = lamports.saturating_sub(meta.rent_exempt_reserve);
                    *state = StakeStateV2::Stake(
                        meta,
                        Stake {
                            delegation: Delegation::new(&vote, delegated, epoch),
                            credits_observed: 0,
                        },
                        StakeFlags::empty(),
                    );
                },
                StakeInstruction::Deactivate => {
                    require_signer(&accounts[2])?;
                    let epoch = self.epoch;
                    match self.stake_mut(&accounts[0])? {
                        StakeStateV2::Stake(meta, stake, _) => {
                            if meta.authorized.staker != accounts[2] {
                                return Err("stake authority mismatch".to_string());
                            }
                            if stake.delegation.deactivation_epoch != u64::MAX {
                                return Err("stake already deactivated".to_string());
                            }
                            stake.delegation.deactivation_epoch = epoch;
                        },
                        _ => return Err("stake account is not delegated".to_string()),
                    }
                },
                StakeInstruction::Withdraw(lamports) => {
                    require_signer(&accounts[4])?;
                    let withdrawer = self.stake_mut(&accounts[0])?.meta().map(|m| m.authorized.withdrawer);
                    if withdrawer != Some(accounts[4]) {
                        return Err("withdraw authority mismatch".to_string());
                    }
                    let activation = self.activation(&accounts[0]).map_err(|e| e.to_string())?;
                    if activation.state != StakeState::Inactive {
                        return Err("insufficient funds: stake is not inactive".to_string());
                    }
                    self.debit(&accounts[0], lamports)?;
                    self.credit(&accounts[1], lamports);
                    if self.lamports(&accounts[0]) == 0 {
                        self.accounts.remove(&accounts[0]);
                    }
                },
                other => return Err(format!("unsupported stake instruction {:?}", other)),
            }
        } else if *program_id == spl_associated_token_account::id() {
            // [payer, ata, owner, mint, system, token_program]
            let (payer, ata, owner, mint) = (accounts[0], accounts[1], accounts[2], accounts[3]);
            require_signer(&payer)?;
            if ata != spl_associated_token_account::get_associated_token_address(&owner, &mint) {
                return Err("associated address mismatch".to_string());
            }
            if !self.accounts.contains_key(&ata) {
                self.debit(&payer, TOKEN_ACCOUNT_RENT)?;
                self.accounts.insert(
                    ata,
                    MockAccount {
                        lamports: TOKEN_ACCOUNT_RENT,
                        kind: Kind::Token {
                            mint,
                            owner,
                            amount: 0,
                        },
                    },
                );
            }
        } else if *program_id == spl_token::id() {
            let (source, mint, destination, authority, amount, decimals) =
                match TokenInstruction::unpack(&ix.data).map_err(|e| e.to_string())? {
                    TokenInstruction::TransferChecked { amount, decimals } => (
                        accounts[0],
                        Some(accounts[1]),
                        accounts[2],
                        accounts[3],
                        amount,
                        Some(decimals),
                    ),
                    TokenInstruction::Transfer { amount } => {
                        (accounts[0], None, accounts[1], accounts[2], amount, None)
                    },
                    _ => return Err("unsupported token instruction".to_string()),
                };
            require_signer(&authority)?;
            self.token_transfer(source, mint, destination, authority, amount, decimals)?;
        } else {
            return Err(format!("unsupported program {}", program_id));
        }
        Ok(())
    }

    fn token_transfer(
        &mut self,
        source: Pubkey,
        checked_mint: Option<Pubkey>,
        destination: Pubkey,
        authority: Pubkey,
        amount: u64,
        checked_decimals: Option<u8>,
    ) -> Exec<()> {
        let (mint, owner, balance) = match self.accounts.get(&source).map(|a| &a.kind) {
            Some(Kind::Token {
                mint,
                owner,
                amount,
            }) => (*mint, *owner, *amount),
            _ => return Err("source token account not found".to_string()),
        };
        if owner != authority {
            return Err("owner does not match".to_string());
        }
        if let Some(checked) = checked_mint {
            if checked != mint {
                return Err("mint mismatch".to_string());
            }
        }
        if let Some(decimals) = checked_decimals {
            match self.accounts.get(&mint).map(|a| &a.kind) {
                Some(Kind::Mint { decimals: d, .. }) if *d == decimals => {},
                _ => return Err("decimals mismatch".to_string()),
            }
        }
        if balance < amount {
            return Err("insufficient token funds".to_string());
        }

        match self.accounts.get_mut(&destination).map(|a| &mut a.kind) {
            Some(Kind::Token {
                mint: dest_mint,
                amount: dest_amount,
                ..
            }) if *dest_mint == mint => *dest_amount += amount,
            _ => return Err("destination token account invalid".to_string()),
        }
        if let Some(Kind::Token { amount: src, .. }) =
            self.accounts.get_mut(&source).map(|a| &mut a.kind)
        {
            *src -= amount;
        }
        Ok(())
    }
}

/// In-memory ledger executing System, Stake, SPL Token and ATA instructions.
///
/// Signatures and the blockhash are verified on submission; the blockhash
/// rotates after every accepted transaction. Mint and stake accounts carry
/// real packed data, and stake activation goes through the same decoding as
/// the RPC client. Epochs only advance through [`MockLedger::advance_epoch`].
pub struct MockLedger {
    state: Mutex<LedgerState>,
    mainnet: bool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                blockhash: Hash::new_unique(),
                ..LedgerState::default()
            }),
            mainnet: false,
        }
    }

    pub fn mainnet() -> Self {
        Self {
            mainnet: true,
            ..Self::new()
        }
    }

    pub async fn fund(&self, address: &Pubkey, lamports: u64) {
        self.state.lock().await.credit(address, lamports);
    }

    pub async fn lamports(&self, address: &Pubkey) -> u64 {
        self.state.lock().await.lamports(address)
    }

    pub async fn exists(&self, address: &Pubkey) -> bool {
        self.state.lock().await.accounts.contains_key(address)
    }

    /// Register a new mint and return its address
    pub async fn create_mint(&self, decimals: u8) -> Pubkey {
        let mint = Pubkey::new_unique();
        self.state.lock().await.accounts.insert(
            mint,
            MockAccount {
                lamports: rent_exempt_minimum(82),
                kind: Kind::Mint {
                    decimals,
                    supply: 0,
                },
            },
        );
        mint
    }

    /// Credit `amount` minor units to the associated token account of
    /// `owner`, creating it when needed
    pub async fn mint_to(&self, owner: &Pubkey, mint: &Pubkey, amount: u64) {
        let mut state = self.state.lock().await;
        if let Some(Kind::Mint { supply, .. }) = state.accounts.get_mut(mint).map(|a| &mut a.kind)
        {
            *supply += amount;
        }
        let ata = spl_associated_token_account::get_associated_token_address(owner, mint);
        let account = state.accounts.entry(ata).or_insert(MockAccount {
            lamports: TOKEN_ACCOUNT_RENT,
            kind: Kind::Token {
                mint: *mint,
                owner: *owner,
                amount: 0,
            },
        });
        if let Kind::Token { amount: held, .. } = &mut account.kind {
            *held += amount;
        }
    }

    pub async fn token_amount(&self, owner: &Pubkey, mint: &Pubkey) -> Option<u64> {
        let ata = spl_associated_token_account::get_associated_token_address(owner, mint);
        match self.state.lock().await.accounts.get(&ata).map(|a| &a.kind) {
            Some(Kind::Token { amount, .. }) => Some(*amount),
            _ => None,
        }
    }

    /// Decoded view of a stake account, classified at the current epoch
    pub async fn stake(&self, address: &Pubkey) -> Option<MockStake> {
        let state = self.state.lock().await;
        let stake_state = match state.accounts.get(address).map(|a| &a.kind) {
            Some(Kind::Stake(stake_state)) => stake_state.clone(),
            _ => return None,
        };
        let meta = stake_state.meta().unwrap_or_default();
        let observed = match stake_state {
            StakeStateV2::Uninitialized => StakeState::Uninitialized,
            _ => state.activation(address).ok()?.state,
        };

        Some(MockStake {
            state: observed,
            staker: meta.authorized.staker,
            withdrawer: meta.authorized.withdrawer,
            vote: stake_state.delegation().map(|d| d.voter_pubkey),
            rent_exempt_reserve: meta.rent_exempt_reserve,
        })
    }

    /// Cross an epoch boundary
    pub async fn advance_epoch(&self) {
        self.state.lock().await.epoch += 1;
    }

    /// Single-account activation lookups served so far
    pub async fn activation_queries(&self) -> usize {
        self.state.lock().await.activation_queries
    }

    /// Batched activation lookups served so far
    pub async fn activation_batches(&self) -> usize {
        self.state.lock().await.activation_batches
    }

    pub async fn submission_count(&self) -> usize {
        self.state.lock().await.submitted.len()
    }

    pub async fn last_submission(&self) -> Option<Transaction> {
        self.state.lock().await.submitted.last().cloned()
    }

    pub async fn fail_next_submission(&self, reason: &str) {
        self.state.lock().await.fail_next_submission = Some(reason.to_string());
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        Ok(self.state.lock().await.lamports(address))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(self.state.lock().await.blockhash)
    }

    async fn send_and_confirm_transaction(&self, tx: &Transaction) -> Result<Signature> {
        let mut state = self.state.lock().await;
        if let Some(reason) = state.fail_next_submission.take() {
            return Err(WalletError::network(reason));
        }
        if tx.message.recent_blockhash != state.blockhash {
            return Err(WalletError::network("Blockhash not found"));
        }
        tx.verify()
            .map_err(|e| WalletError::network(format!("signature verification failed: {}", e)))?;

        let mut next = state.clone();
        next.execute(tx)
            .map_err(|e| WalletError::network(format!("transaction failed: {}", e)))?;
        next.submitted.push(tx.clone());
        next.blockhash = Hash::new_unique();
        *state = next;

        Ok(tx.signatures[0])
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self
            .state
            .lock()
            .await
            .accounts
            .get(address)
            .map(MockAccount::to_account))
    }

    async fn get_token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<Option<TokenAmount>> {
        let state = self.state.lock().await;
        let (mint, amount) = match state.accounts.get(token_account).map(|a| &a.kind) {
            Some(Kind::Token { mint, amount, .. }) => (*mint, *amount),
            _ => return Ok(None),
        };
        let decimals = match state.accounts.get(&mint).map(|a| &a.kind) {
            Some(Kind::Mint { decimals, .. }) => *decimals,
            _ => 0,
        };
        Ok(Some(TokenAmount {
            amount,
            decimals,
            ui_amount: solwallet_sdk::base_units_to_ui_amount(amount, decimals),
        }))
    }

    async fn get_mint_info(&self, mint: &Pubkey) -> Result<Option<MintInfo>> {
        Ok(self
            .state
            .lock()
            .await
            .accounts
            .get(mint)
            .and_then(|account| mint_info_from_account(mint, &account.to_account())))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        Ok(rent_exempt_minimum(data_len))
    }

    async fn get_stake_activation(&self, stake_account: &Pubkey) -> Result<StakeActivation> {
        let mut state = self.state.lock().await;
        state.activation_queries += 1;
        state.activation(stake_account)
    }

    async fn get_stake_activations(
        &self,
        accounts: &[(Pubkey, Account)],
    ) -> Result<Vec<StakeActivation>> {
        let mut state = self.state.lock().await;
        state.activation_batches += 1;
        let history = StakeHistory::default();
        accounts
            .iter()
            .map(|(address, account)| {
                stake_activation_from_account(address, account, state.epoch, &history)
            })
            .collect()
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>> {
        let state = self.state.lock().await;
        let mut matches = Vec::new();
        for (address, account) in &state.accounts {
            if account.owner() != *program_id {
                continue;
            }
            let raw = account.to_account();
            let keep = filters.iter().all(|filter| match (filter, &account.kind) {
                (AccountFilter::WithdrawalAuthority(authority), Kind::Stake(stake_state)) => {
                    stake_state.meta().map(|m| m.authorized.withdrawer) == Some(*authority)
                },
                (AccountFilter::WithdrawalAuthority(_), _) => false,
                (AccountFilter::DataSize(size), _) => raw.data.len() as u64 == *size,
            });
            if keep {
                matches.push((*address, raw));
            }
        }
        Ok(matches)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        if self.mainnet {
            return Err(WalletError::NotSupportedOnMainnet);
        }
        self.state.lock().await.credit(address, lamports);
        Ok(Signature::from([1u8; 64]))
    }
}
