use solana_sdk::pubkey::Pubkey;

use crate::{
    config::VaultConfig,
    error::Result,
    events::VaultEvent,
    fhe::{
        EncryptedAmount, EncryptedCompute, EncryptedInputVerifier, ExternalEncryptedAmount,
        InputProof,
    },
    instructions,
    ledger::AssetLedger,
    state::AssetClass,
    token::ConfidentialToken,
};

/// Confidential staking vault for two asset classes.
///
/// Owns the ledger, the encrypted-computation backend and one token per class.
/// Every mutating call is one transaction: transient grants issued during it are
/// dropped when it returns, whether it succeeded or not.
#[derive(Debug)]
pub struct ConfidentialVault<F, T> {
    pub(crate) config: VaultConfig,
    pub(crate) paused: bool,
    pub(crate) ledger: AssetLedger,
    pub(crate) fhe: F,
    pub(crate) tokens: [T; 2],
    pub(crate) events: Vec<VaultEvent>,
}

impl<F, T> ConfidentialVault<F, T>
where
    F: EncryptedCompute + EncryptedInputVerifier,
    T: ConfidentialToken<F>,
{
    /// Wire a vault to its backend and tokens.
    /// Fails with `InvalidAsset` if a configured asset is the zero address.
    pub fn initialize(config: VaultConfig, fhe: F, primary: T, secondary: T) -> Result<Self> {
        instructions::initialize::handler(config, fhe, primary, secondary)
    }

    /// Stake an encrypted amount of `class`.
    ///
    /// Returns the amount the token actually moved, granted to `caller`.
    pub fn deposit(
        &mut self,
        caller: &Pubkey,
        class: AssetClass,
        input: &ExternalEncryptedAmount,
        proof: &InputProof,
    ) -> Result<EncryptedAmount> {
        let result = instructions::deposit::handler(self, caller, class, input, proof);
        self.fhe.end_transaction();
        result
    }

    /// Unstake an encrypted amount of `class`.
    ///
    /// Returns the amount the token actually sent, granted to `caller`. It
    /// decrypts to zero when the stake was insufficient.
    pub fn withdraw(
        &mut self,
        caller: &Pubkey,
        class: AssetClass,
        input: &ExternalEncryptedAmount,
        proof: &InputProof,
    ) -> Result<EncryptedAmount> {
        let result = instructions::withdraw::handler(self, caller, class, input, proof);
        self.fhe.end_transaction();
        result
    }

    pub fn pause(&mut self, caller: &Pubkey) -> Result<()> {
        instructions::admin::pause(self, caller)
    }

    pub fn unpause(&mut self, caller: &Pubkey) -> Result<()> {
        instructions::admin::unpause(self, caller)
    }

    pub fn transfer_authority(&mut self, caller: &Pubkey, new_authority: Pubkey) -> Result<()> {
        let result = instructions::admin::transfer_authority(self, caller, new_authority);
        self.fhe.end_transaction();
        result
    }

    // ============ Views ============

    pub fn get_stake(&self, account: &Pubkey, class: AssetClass) -> EncryptedAmount {
        instructions::view::get_stake(self, account, class)
    }

    pub fn get_total(&self, class: AssetClass) -> EncryptedAmount {
        instructions::view::get_total(self, class)
    }

    pub fn position_count(&self, class: AssetClass) -> usize {
        instructions::view::position_count(self, class)
    }
}

impl<F, T> ConfidentialVault<F, T> {
    pub fn address(&self) -> Pubkey {
        self.config.vault
    }

    pub fn authority(&self) -> Pubkey {
        *self.ledger.access().authority()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    pub fn coprocessor(&self) -> &F {
        &self.fhe
    }

    pub fn coprocessor_mut(&mut self) -> &mut F {
        &mut self.fhe
    }

    pub fn token(&self, class: AssetClass) -> &T {
        &self.tokens[class.index()]
    }

    /// A token together with the backend, for collaborator calls made outside
    /// the vault (faucet mints, operator approvals).
    pub fn token_with_coprocessor(&mut self, class: AssetClass) -> (&mut T, &mut F) {
        (&mut self.tokens[class.index()], &mut self.fhe)
    }
}
