//! Single-writer host
//!
//! Outside a serially executing ledger, concurrent callers must not interleave
//! inside an operation. The host holds one lock for the whole of each call, so
//! every deposit, withdrawal and read sees a quiescent vault.

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tokio::sync::Mutex;

use crate::{
    error::Result,
    fhe::{
        EncryptedAmount, EncryptedCompute, EncryptedInputVerifier, ExternalEncryptedAmount,
        InputProof,
    },
    state::AssetClass,
    token::ConfidentialToken,
    vault::ConfidentialVault,
};

pub struct VaultHost<F, T> {
    inner: Arc<Mutex<ConfidentialVault<F, T>>>,
}

impl<F, T> Clone for VaultHost<F, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F, T> VaultHost<F, T>
where
    F: EncryptedCompute + EncryptedInputVerifier + Send,
    T: ConfidentialToken<F> + Send,
{
    pub fn new(vault: ConfidentialVault<F, T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vault)),
        }
    }

    pub async fn deposit(
        &self,
        caller: Pubkey,
        class: AssetClass,
        input: ExternalEncryptedAmount,
        proof: InputProof,
    ) -> Result<EncryptedAmount> {
        self.inner
            .lock()
            .await
            .deposit(&caller, class, &input, &proof)
    }

    pub async fn withdraw(
        &self,
        caller: Pubkey,
        class: AssetClass,
        input: ExternalEncryptedAmount,
        proof: InputProof,
    ) -> Result<EncryptedAmount> {
        self.inner
            .lock()
            .await
            .withdraw(&caller, class, &input, &proof)
    }

    pub async fn get_stake(&self, account: Pubkey, class: AssetClass) -> EncryptedAmount {
        self.inner.lock().await.get_stake(&account, class)
    }

    pub async fn get_total(&self, class: AssetClass) -> EncryptedAmount {
        self.inner.lock().await.get_total(class)
    }

    pub async fn pause(&self, caller: Pubkey) -> Result<()> {
        self.inner.lock().await.pause(&caller)
    }

    pub async fn unpause(&self, caller: Pubkey) -> Result<()> {
        self.inner.lock().await.unpause(&caller)
    }

    /// Run `f` with exclusive access, e.g. for collaborator calls or decryption.
    pub async fn with_vault<R>(&self, f: impl FnOnce(&mut ConfidentialVault<F, T>) -> R) -> R {
        let mut vault = self.inner.lock().await;
        f(&mut vault)
    }
}
