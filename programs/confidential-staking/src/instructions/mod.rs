pub mod admin;
pub mod deposit;
pub mod initialize;
pub mod view;
pub mod withdraw;

use solana_sdk::pubkey::Pubkey;

use crate::{
    error::{FheError, Result, VaultError},
    fhe::{EncryptedAmount, EncryptedInputVerifier, ExternalEncryptedAmount, InputProof},
};

/// Verify a caller-supplied ciphertext against its proof.
///
/// Runs before any state is touched; a bad proof is terminal.
fn verify_input<F: EncryptedInputVerifier>(
    fhe: &mut F,
    vault: &Pubkey,
    caller: &Pubkey,
    input: &ExternalEncryptedAmount,
    proof: &InputProof,
) -> Result<EncryptedAmount> {
    fhe.verify(vault, caller, input, proof)
        .map_err(|err| match err {
            FheError::InvalidProof => VaultError::InvalidProof,
            other => other.into(),
        })
}
