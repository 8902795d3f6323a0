use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use super::verify_input;
use crate::{
    error::{Result, VaultError},
    events::VaultEvent,
    fhe::{
        EncryptedAmount, EncryptedCompute, EncryptedInputVerifier, ExternalEncryptedAmount,
        InputProof,
    },
    state::AssetClass,
    token::ConfidentialToken,
    vault::ConfidentialVault,
};

/// Unstake an encrypted amount
///
/// The stake is debited by the requested amount when it covers it and left as is
/// otherwise; the token is asked to send `select(ok, amount, 0)`. The asset total
/// is debited by what the token reports as sent. No operator check: the vault
/// only moves funds it already holds.
///
/// Insufficient stake never errors. It is observable only as a withdrawal whose
/// returned amount decrypts to zero. An account with no position still gets the
/// encrypted-zero transfer, but no position or total is created for it.
pub fn handler<F, T>(
    vault: &mut ConfidentialVault<F, T>,
    caller: &Pubkey,
    class: AssetClass,
    input: &ExternalEncryptedAmount,
    proof: &InputProof,
) -> Result<EncryptedAmount>
where
    F: EncryptedCompute + EncryptedInputVerifier,
    T: ConfidentialToken<F>,
{
    if vault.paused {
        return Err(VaultError::VaultPaused);
    }

    let vault_address = vault.config.vault;
    if *caller == vault_address {
        warn!(class = ?class, "Withdraw rejected: caller is the vault");
        return Err(VaultError::VaultAsAccount);
    }
    let amount = verify_input(&mut vault.fhe, &vault_address, caller, input, proof).inspect_err(
        |_| warn!(account = %caller, class = ?class, "Withdraw rejected: invalid input"),
    )?;

    // Structural check on the reserved handle only; no plaintext is involved.
    let has_position = vault.ledger.stake(class, caller).is_initialized();
    let (withdrawable, updated_stake) = vault
        .ledger
        .decrease_stake(&mut vault.fhe, class, caller, amount)?;

    let token = &mut vault.tokens[class.index()];
    let token_address = token.address();
    vault
        .ledger
        .access()
        .grant_transient(&mut vault.fhe, withdrawable, &token_address)?;

    let sent = token.confidential_transfer(&mut vault.fhe, &vault_address, caller, withdrawable)?;

    // Stake moves by the requested amount, the total by what the token sent.
    // A never-written stake or total stays the reserved zero handle.
    if has_position {
        vault
            .ledger
            .commit_stake(&mut vault.fhe, class, caller, updated_stake)?;
    }
    if vault.ledger.total(class).is_initialized() {
        vault.ledger.decrease_total(&mut vault.fhe, class, sent)?;
    }
    vault
        .ledger
        .access()
        .grant_owner(&mut vault.fhe, sent, caller)?;

    info!(
        account = %caller,
        class = ?class,
        amount = %sent,
        stake = %updated_stake,
        "Unstaked"
    );

    vault.events.push(VaultEvent::Unstaked {
        account: *caller,
        class,
        amount: sent,
    });

    Ok(sent)
}
