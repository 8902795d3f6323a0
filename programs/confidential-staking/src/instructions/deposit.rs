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

/// Stake an encrypted amount
///
/// 1. operator check (the vault must be approved on the caller's token balance)
/// 2. proof verification
/// 3. token pulls the amount; its return value is what gets credited
/// 4. stake and total credited, grants issued, event recorded
///
/// Steps 1 and 2 fail without touching state. A caller whose wallet cannot cover
/// the amount is credited an encrypted zero.
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
        warn!(class = ?class, "Deposit rejected: caller is the vault");
        return Err(VaultError::VaultAsAccount);
    }
    let token = &mut vault.tokens[class.index()];
    let token_address = token.address();

    if !token.is_operator(caller, &vault_address) {
        warn!(account = %caller, class = ?class, "Deposit rejected: vault is not an operator");
        return Err(VaultError::OperatorMissing {
            account: *caller,
            class,
        });
    }

    let amount = verify_input(&mut vault.fhe, &vault_address, caller, input, proof).inspect_err(
        |_| warn!(account = %caller, class = ?class, "Deposit rejected: invalid input"),
    )?;

    vault
        .ledger
        .access()
        .grant_transient(&mut vault.fhe, amount, &token_address)?;

    let transferred = token.confidential_transfer_from(
        &mut vault.fhe,
        &vault_address,
        caller,
        &vault_address,
        amount,
    )?;

    let stake = vault
        .ledger
        .increase_stake(&mut vault.fhe, class, caller, transferred)?;
    vault
        .ledger
        .increase_total(&mut vault.fhe, class, transferred)?;
    vault
        .ledger
        .access()
        .grant_owner(&mut vault.fhe, transferred, caller)?;

    info!(
        account = %caller,
        class = ?class,
        amount = %transferred,
        stake = %stake,
        "Staked"
    );

    vault.events.push(VaultEvent::Staked {
        account: *caller,
        class,
        amount: transferred,
    });

    Ok(transferred)
}
