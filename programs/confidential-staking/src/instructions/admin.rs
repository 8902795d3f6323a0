use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::{
    error::{Result, VaultError},
    events::VaultEvent,
    fhe::EncryptedCompute,
    vault::ConfidentialVault,
};

fn require_authority<F, T>(vault: &ConfidentialVault<F, T>, caller: &Pubkey) -> Result<()> {
    if caller != vault.ledger.access().authority() {
        return Err(VaultError::Unauthorized);
    }
    Ok(())
}

/// Pause all vault operations (emergency circuit breaker)
pub fn pause<F, T>(vault: &mut ConfidentialVault<F, T>, caller: &Pubkey) -> Result<()> {
    require_authority(vault, caller)?;
    if vault.paused {
        return Err(VaultError::VaultPaused);
    }

    vault.paused = true;
    info!(vault = %vault.config.vault, "Vault paused");
    vault.events.push(VaultEvent::VaultStatusChanged {
        vault: vault.config.vault,
        paused: true,
    });

    Ok(())
}

/// Unpause vault operations
pub fn unpause<F, T>(vault: &mut ConfidentialVault<F, T>, caller: &Pubkey) -> Result<()> {
    require_authority(vault, caller)?;
    if !vault.paused {
        return Err(VaultError::VaultNotPaused);
    }

    vault.paused = false;
    info!(vault = %vault.config.vault, "Vault unpaused");
    vault.events.push(VaultEvent::VaultStatusChanged {
        vault: vault.config.vault,
        paused: false,
    });

    Ok(())
}

/// Transfer vault authority to new address
///
/// Existing totals are re-granted so the new authority can decrypt them.
pub fn transfer_authority<F, T>(
    vault: &mut ConfidentialVault<F, T>,
    caller: &Pubkey,
    new_authority: Pubkey,
) -> Result<()>
where
    F: EncryptedCompute,
{
    require_authority(vault, caller)?;
    let previous_authority = *vault.ledger.access().authority();

    vault.ledger.access_mut().set_authority(new_authority);
    vault.config.authority = new_authority;
    vault.ledger.regrant_totals(&mut vault.fhe)?;

    info!(
        vault = %vault.config.vault,
        previous_authority = %previous_authority,
        new_authority = %new_authority,
        "Authority transferred"
    );
    vault.events.push(VaultEvent::AuthorityTransferred {
        vault: vault.config.vault,
        previous_authority,
        new_authority,
    });

    Ok(())
}
