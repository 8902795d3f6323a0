use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::{
    access::AccessController,
    config::VaultConfig,
    error::{Result, VaultError},
    events::VaultEvent,
    fhe::{EncryptedCompute, EncryptedInputVerifier},
    ledger::AssetLedger,
    state::AssetClass,
    token::ConfidentialToken,
    vault::ConfidentialVault,
};

/// Build a vault over `primary` and `secondary`.
///
/// Both configured asset addresses must be non-zero and match the tokens handed in.
pub fn handler<F, T>(
    config: VaultConfig,
    fhe: F,
    primary: T,
    secondary: T,
) -> Result<ConfidentialVault<F, T>>
where
    F: EncryptedCompute + EncryptedInputVerifier,
    T: ConfidentialToken<F>,
{
    for (class, token) in [(AssetClass::Primary, &primary), (AssetClass::Secondary, &secondary)] {
        let expected = config.asset(class);
        if expected == Pubkey::default() {
            return Err(VaultError::InvalidAsset(class));
        }
        if token.address() != expected {
            return Err(VaultError::AssetMismatch { class, expected });
        }
    }

    let access = AccessController::new(config.vault, config.authority, config.auditor);
    let event = VaultEvent::VaultInitialized {
        vault: config.vault,
        authority: config.authority,
        primary_asset: config.primary_asset,
        secondary_asset: config.secondary_asset,
    };

    info!(
        vault = %config.vault,
        authority = %config.authority,
        primary_asset = %config.primary_asset,
        secondary_asset = %config.secondary_asset,
        "Vault initialized"
    );

    Ok(ConfidentialVault {
        config,
        paused: false,
        ledger: AssetLedger::new(access),
        fhe,
        tokens: [primary, secondary],
        events: vec![event],
    })
}
