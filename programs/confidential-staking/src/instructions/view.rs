use solana_sdk::pubkey::Pubkey;

use crate::{fhe::EncryptedAmount, state::AssetClass, vault::ConfidentialVault};

/// Raw stake handle. Decrypting it takes a grant (owner, vault, auditor).
pub fn get_stake<F, T>(
    vault: &ConfidentialVault<F, T>,
    account: &Pubkey,
    class: AssetClass,
) -> EncryptedAmount {
    vault.ledger.stake(class, account)
}

/// Raw asset total handle. Decryptable by the vault, authority and auditor.
pub fn get_total<F, T>(vault: &ConfidentialVault<F, T>, class: AssetClass) -> EncryptedAmount {
    vault.ledger.total(class)
}

pub fn position_count<F, T>(vault: &ConfidentialVault<F, T>, class: AssetClass) -> usize {
    vault.ledger.position_count(class)
}
