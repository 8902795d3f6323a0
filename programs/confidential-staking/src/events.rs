use solana_sdk::pubkey::Pubkey;

use crate::{fhe::EncryptedAmount, state::AssetClass};

/// Audit records. Amounts are handles only; they decrypt for grant holders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    VaultInitialized {
        vault: Pubkey,
        authority: Pubkey,
        primary_asset: Pubkey,
        secondary_asset: Pubkey,
    },
    Staked {
        account: Pubkey,
        class: AssetClass,
        amount: EncryptedAmount,
    },
    Unstaked {
        account: Pubkey,
        class: AssetClass,
        amount: EncryptedAmount,
    },
    VaultStatusChanged {
        vault: Pubkey,
        paused: bool,
    },
    AuthorityTransferred {
        vault: Pubkey,
        previous_authority: Pubkey,
        new_authority: Pubkey,
    },
}
