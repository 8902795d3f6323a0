use std::str::FromStr;

use anyhow::{anyhow, Context};
use solana_sdk::pubkey::Pubkey;

use crate::state::AssetClass;

/// Addresses a vault is wired with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// The vault's own principal (executor of its encrypted operations)
    pub vault: Pubkey,
    /// Admin who can pause/unpause and decrypt asset totals
    pub authority: Pubkey,
    /// Optional compliance principal granted on every stake and total
    pub auditor: Option<Pubkey>,
    pub primary_asset: Pubkey,
    pub secondary_asset: Pubkey,
}

impl VaultConfig {
    pub fn asset(&self, class: AssetClass) -> Pubkey {
        match class {
            AssetClass::Primary => self.primary_asset,
            AssetClass::Secondary => self.secondary_asset,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> anyhow::Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> anyhow::Result<Pubkey> {
            let raw = lookup(name).with_context(|| format!("{name} must be set"))?;
            parse_pubkey(name, &raw)
        };

        let auditor = lookup("VAULT_AUDITOR")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_pubkey("VAULT_AUDITOR", &raw))
            .transpose()?;

        Ok(Self {
            vault: required("VAULT_ADDRESS")?,
            authority: required("VAULT_AUTHORITY")?,
            auditor,
            primary_asset: required("PRIMARY_ASSET")?,
            secondary_asset: required("SECONDARY_ASSET")?,
        })
    }
}

fn parse_pubkey(name: &str, raw: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(raw.trim()).map_err(|e| anyhow!("{name} is not a valid base58 pubkey: {e}"))
}
