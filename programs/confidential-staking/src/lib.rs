//! Confidential staking vault
//!
//! Custody ledger for two confidential tokens. Balances, stakes and totals are
//! ciphertext handles; the vault never sees a plaintext amount and never branches
//! on one. Insufficient funds degrade to an encrypted zero-amount transfer.

pub mod access;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fhe;
pub mod host;
pub mod instructions;
pub mod ledger;
pub mod math;
pub mod state;
pub mod token;
pub mod vault;

pub use config::VaultConfig;
pub use error::{FheError, Result, TokenError, VaultError};
pub use events::VaultEvent;
pub use fhe::{
    mock::MockCoprocessor, DecryptionOracle, EncryptedAmount, EncryptedBool, EncryptedCompute,
    EncryptedInputVerifier, ExternalEncryptedAmount, Handle, InputProof,
};
pub use host::VaultHost;
pub use state::AssetClass;
pub use token::{ConfidentialToken, InMemoryConfidentialToken};
pub use vault::ConfidentialVault;

pub use solana_sdk::pubkey::Pubkey;
