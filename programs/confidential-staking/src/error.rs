use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::{fhe::Handle, state::AssetClass};

/// Encrypted-computation failures.
///
/// None of these depend on a plaintext value: they come from access control and
/// handle bookkeeping only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FheError {
    #[error("{principal} is not allowed on ciphertext {handle}")]
    AccessDenied { handle: Handle, principal: Pubkey },

    #[error("Unknown ciphertext handle {0}")]
    UnknownHandle(Handle),

    #[error("Ciphertext handle is uninitialized")]
    Uninitialized,

    #[error("Ciphertext {0} has the wrong type for this operation")]
    TypeMismatch(Handle),

    #[error("Encrypted input does not match its proof")]
    InvalidProof,
}

/// Failures raised by a confidential token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("{spender} is not an operator for {holder}")]
    NotOperator { holder: Pubkey, spender: Pubkey },

    #[error(transparent)]
    Fhe(#[from] FheError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error("Asset address for {0:?} is the zero address")]
    InvalidAsset(AssetClass),

    #[error("Token for {class:?} does not match configured asset {expected}")]
    AssetMismatch { class: AssetClass, expected: Pubkey },

    #[error("Vault is not an approved operator of {account} on {class:?}")]
    OperatorMissing { account: Pubkey, class: AssetClass },

    #[error("Invalid proof data")]
    InvalidProof,

    #[error("Vault cannot hold a position in itself")]
    VaultAsAccount,

    #[error("Vault is paused")]
    VaultPaused,

    #[error("Vault is not paused")]
    VaultNotPaused,

    #[error("Unauthorized - caller is not vault authority")]
    Unauthorized,

    #[error(transparent)]
    Fhe(#[from] FheError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;
