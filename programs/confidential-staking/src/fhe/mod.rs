//! Encrypted-computation capability
//!
//! The vault depends on an external encrypted-integer library through the traits
//! below. Values are referenced by 32-byte handles; the ciphertexts themselves
//! never leave the backend.

pub mod mock;

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytemuck::{Pod, Zeroable};
use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{TYPE_BOOL, TYPE_U64},
    error::FheError,
};

/// Opaque reference to a ciphertext. The last byte carries the value type.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct Handle(pub [u8; 32]);

impl Handle {
    /// Reserved handle meaning "never written". Not a ciphertext.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn is_initialized(&self) -> bool {
        *self != Self::ZERO
    }

    pub fn type_tag(&self) -> u8 {
        self.0[31]
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(self.0))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({self})")
    }
}

/// Encrypted unsigned 64-bit quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EncryptedAmount(Handle);

impl EncryptedAmount {
    pub const ZERO: Self = Self(Handle::ZERO);

    /// Wraps a handle after checking its type tag.
    pub fn from_handle(handle: Handle) -> Result<Self, FheError> {
        if handle.is_initialized() && handle.type_tag() != TYPE_U64 {
            return Err(FheError::TypeMismatch(handle));
        }
        Ok(Self(handle))
    }

    pub fn handle(&self) -> Handle {
        self.0
    }

    pub fn is_initialized(&self) -> bool {
        self.0.is_initialized()
    }
}

impl fmt::Display for EncryptedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Encrypted predicate (plaintext 0 or 1), used to drive `select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncryptedBool(Handle);

impl EncryptedBool {
    pub fn from_handle(handle: Handle) -> Result<Self, FheError> {
        if !handle.is_initialized() {
            return Err(FheError::Uninitialized);
        }
        if handle.type_tag() != TYPE_BOOL {
            return Err(FheError::TypeMismatch(handle));
        }
        Ok(Self(handle))
    }

    pub fn handle(&self) -> Handle {
        self.0
    }
}

impl fmt::Display for EncryptedBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller-supplied ciphertext, unusable until verified against its proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalEncryptedAmount(pub Handle);

/// Proof binding an external ciphertext to a (contract, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputProof(pub [u8; 32]);

/// Homomorphic operations and the permission list guarding them.
///
/// Every operation names the `executor`, the principal performing it. An executor
/// may only use operands it is allowed on, and each result is transiently allowed
/// to the executor until [`EncryptedCompute::end_transaction`].
pub trait EncryptedCompute {
    /// Trivial encryption of a public constant.
    fn as_encrypted(&mut self, executor: &Pubkey, value: u64) -> EncryptedAmount;

    /// Wrapping addition.
    fn add(
        &mut self,
        executor: &Pubkey,
        lhs: EncryptedAmount,
        rhs: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError>;

    /// Wrapping subtraction.
    fn sub(
        &mut self,
        executor: &Pubkey,
        lhs: EncryptedAmount,
        rhs: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError>;

    /// Encrypted `lhs >= rhs`.
    fn ge(
        &mut self,
        executor: &Pubkey,
        lhs: EncryptedAmount,
        rhs: EncryptedAmount,
    ) -> Result<EncryptedBool, FheError>;

    /// Oblivious choice between two ciphertexts.
    fn select(
        &mut self,
        executor: &Pubkey,
        condition: EncryptedBool,
        if_true: EncryptedAmount,
        if_false: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError>;

    /// Permanent decrypt/use grant. The executor must itself be allowed.
    fn allow(&mut self, executor: &Pubkey, handle: Handle, principal: &Pubkey)
        -> Result<(), FheError>;

    /// Grant that lasts until the end of the current transaction.
    fn allow_transient(
        &mut self,
        executor: &Pubkey,
        handle: Handle,
        principal: &Pubkey,
    ) -> Result<(), FheError>;

    fn is_allowed(&self, handle: Handle, principal: &Pubkey) -> bool;

    fn is_allowed_persistent(&self, handle: Handle, principal: &Pubkey) -> bool;

    /// Drops every transient grant.
    fn end_transaction(&mut self);
}

/// Converts caller-supplied ciphertexts into usable ones.
pub trait EncryptedInputVerifier {
    /// On success the returned amount is transiently allowed to `contract`.
    /// Fails with [`FheError::InvalidProof`] otherwise.
    fn verify(
        &mut self,
        contract: &Pubkey,
        user: &Pubkey,
        input: &ExternalEncryptedAmount,
        proof: &InputProof,
    ) -> Result<EncryptedAmount, FheError>;
}

/// Decryption for external clients. Requires a persistent grant.
pub trait DecryptionOracle {
    fn decrypt(&self, handle: Handle, requester: &Pubkey) -> Result<u64, FheError>;

    fn decrypt_bool(&self, handle: Handle, requester: &Pubkey) -> Result<bool, FheError>;
}
