//! In-process reference backend
//!
//! Keeps plaintexts behind handles and enforces the permission list exactly as
//! the trait contracts describe. Suitable for local runs and tests only: the
//! "ciphertexts" are map entries, not encryptions.

use std::collections::{HashMap, HashSet};

use constant_time_eq::constant_time_eq_32;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use super::{
    DecryptionOracle, EncryptedAmount, EncryptedBool, EncryptedCompute, EncryptedInputVerifier,
    ExternalEncryptedAmount, Handle, InputProof,
};
use crate::{
    constants::{HANDLE_DOMAIN, INPUT_PROOF_DOMAIN, TYPE_BOOL, TYPE_U64},
    error::FheError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plaintext {
    Bool(bool),
    U64(u64),
}

#[derive(Debug, Clone)]
pub struct MockCoprocessor {
    input_key: [u8; 32],
    sequence: u64,
    values: HashMap<Handle, Plaintext>,
    persistent: HashSet<(Handle, Pubkey)>,
    transient: HashSet<(Handle, Pubkey)>,
}

impl MockCoprocessor {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            input_key: blake3::derive_key(INPUT_PROOF_DOMAIN, &seed),
            sequence: 0,
            values: HashMap::new(),
            persistent: HashSet::new(),
            transient: HashSet::new(),
        }
    }

    /// Client-side encryption of an input for `user` calling `contract`.
    ///
    /// Nobody is granted on the returned handle; it only becomes usable through
    /// [`EncryptedInputVerifier::verify`].
    pub fn encrypt_input(
        &mut self,
        contract: &Pubkey,
        user: &Pubkey,
        value: u64,
    ) -> (ExternalEncryptedAmount, InputProof) {
        let handle = self.next_handle(b"input", &[], TYPE_U64);
        self.values.insert(handle, Plaintext::U64(value));
        let proof = InputProof(self.input_tag(&handle, contract, user));
        (ExternalEncryptedAmount(handle), proof)
    }

    /// Number of ciphertexts held by the backend.
    pub fn ciphertext_count(&self) -> usize {
        self.values.len()
    }

    fn next_handle(&mut self, op: &[u8], operands: &[Handle], type_tag: u8) -> Handle {
        self.sequence += 1;
        let mut hasher = blake3::Hasher::new_derive_key(HANDLE_DOMAIN);
        hasher.update(op);
        for operand in operands {
            hasher.update(&operand.0);
        }
        hasher.update(&self.sequence.to_le_bytes());

        let mut bytes = *hasher.finalize().as_bytes();
        bytes[31] = type_tag;
        Handle(bytes)
    }

    fn input_tag(&self, handle: &Handle, contract: &Pubkey, user: &Pubkey) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new_keyed(&self.input_key);
        hasher.update(&handle.0);
        hasher.update(contract.as_ref());
        hasher.update(user.as_ref());
        *hasher.finalize().as_bytes()
    }

    fn store(
        &mut self,
        executor: &Pubkey,
        op: &[u8],
        operands: &[Handle],
        value: Plaintext,
    ) -> Handle {
        let type_tag = match value {
            Plaintext::Bool(_) => TYPE_BOOL,
            Plaintext::U64(_) => TYPE_U64,
        };
        let handle = self.next_handle(op, operands, type_tag);
        self.values.insert(handle, value);
        self.transient.insert((handle, *executor));
        handle
    }

    fn check_access(&self, handle: Handle, principal: &Pubkey) -> Result<(), FheError> {
        if !handle.is_initialized() {
            return Err(FheError::Uninitialized);
        }
        if !self.values.contains_key(&handle) {
            return Err(FheError::UnknownHandle(handle));
        }
        if !self.is_allowed(handle, principal) {
            return Err(FheError::AccessDenied {
                handle,
                principal: *principal,
            });
        }
        Ok(())
    }

    fn load_u64(&self, executor: &Pubkey, value: EncryptedAmount) -> Result<u64, FheError> {
        let handle = value.handle();
        self.check_access(handle, executor)?;
        match self.values.get(&handle) {
            Some(Plaintext::U64(v)) => Ok(*v),
            Some(Plaintext::Bool(_)) => Err(FheError::TypeMismatch(handle)),
            None => Err(FheError::UnknownHandle(handle)),
        }
    }

    fn load_bool(&self, executor: &Pubkey, value: EncryptedBool) -> Result<bool, FheError> {
        let handle = value.handle();
        self.check_access(handle, executor)?;
        match self.values.get(&handle) {
            Some(Plaintext::Bool(b)) => Ok(*b),
            Some(Plaintext::U64(_)) => Err(FheError::TypeMismatch(handle)),
            None => Err(FheError::UnknownHandle(handle)),
        }
    }

    fn plaintext_for(&self, handle: Handle, requester: &Pubkey) -> Result<Plaintext, FheError> {
        let value = self
            .values
            .get(&handle)
            .copied()
            .ok_or(FheError::UnknownHandle(handle))?;
        if !self.is_allowed_persistent(handle, requester) {
            return Err(FheError::AccessDenied {
                handle,
                principal: *requester,
            });
        }
        Ok(value)
    }
}

impl Default for MockCoprocessor {
    fn default() -> Self {
        Self::new([0u8; 32])
    }
}

impl EncryptedCompute for MockCoprocessor {
    fn as_encrypted(&mut self, executor: &Pubkey, value: u64) -> EncryptedAmount {
        EncryptedAmount(self.store(executor, b"trivial", &[], Plaintext::U64(value)))
    }

    fn add(
        &mut self,
        executor: &Pubkey,
        lhs: EncryptedAmount,
        rhs: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError> {
        let sum = self
            .load_u64(executor, lhs)?
            .wrapping_add(self.load_u64(executor, rhs)?);
        let operands = [lhs.handle(), rhs.handle()];
        Ok(EncryptedAmount(self.store(executor, b"add", &operands, Plaintext::U64(sum))))
    }

    fn sub(
        &mut self,
        executor: &Pubkey,
        lhs: EncryptedAmount,
        rhs: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError> {
        let difference = self
            .load_u64(executor, lhs)?
            .wrapping_sub(self.load_u64(executor, rhs)?);
        let operands = [lhs.handle(), rhs.handle()];
        Ok(EncryptedAmount(self.store(
            executor,
            b"sub",
            &operands,
            Plaintext::U64(difference),
        )))
    }

    fn ge(
        &mut self,
        executor: &Pubkey,
        lhs: EncryptedAmount,
        rhs: EncryptedAmount,
    ) -> Result<EncryptedBool, FheError> {
        let result = self.load_u64(executor, lhs)? >= self.load_u64(executor, rhs)?;
        let operands = [lhs.handle(), rhs.handle()];
        Ok(EncryptedBool(self.store(executor, b"ge", &operands, Plaintext::Bool(result))))
    }

    fn select(
        &mut self,
        executor: &Pubkey,
        condition: EncryptedBool,
        if_true: EncryptedAmount,
        if_false: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError> {
        let condition_value = self.load_bool(executor, condition)?;
        let true_value = self.load_u64(executor, if_true)?;
        let false_value = self.load_u64(executor, if_false)?;
        let chosen = if condition_value { true_value } else { false_value };
        let operands = [condition.handle(), if_true.handle(), if_false.handle()];
        Ok(EncryptedAmount(self.store(
            executor,
            b"select",
            &operands,
            Plaintext::U64(chosen),
        )))
    }

    fn allow(
        &mut self,
        executor: &Pubkey,
        handle: Handle,
        principal: &Pubkey,
    ) -> Result<(), FheError> {
        self.check_access(handle, executor)?;
        self.persistent.insert((handle, *principal));
        Ok(())
    }

    fn allow_transient(
        &mut self,
        executor: &Pubkey,
        handle: Handle,
        principal: &Pubkey,
    ) -> Result<(), FheError> {
        self.check_access(handle, executor)?;
        self.transient.insert((handle, *principal));
        Ok(())
    }

    fn is_allowed(&self, handle: Handle, principal: &Pubkey) -> bool {
        let key = (handle, *principal);
        self.persistent.contains(&key) || self.transient.contains(&key)
    }

    fn is_allowed_persistent(&self, handle: Handle, principal: &Pubkey) -> bool {
        self.persistent.contains(&(handle, *principal))
    }

    fn end_transaction(&mut self) {
        debug!(dropped = self.transient.len(), "Clearing transient grants");
        self.transient.clear();
    }
}

impl EncryptedInputVerifier for MockCoprocessor {
    fn verify(
        &mut self,
        contract: &Pubkey,
        user: &Pubkey,
        input: &ExternalEncryptedAmount,
        proof: &InputProof,
    ) -> Result<EncryptedAmount, FheError> {
        let handle = input.0;
        if handle.type_tag() != TYPE_U64 || !self.values.contains_key(&handle) {
            return Err(FheError::InvalidProof);
        }

        let expected = self.input_tag(&handle, contract, user);
        if !constant_time_eq_32(&expected, &proof.0) {
            return Err(FheError::InvalidProof);
        }

        self.transient.insert((handle, *contract));
        Ok(EncryptedAmount(handle))
    }
}

impl DecryptionOracle for MockCoprocessor {
    fn decrypt(&self, handle: Handle, requester: &Pubkey) -> Result<u64, FheError> {
        if !handle.is_initialized() {
            return Ok(0);
        }
        match self.plaintext_for(handle, requester)? {
            Plaintext::U64(v) => Ok(v),
            Plaintext::Bool(_) => Err(FheError::TypeMismatch(handle)),
        }
    }

    fn decrypt_bool(&self, handle: Handle, requester: &Pubkey) -> Result<bool, FheError> {
        if !handle.is_initialized() {
            return Err(FheError::Uninitialized);
        }
        match self.plaintext_for(handle, requester)? {
            Plaintext::Bool(b) => Ok(b),
            Plaintext::U64(_) => Err(FheError::TypeMismatch(handle)),
        }
    }
}
