//! Decrypt-permission propagation
//!
//! Every ciphertext the vault stores or hands back goes through one of these
//! methods. A value without a grant for a principal is noise to that principal,
//! and a stored value without a storage grant is unusable by the vault itself in
//! any later operation.

use solana_sdk::pubkey::Pubkey;
use tracing::trace;

use crate::{
    error::FheError,
    fhe::{EncryptedAmount, EncryptedCompute},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessController {
    vault: Pubkey,
    authority: Pubkey,
    auditor: Option<Pubkey>,
}

impl AccessController {
    pub fn new(vault: Pubkey, authority: Pubkey, auditor: Option<Pubkey>) -> Self {
        Self {
            vault,
            authority,
            auditor,
        }
    }

    pub fn vault(&self) -> &Pubkey {
        &self.vault
    }

    pub fn authority(&self) -> &Pubkey {
        &self.authority
    }

    pub fn auditor(&self) -> Option<&Pubkey> {
        self.auditor.as_ref()
    }

    pub(crate) fn set_authority(&mut self, authority: Pubkey) {
        self.authority = authority;
    }

    /// Permanent access for the vault to a value it is about to persist.
    pub fn grant_storage<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        value: EncryptedAmount,
    ) -> Result<(), FheError> {
        fhe.allow(&self.vault, value.handle(), &self.vault)
    }

    /// Permanent access for the account a value belongs to.
    pub fn grant_owner<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        value: EncryptedAmount,
        account: &Pubkey,
    ) -> Result<(), FheError> {
        trace!(handle = %value, account = %account, "Granting owner access");
        fhe.allow(&self.vault, value.handle(), account)
    }

    /// Access for a collaborator (a token) for the current operation only.
    pub fn grant_transient<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        value: EncryptedAmount,
        principal: &Pubkey,
    ) -> Result<(), FheError> {
        fhe.allow_transient(&self.vault, value.handle(), principal)
    }

    pub fn grant_auditor<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        value: EncryptedAmount,
    ) -> Result<(), FheError> {
        match &self.auditor {
            Some(auditor) => fhe.allow(&self.vault, value.handle(), auditor),
            None => Ok(()),
        }
    }

    pub fn grant_authority<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        value: EncryptedAmount,
    ) -> Result<(), FheError> {
        fhe.allow(&self.vault, value.handle(), &self.authority)
    }

    /// Grants for a stake position value: vault, owner, auditor.
    pub fn persist_position<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        value: EncryptedAmount,
        owner: &Pubkey,
    ) -> Result<(), FheError> {
        self.grant_storage(fhe, value)?;
        self.grant_owner(fhe, value, owner)?;
        self.grant_auditor(fhe, value)
    }

    /// Grants for an asset total: vault, authority, auditor.
    pub fn persist_total<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        value: EncryptedAmount,
    ) -> Result<(), FheError> {
        self.grant_storage(fhe, value)?;
        self.grant_authority(fhe, value)?;
        self.grant_auditor(fhe, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhe::mock::MockCoprocessor;

    fn setup(auditor: Option<Pubkey>) -> (MockCoprocessor, AccessController) {
        let controller = AccessController::new(Pubkey::new_unique(), Pubkey::new_unique(), auditor);
        (MockCoprocessor::default(), controller)
    }

    #[test]
    fn test_persist_position_grants() {
        let auditor = Pubkey::new_unique();
        let (mut fhe, access) = setup(Some(auditor));
        let owner = Pubkey::new_unique();
        let value = fhe.as_encrypted(access.vault(), 10);

        access.persist_position(&mut fhe, value, &owner).unwrap();
        fhe.end_transaction();

        assert!(fhe.is_allowed_persistent(value.handle(), access.vault()));
        assert!(fhe.is_allowed_persistent(value.handle(), &owner));
        assert!(fhe.is_allowed_persistent(value.handle(), &auditor));
        assert!(!fhe.is_allowed_persistent(value.handle(), access.authority()));
    }

    #[test]
    fn test_persist_total_grants() {
        let (mut fhe, access) = setup(None);
        let value = fhe.as_encrypted(access.vault(), 10);

        access.persist_total(&mut fhe, value).unwrap();

        assert!(fhe.is_allowed_persistent(value.handle(), access.vault()));
        assert!(fhe.is_allowed_persistent(value.handle(), access.authority()));
    }

    #[test]
    fn test_transient_grant_is_not_persistent() {
        let (mut fhe, access) = setup(None);
        let token = Pubkey::new_unique();
        let value = fhe.as_encrypted(access.vault(), 10);

        access.grant_transient(&mut fhe, value, &token).unwrap();
        assert!(fhe.is_allowed(value.handle(), &token));

        fhe.end_transaction();
        assert!(!fhe.is_allowed(value.handle(), &token));
    }

    #[test]
    fn test_grant_requires_vault_access() {
        let (mut fhe, access) = setup(None);
        let outsider = Pubkey::new_unique();
        let foreign = fhe.as_encrypted(&outsider, 10);

        let result = access.grant_storage(&mut fhe, foreign);

        assert!(matches!(result, Err(FheError::AccessDenied { .. })));
    }
}
