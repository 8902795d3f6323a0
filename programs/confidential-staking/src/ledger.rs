use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;

use crate::{
    access::AccessController,
    error::FheError,
    fhe::{EncryptedAmount, EncryptedCompute},
    math::{try_decrease, try_increase},
    state::{AssetClass, PositionKey},
};

/// Encrypted stake positions and per-class totals.
///
/// Sole writer of ledger storage. Every write goes through the access controller
/// before it lands, so a stored handle always carries its grants.
#[derive(Debug, Clone)]
pub struct AssetLedger {
    access: AccessController,
    positions: HashMap<PositionKey, EncryptedAmount>,
    totals: [EncryptedAmount; 2],
}

impl AssetLedger {
    pub fn new(access: AccessController) -> Self {
        Self {
            access,
            positions: HashMap::new(),
            totals: [EncryptedAmount::ZERO; 2],
        }
    }

    pub fn access(&self) -> &AccessController {
        &self.access
    }

    pub(crate) fn access_mut(&mut self) -> &mut AccessController {
        &mut self.access
    }

    /// Stored stake, or the reserved zero handle if never written.
    pub fn stake(&self, class: AssetClass, account: &Pubkey) -> EncryptedAmount {
        self.positions
            .get(&PositionKey::new(*account, class))
            .copied()
            .unwrap_or(EncryptedAmount::ZERO)
    }

    pub fn total(&self, class: AssetClass) -> EncryptedAmount {
        self.totals[class.index()]
    }

    /// Number of positions ever written for `class`.
    pub fn position_count(&self, class: AssetClass) -> usize {
        self.positions.keys().filter(|key| key.class == class).count()
    }

    /// Credit a stake and persist it. Returns the new stored stake.
    ///
    /// The overflow flag is dropped: `amount` was already moved by the token, and
    /// a wrapped sum is never stored.
    pub fn increase_stake<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        class: AssetClass,
        account: &Pubkey,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError> {
        let vault = *self.access.vault();
        let (_ok, updated) = try_increase(fhe, &vault, self.stake(class, account), amount)?;
        self.commit_stake(fhe, class, account, updated)?;
        Ok(updated)
    }

    /// Compute a debit without persisting it.
    ///
    /// Returns `(withdrawable, updated_stake)` where `withdrawable` is
    /// `select(ok, amount, 0)`: all or nothing, never a partial amount.
    pub fn decrease_stake<F: EncryptedCompute>(
        &self,
        fhe: &mut F,
        class: AssetClass,
        account: &Pubkey,
        amount: EncryptedAmount,
    ) -> Result<(EncryptedAmount, EncryptedAmount), FheError> {
        let vault = *self.access.vault();
        let (ok, updated) = try_decrease(fhe, &vault, self.stake(class, account), amount)?;
        let zero = fhe.as_encrypted(&vault, 0);
        let withdrawable = fhe.select(&vault, ok, amount, zero)?;
        Ok((withdrawable, updated))
    }

    /// Persist a stake value computed by this ledger.
    pub fn commit_stake<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        class: AssetClass,
        account: &Pubkey,
        updated: EncryptedAmount,
    ) -> Result<(), FheError> {
        self.access.persist_position(fhe, updated, account)?;
        self.positions
            .insert(PositionKey::new(*account, class), updated);
        Ok(())
    }

    pub fn increase_total<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        class: AssetClass,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError> {
        let vault = *self.access.vault();
        let (_ok, updated) = try_increase(fhe, &vault, self.total(class), amount)?;
        self.commit_total(fhe, class, updated)?;
        Ok(updated)
    }

    pub fn decrease_total<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        class: AssetClass,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, FheError> {
        let vault = *self.access.vault();
        let (_ok, updated) = try_decrease(fhe, &vault, self.total(class), amount)?;
        self.commit_total(fhe, class, updated)?;
        Ok(updated)
    }

    /// Re-issue authority and auditor grants on the current totals.
    pub fn regrant_totals<F: EncryptedCompute>(&self, fhe: &mut F) -> Result<(), FheError> {
        for total in self.totals.iter().filter(|total| total.is_initialized()) {
            self.access.persist_total(fhe, *total)?;
        }
        Ok(())
    }

    fn commit_total<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        class: AssetClass,
        updated: EncryptedAmount,
    ) -> Result<(), FheError> {
        self.access.persist_total(fhe, updated)?;
        self.totals[class.index()] = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhe::{mock::MockCoprocessor, DecryptionOracle};

    struct Setup {
        fhe: MockCoprocessor,
        ledger: AssetLedger,
        vault: Pubkey,
    }

    fn setup() -> Setup {
        let vault = Pubkey::new_unique();
        let access = AccessController::new(vault, Pubkey::new_unique(), None);
        Setup {
            fhe: MockCoprocessor::default(),
            ledger: AssetLedger::new(access),
            vault,
        }
    }

    fn amount(s: &mut Setup, value: u64) -> EncryptedAmount {
        s.fhe.as_encrypted(&s.vault, value)
    }

    fn read(s: &Setup, value: EncryptedAmount) -> u64 {
        s.fhe.decrypt(value.handle(), &s.vault).unwrap()
    }

    #[test]
    fn test_unwritten_position_is_zero_handle() {
        let s = setup();
        let account = Pubkey::new_unique();

        assert_eq!(s.ledger.stake(AssetClass::Primary, &account), EncryptedAmount::ZERO);
        assert_eq!(s.ledger.total(AssetClass::Secondary), EncryptedAmount::ZERO);
    }

    #[test]
    fn test_increase_stake_persists_with_grants() {
        let mut s = setup();
        let account = Pubkey::new_unique();
        let deposit = amount(&mut s, 250);

        let stored = s
            .ledger
            .increase_stake(&mut s.fhe, AssetClass::Primary, &account, deposit)
            .unwrap();
        s.fhe.end_transaction();

        assert_eq!(s.ledger.stake(AssetClass::Primary, &account), stored);
        assert_ne!(stored, deposit);
        assert!(s.fhe.is_allowed_persistent(stored.handle(), &s.vault));
        assert!(s.fhe.is_allowed_persistent(stored.handle(), &account));
        assert_eq!(read(&s, stored), 250);
    }

    #[test]
    fn test_classes_are_independent() {
        let mut s = setup();
        let account = Pubkey::new_unique();
        let deposit = amount(&mut s, 40);

        s.ledger
            .increase_stake(&mut s.fhe, AssetClass::Secondary, &account, deposit)
            .unwrap();
        s.ledger
            .increase_total(&mut s.fhe, AssetClass::Secondary, deposit)
            .unwrap();

        assert_eq!(s.ledger.stake(AssetClass::Primary, &account), EncryptedAmount::ZERO);
        assert_eq!(s.ledger.total(AssetClass::Primary), EncryptedAmount::ZERO);
        assert_eq!(read(&s, s.ledger.total(AssetClass::Secondary)), 40);
        assert_eq!(s.ledger.position_count(AssetClass::Secondary), 1);
        assert_eq!(s.ledger.position_count(AssetClass::Primary), 0);
    }

    #[test]
    fn test_decrease_stake_is_all_or_nothing() {
        let mut s = setup();
        let account = Pubkey::new_unique();
        let deposit = amount(&mut s, 100);
        s.ledger
            .increase_stake(&mut s.fhe, AssetClass::Primary, &account, deposit)
            .unwrap();

        let too_much = amount(&mut s, 101);
        let (withdrawable, updated) = s
            .ledger
            .decrease_stake(&mut s.fhe, AssetClass::Primary, &account, too_much)
            .unwrap();
        s.ledger
            .commit_stake(&mut s.fhe, AssetClass::Primary, &account, updated)
            .unwrap();
        s.fhe.allow(&s.vault, withdrawable.handle(), &s.vault).unwrap();

        assert_eq!(read(&s, withdrawable), 0);
        assert_eq!(read(&s, updated), 100);

        let exact = amount(&mut s, 100);
        let (withdrawable, updated) = s
            .ledger
            .decrease_stake(&mut s.fhe, AssetClass::Primary, &account, exact)
            .unwrap();
        s.fhe.allow(&s.vault, withdrawable.handle(), &s.vault).unwrap();
        s.fhe.allow(&s.vault, updated.handle(), &s.vault).unwrap();

        assert_eq!(read(&s, withdrawable), 100);
        assert_eq!(read(&s, updated), 0);
    }

    #[test]
    fn test_decrease_stake_does_not_persist() {
        let mut s = setup();
        let account = Pubkey::new_unique();
        let deposit = amount(&mut s, 100);
        let stored = s
            .ledger
            .increase_stake(&mut s.fhe, AssetClass::Primary, &account, deposit)
            .unwrap();

        let debit = amount(&mut s, 30);
        s.ledger
            .decrease_stake(&mut s.fhe, AssetClass::Primary, &account, debit)
            .unwrap();

        assert_eq!(s.ledger.stake(AssetClass::Primary, &account), stored);
    }

    #[test]
    fn test_totals_follow_amounts() {
        let mut s = setup();
        let a = amount(&mut s, 700);
        let b = amount(&mut s, 200);

        s.ledger.increase_total(&mut s.fhe, AssetClass::Primary, a).unwrap();
        let total = s
            .ledger
            .decrease_total(&mut s.fhe, AssetClass::Primary, b)
            .unwrap();
        s.fhe.end_transaction();

        assert_eq!(read(&s, total), 500);
        assert!(s
            .fhe
            .is_allowed_persistent(total.handle(), s.ledger.access().authority()));
    }

    #[test]
    fn test_stored_values_survive_transaction_boundary() {
        let mut s = setup();
        let account = Pubkey::new_unique();
        let first = amount(&mut s, 5);
        s.ledger
            .increase_stake(&mut s.fhe, AssetClass::Primary, &account, first)
            .unwrap();
        s.fhe.end_transaction();

        let second = amount(&mut s, 6);
        let stored = s
            .ledger
            .increase_stake(&mut s.fhe, AssetClass::Primary, &account, second)
            .unwrap();

        assert_eq!(read(&s, stored), 11);
    }
}
