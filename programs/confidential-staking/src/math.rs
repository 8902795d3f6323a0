use solana_sdk::pubkey::Pubkey;

use crate::{
    error::FheError,
    fhe::{EncryptedAmount, EncryptedBool, EncryptedCompute},
};

/// Replace the reserved never-written handle with a fresh encrypted zero.
pub fn materialize<F: EncryptedCompute>(
    fhe: &mut F,
    executor: &Pubkey,
    value: EncryptedAmount,
) -> EncryptedAmount {
    if value.is_initialized() {
        value
    } else {
        fhe.as_encrypted(executor, 0)
    }
}

/// Overflow-safe increase.
///
/// `ok` is the encrypted predicate "current + delta did not wrap". The returned
/// value is `select(ok, current + delta, current)`, so a wrapped sum is never
/// handed back for storage. On overflow a deposit's stake and total are left
/// unchanged even though the token has already moved the funds.
pub fn try_increase<F: EncryptedCompute>(
    fhe: &mut F,
    executor: &Pubkey,
    current: EncryptedAmount,
    delta: EncryptedAmount,
) -> Result<(EncryptedBool, EncryptedAmount), FheError> {
    let current = materialize(fhe, executor, current);
    let sum = fhe.add(executor, current, delta)?;
    let ok = fhe.ge(executor, sum, current)?;
    let result = fhe.select(executor, ok, sum, current)?;
    Ok((ok, result))
}

/// Underflow-safe decrease.
///
/// `ok = current >= delta`; on insufficient funds the value is left unchanged.
pub fn try_decrease<F: EncryptedCompute>(
    fhe: &mut F,
    executor: &Pubkey,
    current: EncryptedAmount,
    delta: EncryptedAmount,
) -> Result<(EncryptedBool, EncryptedAmount), FheError> {
    let current = materialize(fhe, executor, current);
    let ok = fhe.ge(executor, current, delta)?;
    let difference = fhe.sub(executor, current, delta)?;
    let result = fhe.select(executor, ok, difference, current)?;
    Ok((ok, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fhe::{mock::MockCoprocessor, DecryptionOracle};

    fn setup() -> (MockCoprocessor, Pubkey) {
        (MockCoprocessor::default(), Pubkey::new_unique())
    }

    fn reveal(fhe: &mut MockCoprocessor, me: &Pubkey, value: EncryptedAmount) -> u64 {
        fhe.allow(me, value.handle(), me).unwrap();
        fhe.decrypt(value.handle(), me).unwrap()
    }

    fn reveal_flag(fhe: &mut MockCoprocessor, me: &Pubkey, flag: EncryptedBool) -> bool {
        fhe.allow(me, flag.handle(), me).unwrap();
        fhe.decrypt_bool(flag.handle(), me).unwrap()
    }

    #[test]
    fn test_increase() {
        let (mut fhe, me) = setup();
        let current = fhe.as_encrypted(&me, 100);
        let delta = fhe.as_encrypted(&me, 50);

        let (ok, result) = try_increase(&mut fhe, &me, current, delta).unwrap();

        assert!(reveal_flag(&mut fhe, &me, ok));
        assert_eq!(reveal(&mut fhe, &me, result), 150);
    }

    #[test]
    fn test_increase_overflow_keeps_current() {
        let (mut fhe, me) = setup();
        let current = fhe.as_encrypted(&me, u64::MAX - 1);
        let delta = fhe.as_encrypted(&me, 2);

        let (ok, result) = try_increase(&mut fhe, &me, current, delta).unwrap();

        assert!(!reveal_flag(&mut fhe, &me, ok));
        assert_eq!(reveal(&mut fhe, &me, result), u64::MAX - 1);
    }

    #[test]
    fn test_increase_to_exact_max() {
        let (mut fhe, me) = setup();
        let current = fhe.as_encrypted(&me, u64::MAX - 2);
        let delta = fhe.as_encrypted(&me, 2);

        let (ok, result) = try_increase(&mut fhe, &me, current, delta).unwrap();

        assert!(reveal_flag(&mut fhe, &me, ok));
        assert_eq!(reveal(&mut fhe, &me, result), u64::MAX);
    }

    #[test]
    fn test_increase_from_unwritten() {
        let (mut fhe, me) = setup();
        let delta = fhe.as_encrypted(&me, 7);

        let (ok, result) = try_increase(&mut fhe, &me, EncryptedAmount::ZERO, delta).unwrap();

        assert!(reveal_flag(&mut fhe, &me, ok));
        assert_ne!(result, delta);
        assert_eq!(reveal(&mut fhe, &me, result), 7);
    }

    #[test]
    fn test_decrease() {
        let (mut fhe, me) = setup();
        let current = fhe.as_encrypted(&me, 500);
        let delta = fhe.as_encrypted(&me, 200);

        let (ok, result) = try_decrease(&mut fhe, &me, current, delta).unwrap();

        assert!(reveal_flag(&mut fhe, &me, ok));
        assert_eq!(reveal(&mut fhe, &me, result), 300);
    }

    #[test]
    fn test_decrease_to_zero() {
        let (mut fhe, me) = setup();
        let current = fhe.as_encrypted(&me, 500);
        let delta = fhe.as_encrypted(&me, 500);

        let (ok, result) = try_decrease(&mut fhe, &me, current, delta).unwrap();

        assert!(reveal_flag(&mut fhe, &me, ok));
        assert_eq!(reveal(&mut fhe, &me, result), 0);
    }

    #[test]
    fn test_decrease_insufficient_keeps_current() {
        let (mut fhe, me) = setup();
        let current = fhe.as_encrypted(&me, 500);
        let delta = fhe.as_encrypted(&me, 600);

        let (ok, result) = try_decrease(&mut fhe, &me, current, delta).unwrap();

        assert!(!reveal_flag(&mut fhe, &me, ok));
        assert_eq!(reveal(&mut fhe, &me, result), 500);
    }

    #[test]
    fn test_decrease_from_unwritten() {
        let (mut fhe, me) = setup();
        let zero = fhe.as_encrypted(&me, 0);
        let one = fhe.as_encrypted(&me, 1);

        let (ok_zero, _) = try_decrease(&mut fhe, &me, EncryptedAmount::ZERO, zero).unwrap();
        let (ok_one, result) = try_decrease(&mut fhe, &me, EncryptedAmount::ZERO, one).unwrap();

        assert!(reveal_flag(&mut fhe, &me, ok_zero));
        assert!(!reveal_flag(&mut fhe, &me, ok_one));
        assert_eq!(reveal(&mut fhe, &me, result), 0);
    }

    #[test]
    fn test_operands_must_be_usable() {
        let (mut fhe, me) = setup();
        let stranger = Pubkey::new_unique();
        let current = fhe.as_encrypted(&me, 1);
        let delta = fhe.as_encrypted(&stranger, 1);

        let result = try_increase(&mut fhe, &me, current, delta);

        assert!(matches!(result, Err(FheError::AccessDenied { .. })));
    }
}
