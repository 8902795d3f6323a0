//! Confidential token collaborator
//!
//! [`ConfidentialToken`] is the interface the vault calls. The in-memory token is
//! a reference implementation used for local runs and tests.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::{
    constants::DEFAULT_OPERATOR_WINDOW_SECS,
    error::{FheError, TokenError},
    fhe::{EncryptedAmount, EncryptedCompute},
    math::{try_decrease, try_increase},
};

pub trait ConfidentialToken<F: EncryptedCompute> {
    fn address(&self) -> Pubkey;

    /// Whether `spender` may move `holder`'s balance right now.
    fn is_operator(&self, holder: &Pubkey, spender: &Pubkey) -> bool;

    /// Move `amount` from `from` to `to` on behalf of `spender`.
    ///
    /// Returns the amount actually moved, transiently allowed to `spender`.
    fn confidential_transfer_from(
        &mut self,
        fhe: &mut F,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, TokenError>;

    /// Move `amount` out of the caller's own balance.
    ///
    /// Returns the amount actually sent, transiently allowed to `from`.
    fn confidential_transfer(
        &mut self,
        fhe: &mut F,
        from: &Pubkey,
        to: &Pubkey,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, TokenError>;
}

/// Token with encrypted balances and time-bounded operator approvals.
///
/// A transfer moves `select(balance >= amount, amount, 0)`; it never fails on
/// insufficient funds.
#[derive(Debug, Clone)]
pub struct InMemoryConfidentialToken {
    address: Pubkey,
    balances: HashMap<Pubkey, EncryptedAmount>,
    operators: HashMap<(Pubkey, Pubkey), DateTime<Utc>>,
    total_supply: EncryptedAmount,
}

impl InMemoryConfidentialToken {
    pub fn new(address: Pubkey) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            operators: HashMap::new(),
            total_supply: EncryptedAmount::ZERO,
        }
    }

    /// Also serves [`ConfidentialToken::address`]; callable without naming a backend.
    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn confidential_balance_of(&self, holder: &Pubkey) -> EncryptedAmount {
        self.balances
            .get(holder)
            .copied()
            .unwrap_or(EncryptedAmount::ZERO)
    }

    pub fn confidential_total_supply(&self) -> EncryptedAmount {
        self.total_supply
    }

    /// Approve `operator` on `holder`'s balance until `until` (inclusive).
    pub fn set_operator(&mut self, holder: &Pubkey, operator: &Pubkey, until: DateTime<Utc>) {
        debug!(holder = %holder, operator = %operator, %until, "Operator set");
        self.operators.insert((*holder, *operator), until);
    }

    /// Approve `operator` for the default operator window from now.
    pub fn approve_operator(&mut self, holder: &Pubkey, operator: &Pubkey) -> DateTime<Utc> {
        let until = Utc::now() + Duration::seconds(DEFAULT_OPERATOR_WINDOW_SECS);
        self.set_operator(holder, operator, until);
        until
    }

    pub fn is_operator(&self, holder: &Pubkey, spender: &Pubkey) -> bool {
        self.operator_approved(holder, spender, Utc::now())
    }

    /// Faucet mint of a public amount.
    pub fn mint<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        to: &Pubkey,
        value: u64,
    ) -> Result<EncryptedAmount, TokenError> {
        let token = self.address;
        let amount = fhe.as_encrypted(&token, value);
        let (ok, supply) = try_increase(fhe, &token, self.total_supply, amount)?;
        let zero = fhe.as_encrypted(&token, 0);
        let minted = fhe.select(&token, ok, amount, zero)?;
        let (_, balance) = try_increase(fhe, &token, self.confidential_balance_of(to), minted)?;

        fhe.allow(&token, supply.handle(), &token)?;
        self.total_supply = supply;
        self.store_balance(fhe, to, balance)?;
        fhe.allow(&token, minted.handle(), to)?;
        Ok(minted)
    }

    fn operator_approved(&self, holder: &Pubkey, spender: &Pubkey, now: DateTime<Utc>) -> bool {
        holder == spender
            || self
                .operators
                .get(&(*holder, *spender))
                .is_some_and(|until| now <= *until)
    }

    fn store_balance<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        holder: &Pubkey,
        balance: EncryptedAmount,
    ) -> Result<(), FheError> {
        fhe.allow(&self.address, balance.handle(), &self.address)?;
        fhe.allow(&self.address, balance.handle(), holder)?;
        self.balances.insert(*holder, balance);
        Ok(())
    }

    fn transfer<F: EncryptedCompute>(
        &mut self,
        fhe: &mut F,
        from: &Pubkey,
        to: &Pubkey,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, TokenError> {
        let token = self.address;
        if !fhe.is_allowed(amount.handle(), &token) {
            return Err(FheError::AccessDenied {
                handle: amount.handle(),
                principal: token,
            }
            .into());
        }

        let (ok, from_balance) =
            try_decrease(fhe, &token, self.confidential_balance_of(from), amount)?;
        let zero = fhe.as_encrypted(&token, 0);
        let transferred = fhe.select(&token, ok, amount, zero)?;
        self.store_balance(fhe, from, from_balance)?;

        // Read after the debit is stored so `from == to` nets to zero.
        let (_, to_balance) =
            try_increase(fhe, &token, self.confidential_balance_of(to), transferred)?;
        self.store_balance(fhe, to, to_balance)?;
        fhe.allow(&token, transferred.handle(), &token)?;
        fhe.allow(&token, transferred.handle(), from)?;
        fhe.allow(&token, transferred.handle(), to)?;

        debug!(token = %token, from = %from, to = %to, amount = %transferred, "Confidential transfer");
        Ok(transferred)
    }
}

impl<F: EncryptedCompute> ConfidentialToken<F> for InMemoryConfidentialToken {
    fn address(&self) -> Pubkey {
        InMemoryConfidentialToken::address(self)
    }

    fn is_operator(&self, holder: &Pubkey, spender: &Pubkey) -> bool {
        InMemoryConfidentialToken::is_operator(self, holder, spender)
    }

    fn confidential_transfer_from(
        &mut self,
        fhe: &mut F,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, TokenError> {
        if !self.operator_approved(from, spender, Utc::now()) {
            return Err(TokenError::NotOperator {
                holder: *from,
                spender: *spender,
            });
        }
        let transferred = self.transfer(fhe, from, to, amount)?;
        fhe.allow_transient(&self.address, transferred.handle(), spender)?;
        Ok(transferred)
    }

    fn confidential_transfer(
        &mut self,
        fhe: &mut F,
        from: &Pubkey,
        to: &Pubkey,
        amount: EncryptedAmount,
    ) -> Result<EncryptedAmount, TokenError> {
        let transferred = self.transfer(fhe, from, to, amount)?;
        fhe.allow_transient(&self.address, transferred.handle(), from)?;
        Ok(transferred)
    }
}
