//! Supply conservation invariant checker.
//!
//! Invariants checked after settlement:
//! ```text
//! ∀ token:  Σ balances == issued supply
//! native:   Σ balances == Σ genesis credits
//! ```
//!
//! Settlement only ever moves value between accounts. If either sum
//! drifts, value was created or destroyed somewhere.

use std::collections::HashMap;

use openraise_types::{Address, Amount, OpenraiseError, Result};

/// Records issued supply per token and credited native value, then
/// verifies observed totals against them.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total issued per token since creation.
    issued: HashMap<Address, Amount>,
    /// Total native value credited at genesis.
    native_credited: Amount,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token issuance.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the recorded total overflows.
    pub fn record_issue(&mut self, token: Address, amount: Amount) -> Result<()> {
        let entry = self.issued.entry(token).or_default();
        *entry = entry.checked_add(amount)?;
        Ok(())
    }

    /// Record a native genesis credit.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the recorded total overflows.
    pub fn record_native_credit(&mut self, amount: Amount) -> Result<()> {
        self.native_credited = self.native_credited.checked_add(amount)?;
        Ok(())
    }

    #[must_use]
    pub fn expected_supply(&self, token: Address) -> Amount {
        self.issued.get(&token).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn expected_native(&self) -> Amount {
        self.native_credited
    }

    /// Verify that the sum of all holder balances of `token` matches the
    /// recorded issuance.
    ///
    /// # Errors
    /// Returns [`OpenraiseError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify_token(&self, token: Address, actual: Amount) -> Result<()> {
        let expected = self.expected_supply(token);
        if actual != expected {
            tracing::error!(token = %token, %actual, %expected, "token supply drift");
            return Err(OpenraiseError::SupplyInvariantViolation {
                reason: format!("token {token}: held {actual} != issued {expected}"),
            });
        }
        Ok(())
    }

    /// Verify the native total against recorded credits.
    ///
    /// # Errors
    /// Returns [`OpenraiseError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify_native(&self, actual: Amount) -> Result<()> {
        if actual != self.native_credited {
            tracing::error!(%actual, expected = %self.native_credited, "native supply drift");
            return Err(OpenraiseError::SupplyInvariantViolation {
                reason: format!(
                    "native: held {actual} != credited {}",
                    self.native_credited
                ),
            });
        }
        Ok(())
    }

    /// Tokens with recorded issuance.
    #[must_use]
    pub fn tracked_tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<Address> = self.issued.keys().copied().collect();
        tokens.sort();
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chain, Ledgers};
    use openraise_types::units;

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        let token = Address::labelled("token");
        assert_eq!(sc.expected_supply(token), Amount::ZERO);
        assert!(sc.verify_token(token, Amount::ZERO).is_ok());
        assert!(sc.verify_native(Amount::ZERO).is_ok());
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        let token = Address::labelled("token");
        sc.record_issue(token, units("10")).unwrap();
        let err = sc.verify_token(token, units("11")).unwrap_err();
        assert!(matches!(
            err,
            OpenraiseError::SupplyInvariantViolation { .. }
        ));
    }

    #[test]
    fn transfers_do_not_change_supply() {
        let mut chain = Chain::new();
        let mut sc = SupplyConservation::new();
        let creator = Address::labelled("creator");
        let alice = Address::labelled("alice");
        let token = chain.deploy_token(Address::labelled("token"), creator, units("1000"));
        sc.record_issue(token, units("1000")).unwrap();
        chain.bank_mut().credit(alice, units("5")).unwrap();
        sc.record_native_credit(units("5")).unwrap();

        chain.token_mut(token).unwrap().transfer(creator, alice, units("400")).unwrap();
        chain.native_mut().transfer(alice, creator, units("2")).unwrap();

        sc.verify_token(token, chain.token_holdings(token).unwrap()).unwrap();
        sc.verify_native(chain.bank().total().unwrap()).unwrap();
        assert_eq!(sc.tracked_tokens(), vec![token]);
    }
}
