//! In-memory native-currency balance book.
//!
//! Tracks one balance per account plus the set of accounts that are
//! contracts. All mutations are atomic: either the full transfer happens
//! or both balances are unchanged.

use std::collections::{HashMap, HashSet};

use openraise_types::{Address, Amount, OpenraiseError, Result};

use crate::NativeLedger;

/// Native balances keyed by account.
///
/// The sale engine escrows contributions here under its own account and
/// forwards them at settlement; the wallet pays out of its account.
#[derive(Debug, Clone, Default)]
pub struct NativeBank {
    balances: HashMap<Address, Amount>,
    contracts: HashSet<Address>,
}

impl NativeBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create value out of thin air (genesis funding of test accounts).
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would overflow.
    pub fn credit(&mut self, account: Address, amount: Amount) -> Result<()> {
        let entry = self.balances.entry(account).or_default();
        *entry = entry.checked_add(amount)?;
        Ok(())
    }

    /// Register `account` as a contract account.
    pub fn mark_contract(&mut self, account: Address) {
        self.contracts.insert(account);
    }

    /// Sum of every balance.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the sum overflows.
    pub fn total(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
    }
}

impl NativeLedger for NativeBank {
    fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(OpenraiseError::InvalidRecipient(to));
        }
        let debited = self.balance_of(from).checked_sub(amount)?;
        if from == to {
            return Ok(());
        }
        let credited = self.balance_of(to).checked_add(amount)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        tracing::trace!(from = %from.short(), to = %to.short(), amount = %amount, "native transfer");
        Ok(())
    }

    fn is_contract(&self, account: Address) -> bool {
        self.contracts.contains(&account)
    }
}
