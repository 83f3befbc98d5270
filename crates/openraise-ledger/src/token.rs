//! Freezable, ownable fungible token.
//!
//! The creator receives the entire supply and the ledger starts frozen:
//! while frozen, only the owner may move tokens. The sale engine owns the
//! ledger during the sale, distributes from its own balance, then unfreezes
//! it and hands ownership to the payout wallet.

use std::collections::HashMap;

use openraise_types::{Address, Amount, OpenraiseError, Result, constants};

use crate::TokenLedger;

/// In-memory token ledger with freeze and allowance bookkeeping.
#[derive(Debug, Clone)]
pub struct FreezableToken {
    address: Address,
    owner: Address,
    total_supply: Amount,
    frozen: bool,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

impl FreezableToken {
    /// Mint `supply` to `creator`, who becomes the owner. Starts frozen.
    #[must_use]
    pub fn new(address: Address, creator: Address, supply: Amount) -> Self {
        let mut balances = HashMap::new();
        balances.insert(creator, supply);
        Self {
            address,
            owner: creator,
            total_supply: supply,
            frozen: true,
            balances,
            allowances: HashMap::new(),
        }
    }

    /// Same as [`FreezableToken::new`] with the default supply of 10^9 units.
    #[must_use]
    pub fn with_default_supply(address: Address, creator: Address) -> Self {
        Self::new(address, creator, Amount::new(constants::DEFAULT_TOKEN_SUPPLY))
    }

    /// Let `spender` move up to `amount` of the caller's tokens.
    pub fn approve(&mut self, caller: Address, spender: Address, amount: Amount) {
        self.allowances.insert((caller, spender), amount);
    }

    #[must_use]
    pub fn allowance(&self, holder: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(holder, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Move `amount` from `from` to `to` on behalf of `caller`, spending
    /// the caller's allowance.
    ///
    /// # Errors
    /// Same as [`TokenLedger::transfer`], plus `InsufficientBalance` when
    /// the allowance is too small.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.check_movable(caller, to)?;
        let remaining = self.allowance(from, caller).checked_sub(amount)?;
        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, caller), remaining);
        Ok(())
    }

    /// Sum of every holder's balance. Equals `total_supply` unless the
    /// ledger is corrupt.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the sum overflows.
    pub fn sum_of_balances(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
    }

    fn check_movable(&self, caller: Address, to: Address) -> Result<()> {
        if self.frozen && caller != self.owner {
            return Err(OpenraiseError::LedgerFrozen);
        }
        if to.is_zero() {
            return Err(OpenraiseError::InvalidRecipient(to));
        }
        Ok(())
    }

    fn check_owner(&self, caller: Address) -> Result<()> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(OpenraiseError::NotLedgerOwner(caller))
        }
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        let debited = self.balance_of(from).checked_sub(amount)?;
        if from == to {
            return Ok(());
        }
        let credited = self.balance_of(to).checked_add(amount)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl TokenLedger for FreezableToken {
    fn address(&self) -> Address {
        self.address
    }

    fn owner(&self) -> Address {
        self.owner
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.check_movable(caller, to)?;
        self.move_balance(caller, to, amount)?;
        tracing::trace!(token = %self.address.short(), from = %caller.short(), to = %to.short(), amount = %amount, "token transfer");
        Ok(())
    }

    fn freeze(&mut self, caller: Address) -> Result<()> {
        self.check_owner(caller)?;
        self.frozen = true;
        Ok(())
    }

    fn unfreeze(&mut self, caller: Address) -> Result<()> {
        self.check_owner(caller)?;
        self.frozen = false;
        tracing::debug!(token = %self.address.short(), "token ledger unfrozen");
        Ok(())
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.check_owner(caller)?;
        if new_owner.is_zero() {
            return Err(OpenraiseError::InvalidRecipient(new_owner));
        }
        self.owner = new_owner;
        tracing::debug!(token = %self.address.short(), owner = %new_owner, "token ownership passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openraise_types::units;

    fn token() -> (FreezableToken, Address) {
        let creator = Address::labelled("creator");
        (
            FreezableToken::with_default_supply(Address::labelled("token"), creator),
            creator,
        )
    }

    #[test]
    fn creator_holds_full_supply() {
        let (t, creator) = token();
        assert_eq!(t.total_supply(), units("1000000000"));
        assert_eq!(t.balance_of(creator), t.total_supply());
        assert!(t.is_frozen());
    }

    #[test]
    fn owner_can_transfer_while_frozen() {
        let (mut t, creator) = token();
        let alice = Address::labelled("alice");
        t.transfer(creator, alice, units("100")).unwrap();
        assert_eq!(t.balance_of(alice), units("100"));
        assert_eq!(t.balance_of(creator), units("999999900"));
    }

    #[test]
    fn holder_cannot_transfer_while_frozen() {
        let (mut t, creator) = token();
        let alice = Address::labelled("alice");
        t.transfer(creator, alice, units("100")).unwrap();
        let err = t
            .transfer(alice, Address::labelled("bob"), units("1"))
            .unwrap_err();
        assert!(matches!(err, OpenraiseError::LedgerFrozen));

        t.unfreeze(creator).unwrap();
        t.transfer(alice, Address::labelled("bob"), units("1")).unwrap();
    }

    #[test]
    fn transfer_to_zero_rejected() {
        let (mut t, creator) = token();
        assert!(matches!(
            t.transfer(creator, Address::ZERO, Amount::new(100)).unwrap_err(),
            OpenraiseError::InvalidRecipient(_)
        ));
    }

    #[test]
    fn transfer_more_than_balance_fails() {
        let (mut t, creator) = token();
        t.unfreeze(creator).unwrap();
        let alice = Address::labelled("alice");
        let err = t
            .transfer(alice, Address::labelled("bob"), units("1"))
            .unwrap_err();
        assert!(matches!(err, OpenraiseError::InsufficientBalance { .. }));
    }

    #[test]
    fn only_owner_administers() {
        let (mut t, creator) = token();
        let alice = Address::labelled("alice");
        assert!(matches!(
            t.unfreeze(alice).unwrap_err(),
            OpenraiseError::NotLedgerOwner(_)
        ));
        assert!(t.transfer_ownership(alice, alice).is_err());

        t.transfer_ownership(creator, alice).unwrap();
        assert_eq!(t.owner(), alice);
        assert!(t.freeze(creator).is_err());
        t.unfreeze(alice).unwrap();
        assert!(!t.is_frozen());
    }

    #[test]
    fn allowance_transfer_from() {
        let (mut t, creator) = token();
        let spender = Address::labelled("spender");
        let dest = Address::labelled("dest");
        t.unfreeze(creator).unwrap();
        t.approve(creator, spender, units("99"));
        assert_eq!(t.allowance(creator, spender), units("99"));

        assert!(t.transfer_from(spender, creator, dest, units("100")).is_err());
        t.transfer_from(spender, creator, dest, units("90")).unwrap();
        assert_eq!(t.balance_of(dest), units("90"));
        assert_eq!(t.allowance(creator, spender), units("9"));
        assert!(t.transfer_from(spender, creator, Address::ZERO, units("1")).is_err());
    }
}
