//! In-memory [`Ledgers`] aggregate: one native bank plus any number of
//! token ledgers keyed by address.

use std::collections::BTreeMap;

use openraise_types::{Address, Amount, OpenraiseError, Result};

use crate::{FreezableToken, Ledgers, NativeBank, NativeLedger, TokenLedger};

#[derive(Debug, Clone, Default)]
pub struct Chain {
    native: NativeBank,
    tokens: BTreeMap<Address, FreezableToken>,
}

impl Chain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token ledger under its own address. The address is
    /// recorded as a contract account.
    pub fn register_token(&mut self, token: FreezableToken) -> Address {
        let address = token.address();
        self.native.mark_contract(address);
        self.tokens.insert(address, token);
        address
    }

    /// Create and register a token with the given supply held by `creator`.
    pub fn deploy_token(&mut self, address: Address, creator: Address, supply: Amount) -> Address {
        self.register_token(FreezableToken::new(address, creator, supply))
    }

    /// Register `account` as a contract account (engine, wallet, vesting).
    pub fn mark_contract(&mut self, account: Address) {
        self.native.mark_contract(account);
    }

    /// Direct access to the native bank, for funding accounts.
    pub fn bank_mut(&mut self) -> &mut NativeBank {
        &mut self.native
    }

    #[must_use]
    pub fn bank(&self) -> &NativeBank {
        &self.native
    }

    /// Concrete token ledger, for calls outside the [`TokenLedger`] seam.
    ///
    /// # Errors
    /// Returns `UnknownToken` if nothing is registered at `token`.
    pub fn freezable_mut(&mut self, token: Address) -> Result<&mut FreezableToken> {
        self.tokens
            .get_mut(&token)
            .ok_or(OpenraiseError::UnknownToken(token))
    }

    /// Sum of all holder balances of `token`.
    ///
    /// # Errors
    /// Returns `UnknownToken` or `ArithmeticOverflow`.
    pub fn token_holdings(&self, token: Address) -> Result<Amount> {
        self.tokens
            .get(&token)
            .ok_or(OpenraiseError::UnknownToken(token))?
            .sum_of_balances()
    }

    /// Native balance shortcut.
    #[must_use]
    pub fn native_balance(&self, account: Address) -> Amount {
        self.native.balance_of(account)
    }

    /// Token balance shortcut. Unknown tokens read as zero.
    #[must_use]
    pub fn token_balance(&self, token: Address, account: Address) -> Amount {
        self.tokens
            .get(&token)
            .map_or(Amount::ZERO, |t| t.balance_of(account))
    }
}

impl Ledgers for Chain {
    fn native(&self) -> &dyn NativeLedger {
        &self.native
    }

    fn native_mut(&mut self) -> &mut dyn NativeLedger {
        &mut self.native
    }

    fn token(&self, token: Address) -> Result<&dyn TokenLedger> {
        self.tokens
            .get(&token)
            .map(|t| t as &dyn TokenLedger)
            .ok_or(OpenraiseError::UnknownToken(token))
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut dyn TokenLedger> {
        self.tokens
            .get_mut(&token)
            .map(|t| t as &mut dyn TokenLedger)
            .ok_or(OpenraiseError::UnknownToken(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openraise_types::units;

    #[test]
    fn deploy_and_lookup() {
        let mut chain = Chain::new();
        let creator = Address::labelled("creator");
        let token = chain.deploy_token(Address::labelled("token"), creator, units("50"));
        assert!(chain.native().is_contract(token));
        assert_eq!(chain.token(token).unwrap().balance_of(creator), units("50"));
        assert_eq!(chain.token_balance(token, creator), units("50"));
    }

    #[test]
    fn unknown_token_errors() {
        let mut chain = Chain::new();
        let missing = Address::labelled("missing");
        assert!(matches!(
            chain.token(missing).err(),
            Some(OpenraiseError::UnknownToken(_))
        ));
        assert!(chain.token_mut(missing).is_err());
        assert_eq!(chain.token_balance(missing, missing), Amount::ZERO);
    }

    #[test]
    fn native_through_seam() {
        let mut chain = Chain::new();
        let alice = Address::labelled("alice");
        let bob = Address::labelled("bob");
        chain.bank_mut().credit(alice, units("3")).unwrap();
        chain.native_mut().transfer(alice, bob, units("1")).unwrap();
        assert_eq!(chain.native_balance(bob), units("1"));
    }
}
