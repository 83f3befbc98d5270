//! Collaborator seams.
//!
//! The sale engine and the wallet only ever reach a ledger through these
//! traits, so any backing store (in-memory, persistent, remote) can be
//! substituted without touching engine logic.

use openraise_types::{Address, Amount, Result};

/// Native-currency balance book.
pub trait NativeLedger {
    /// Balance of `account`. Unknown accounts hold zero.
    fn balance_of(&self, account: Address) -> Amount;

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// - `InsufficientBalance` if `from` holds less than `amount`
    /// - `InvalidRecipient` if `to` is the zero address
    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()>;

    /// Whether `account` is a contract account rather than an end user.
    fn is_contract(&self, account: Address) -> bool;
}

/// A freezable, ownable fungible token ledger.
///
/// Every mutating call names its caller explicitly; the ledger decides
/// what that caller may do.
pub trait TokenLedger {
    /// Address the ledger is registered under.
    fn address(&self) -> Address;

    fn owner(&self) -> Address;

    fn total_supply(&self) -> Amount;

    fn balance_of(&self, account: Address) -> Amount;

    /// Move `amount` of the caller's own tokens to `to`.
    ///
    /// # Errors
    /// - `LedgerFrozen` if frozen and `caller` is not the owner
    /// - `InvalidRecipient` for the zero address
    /// - `InsufficientBalance` if the caller holds too little
    fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()>;

    /// # Errors
    /// Returns `NotLedgerOwner` unless `caller` owns the ledger.
    fn freeze(&mut self, caller: Address) -> Result<()>;

    /// # Errors
    /// Returns `NotLedgerOwner` unless `caller` owns the ledger.
    fn unfreeze(&mut self, caller: Address) -> Result<()>;

    fn is_frozen(&self) -> bool;

    /// # Errors
    /// - `NotLedgerOwner` unless `caller` owns the ledger
    /// - `InvalidRecipient` if `new_owner` is the zero address
    fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()>;
}

/// Aggregate of every ledger an engine operation may touch.
pub trait Ledgers {
    fn native(&self) -> &dyn NativeLedger;

    fn native_mut(&mut self) -> &mut dyn NativeLedger;

    /// # Errors
    /// Returns `UnknownToken` if no ledger is registered at `token`.
    fn token(&self, token: Address) -> Result<&dyn TokenLedger>;

    /// # Errors
    /// Returns `UnknownToken` if no ledger is registered at `token`.
    fn token_mut(&mut self, token: Address) -> Result<&mut dyn TokenLedger>;
}
