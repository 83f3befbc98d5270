//! # openraise-ledger
//!
//! **Collaborator Plane**: the ledgers the sale engine and the consensus
//! wallet move value through.
//!
//! ## Architecture
//!
//! Engines never touch balances directly. They call through three small
//! seams:
//! 1. [`NativeLedger`]: native-currency balances plus the contract-account check
//! 2. [`TokenLedger`]: one freezable, ownable fungible token
//! 3. [`Ledgers`]: the aggregate handed into every engine operation
//!
//! [`Chain`] is the in-memory implementation used by tests and embedders.
//! [`SupplyConservation`] checks that token supply is never created or
//! destroyed by settlement, and the vesting collaborators hold allocated
//! tokens until their release instant.

pub mod chain;
pub mod native;
pub mod supply_conservation;
pub mod token;
pub mod traits;
pub mod vesting;

pub use chain::Chain;
pub use native::NativeBank;
pub use supply_conservation::SupplyConservation;
pub use token::FreezableToken;
pub use traits::{Ledgers, NativeLedger, TokenLedger};
pub use vesting::{SimpleTokenVesting, TokenVesting, VestingEntry};
