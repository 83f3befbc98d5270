//! # openraise-types
//!
//! Shared types, errors, and configuration for **OpenRaise**.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`TransactionId`]
//! - **Money / time**: [`Amount`], [`CallContext`], [`Timestamp`]
//! - **Sale model**: [`Tier`], [`ContributionEntry`], [`SalePhase`], [`SettlementOutcome`]
//! - **Wallet model**: [`Transaction`], [`Payload`], [`LedgerCall`], [`OwnerOp`]
//! - **Events**: [`SaleEvent`], [`WalletEvent`], [`VestingEvent`]
//! - **Configuration**: [`SaleConfig`], [`ParticipantCaps`], [`CapPolicy`], [`WalletConfig`]
//! - **Errors**: [`OpenraiseError`] with `OR_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod context;
pub mod contribution;
pub mod error;
pub mod event;
pub mod ids;
pub mod money;
pub mod phase;
pub mod tier;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use openraise_types::{Address, Amount, CallContext, ...};

pub use config::*;
pub use context::*;
pub use contribution::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use money::*;
pub use phase::*;
pub use tier::*;
pub use transaction::*;

// Constants are accessed via `openraise_types::constants::FOO`
// (not re-exported to avoid name collisions).
