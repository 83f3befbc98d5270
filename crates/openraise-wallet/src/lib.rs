//! # openraise-wallet
//!
//! N-of-M consensus custody for the proceeds of a sale.
//!
//! - [`Wallet`]: transaction queue, per-transaction confirmations and
//!   quorum execution of native transfers, token transfers and ledger
//!   administration calls
//! - [`OwnerVotes`]: per-target vote tracks for adding or removing owners
//! - [`ExecutionGate`]: pluggable guard between quorum and execution;
//!   [`Ungated`] for [`MultisigWallet`], [`VestingGate`] for
//!   [`VestedMultisigWallet`]

pub mod gate;
pub mod governance;
pub mod wallet;

pub use gate::{ExecutionGate, Ungated, VestingGate};
pub use governance::OwnerVotes;
pub use wallet::{
    ExecutionOutcome, GovernanceOutcome, MultisigWallet, SubmitReceipt, VestedMultisigWallet,
    Wallet,
};
