//! # openraise-sale
//!
//! **Sale Engine**: admission control, tiered pricing, contribution
//! accounting and batched settlement.
//!
//! ## Architecture
//!
//! A contribution flows through:
//! 1. The sale window and hard-cap check ([`Crowdsale`])
//! 2. The [`AdmissionKernel`] (minimum, origin, per-participant cap)
//! 3. The tier schedule, which prices it and clips it at the hard cap
//! 4. The [`ContributionRegistry`], which records it
//!
//! After the sale, the [`SettlementCursor`] walks the registry in bounded
//! batches, distributing tokens or refunding value, and hands custody to
//! the payout wallet at the end.

pub mod admission;
pub mod crowdsale;
pub mod registry;
pub mod settlement;

pub use admission::AdmissionKernel;
pub use crowdsale::{ContributionReceipt, Crowdsale};
pub use registry::ContributionRegistry;
pub use settlement::{SettlementCursor, SettlementProgress};
