//! # openraise-pricing
//!
//! **Pure tiered pricing for OpenRaise.**
//!
//! The price of a contribution depends only on how much has already been
//! raised. This crate has:
//!
//! - **Zero side effects**: no balances, no clocks, no admission logic
//! - **Exact partitioning**: a contribution straddling tier boundaries is
//!   priced piecewise, never at a blended rate
//! - **Hard-cap clipping**: the operator may lower the ceiling; tiers above
//!   it stop existing until the ceiling is raised again

pub mod quote;
pub mod schedule;

pub use quote::TokenQuote;
pub use schedule::TierSchedule;
