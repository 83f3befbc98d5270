//! Sale lifecycle types.
//!
//! A sale moves through four phases:
//! **PENDING → FUNDING → ENDED → FINALIZED**
//!
//! During FUNDING, contributions are admitted. The sale becomes ENDED once
//! the end date passes or the hard cap is exhausted; settlement may then
//! run, in one pass or in batches. FINALIZED is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a sale, derived from time, raise and settlement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalePhase {
    /// Before the start date.
    Pending,
    /// Inside the window with capacity left.
    Funding,
    /// Window closed or hard cap reached; settlement may run.
    Ended,
    /// Every contributor settled and custody handed over.
    Finalized,
}

impl fmt::Display for SalePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Funding => write!(f, "FUNDING"),
            Self::Ended => write!(f, "ENDED"),
            Self::Finalized => write!(f, "FINALIZED"),
        }
    }
}

/// Global settlement decision, taken once when settlement starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// Soft cap met: every contributor receives their token amount.
    Distribute,
    /// Soft cap missed: every contributor is refunded their invested value.
    Refund,
}

impl fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distribute => write!(f, "DISTRIBUTE"),
            Self::Refund => write!(f, "REFUND"),
        }
    }
}
