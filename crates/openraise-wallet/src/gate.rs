//! Execution gates.
//!
//! A gate sits between "quorum reached" and "value moves". The plain wallet
//! is ungated; the vested wallet keeps every payout closed until its
//! vesting instant. Confirmations are never blocked by a gate, only the
//! execution they would trigger.

use openraise_types::{OpenraiseError, Result, Timestamp};

/// Guard consulted before a confirmed transaction executes.
pub trait ExecutionGate {
    /// Whether execution is allowed at `now`.
    fn is_open(&self, now: Timestamp) -> bool;

    /// Guard an execution attempt.
    ///
    /// # Errors
    /// Returns `NotYetVested` while the gate is closed.
    fn check(&self, now: Timestamp) -> Result<()>;
}

/// Gate that never blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ungated;

impl ExecutionGate for Ungated {
    fn is_open(&self, _now: Timestamp) -> bool {
        true
    }

    fn check(&self, _now: Timestamp) -> Result<()> {
        Ok(())
    }
}

/// Time lock that blocks execution until the vesting instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VestingGate {
    vested_at: Timestamp,
}

impl VestingGate {
    #[must_use]
    pub fn new(vested_at: Timestamp) -> Self {
        Self { vested_at }
    }

    /// The instant from which execution is allowed.
    #[must_use]
    pub fn vested_at(&self) -> Timestamp {
        self.vested_at
    }
}

impl ExecutionGate for VestingGate {
    /// Open at and after the vesting instant.
    fn is_open(&self, now: Timestamp) -> bool {
        now >= self.vested_at
    }

    fn check(&self, now: Timestamp) -> Result<()> {
        if self.is_open(now) {
            Ok(())
        } else {
            Err(OpenraiseError::NotYetVested {
                vested_at: self.vested_at,
            })
        }
    }
}
