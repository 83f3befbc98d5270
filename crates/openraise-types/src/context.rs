//! Call context: who is calling and at which instant.
//!
//! Engines never read the wall clock. Every state-changing call receives a
//! [`CallContext`] carrying the caller address and the current timestamp,
//! so time gates are plain comparisons and tests are deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Address;

/// Instant of a call, in UTC.
pub type Timestamp = DateTime<Utc>;

/// The caller of an operation and the instant it is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    pub now: Timestamp,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }

    /// Same instant, different caller.
    #[must_use]
    pub fn with_caller(self, caller: Address) -> Self {
        Self { caller, ..self }
    }

    /// Same caller, different instant.
    #[must_use]
    pub fn at(self, now: Timestamp) -> Self {
        Self { now, ..self }
    }
}
