//! Pricing tier: one segment of a cumulative-raise price schedule.

use serde::{Deserialize, Serialize};

use crate::Amount;

/// A `(cumulative boundary, rate)` pair.
///
/// The tier covers raised amounts from the previous tier's boundary
/// (inclusive) up to `boundary` (exclusive). Every smallest native unit
/// contributed inside the tier buys `rate` smallest token units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Cumulative raised amount at which this tier ends.
    pub boundary: Amount,
    /// Token units per native unit inside this tier.
    pub rate: u64,
}

impl Tier {
    #[must_use]
    pub const fn new(boundary: Amount, rate: u64) -> Self {
        Self { boundary, rate }
    }
}
