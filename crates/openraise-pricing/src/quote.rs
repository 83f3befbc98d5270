//! Result of pricing one contribution.

use serde::{Deserialize, Serialize};

use openraise_types::Amount;

/// How a contribution splits into a priced part and an overflow part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenQuote {
    /// Value that fits under the hard cap and earns tokens.
    pub admitted: Amount,
    /// Value beyond the hard cap. Earns nothing; returned to the sender.
    pub overflow: Amount,
    /// Token units bought with `admitted`, summed tier by tier.
    pub tokens: Amount,
    /// Number of tiers the admitted value touched.
    pub tiers_touched: usize,
}

impl TokenQuote {
    /// Whether the hard cap cut the contribution short.
    #[must_use]
    pub fn is_clipped(&self) -> bool {
        !self.overflow.is_zero()
    }
}
