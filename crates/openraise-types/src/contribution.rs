//! Contribution ledger entry for a single participant.

use serde::{Deserialize, Serialize};

use crate::{Amount, Result};

/// Accumulated contribution of one participant.
///
/// Created on the first accepted contribution, updated on every later one,
/// never replaced or deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionEntry {
    /// Native value admitted from this participant.
    pub invested: Amount,
    /// Token units purchased with that value.
    pub tokens: Amount,
}

impl ContributionEntry {
    /// Add an admitted contribution and its token amount.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if either total overflows; the entry is
    /// left unchanged in that case.
    pub fn record(&mut self, invested: Amount, tokens: Amount) -> Result<()> {
        let new_invested = self.invested.checked_add(invested)?;
        let new_tokens = self.tokens.checked_add(tokens)?;
        self.invested = new_invested;
        self.tokens = new_tokens;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accumulates() {
        let mut entry = ContributionEntry::default();
        entry.record(Amount::new(3), Amount::new(30)).unwrap();
        entry.record(Amount::new(2), Amount::new(15)).unwrap();
        assert_eq!(entry.invested, Amount::new(5));
        assert_eq!(entry.tokens, Amount::new(45));
    }

    #[test]
    fn overflow_leaves_entry_untouched() {
        let mut entry = ContributionEntry {
            invested: Amount::new(1),
            tokens: Amount::new(u128::MAX),
        };
        assert!(entry.record(Amount::new(1), Amount::new(1)).is_err());
        assert_eq!(entry.invested, Amount::new(1));
    }
}
