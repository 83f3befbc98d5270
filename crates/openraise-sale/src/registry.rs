//! Contribution registry: per-participant ledger entries plus the ordered
//! list of unique contributors that settlement walks.
//!
//! A participant's slot in the list is fixed at their first accepted
//! contribution and never moves. Entries are only ever added to.

use std::collections::HashMap;

use openraise_types::{Address, Amount, ContributionEntry, Result};

#[derive(Debug, Clone, Default)]
pub struct ContributionRegistry {
    entries: HashMap<Address, ContributionEntry>,
    /// Insertion order of first contributions, no duplicates.
    contributors: Vec<Address>,
}

impl ContributionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an admitted contribution. Returns `true` when this was the
    /// participant's first one.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow`; the registry is unchanged in that case.
    pub fn record(&mut self, participant: Address, invested: Amount, tokens: Amount) -> Result<bool> {
        let mut entry = self.entry(participant);
        entry.record(invested, tokens)?;
        let created = self.entries.insert(participant, entry).is_none();
        if created {
            self.contributors.push(participant);
        }
        Ok(created)
    }

    /// Undo a [`ContributionRegistry::record`] whose follow-up failed.
    pub(crate) fn rollback(
        &mut self,
        participant: Address,
        invested: Amount,
        tokens: Amount,
        created: bool,
    ) {
        if created {
            self.entries.remove(&participant);
            if self.contributors.last() == Some(&participant) {
                self.contributors.pop();
            }
        } else if let Some(entry) = self.entries.get_mut(&participant) {
            entry.invested = entry.invested.saturating_sub(invested);
            entry.tokens = entry.tokens.saturating_sub(tokens);
        }
    }

    /// Current entry, zeroed for unknown participants.
    #[must_use]
    pub fn entry(&self, participant: Address) -> ContributionEntry {
        self.entries.get(&participant).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn invested_amount_of(&self, participant: Address) -> Amount {
        self.entry(participant).invested
    }

    #[must_use]
    pub fn token_amount_of(&self, participant: Address) -> Amount {
        self.entry(participant).tokens
    }

    /// Contributor at `index` in first-contribution order.
    #[must_use]
    pub fn contributor(&self, index: usize) -> Option<Address> {
        self.contributors.get(index).copied()
    }

    #[must_use]
    pub fn contributors(&self) -> &[Address] {
        &self.contributors
    }

    #[must_use]
    pub fn unique_contributors(&self) -> usize {
        self.contributors.len()
    }

    /// Sum of token amounts over `contributors[range]`.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the sum overflows.
    pub fn tokens_in(&self, range: std::ops::Range<usize>) -> Result<Amount> {
        self.sum_in(range, |e| e.tokens)
    }

    /// Sum of invested amounts over `contributors[range]`.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the sum overflows.
    pub fn invested_in(&self, range: std::ops::Range<usize>) -> Result<Amount> {
        self.sum_in(range, |e| e.invested)
    }

    fn sum_in(
        &self,
        range: std::ops::Range<usize>,
        field: impl Fn(&ContributionEntry) -> Amount,
    ) -> Result<Amount> {
        self.contributors
            .get(range)
            .unwrap_or_default()
            .iter()
            .try_fold(Amount::ZERO, |acc, addr| {
                acc.checked_add(field(&self.entry(*addr)))
            })
    }
}
