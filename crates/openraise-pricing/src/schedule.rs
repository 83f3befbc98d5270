//! Cumulative-raise tier schedule.
//!
//! ```text
//!   raised ─▶ 0 ────── b₀ ────── b₁ ────── … ────── hard cap
//!   rate        r₀        r₁        r₂               0
//! ```
//!
//! A tier covers `[previous boundary, boundary)`. At exactly a boundary the
//! next tier applies. Past the hard cap the rate is zero and any further
//! value is overflow.

use openraise_types::{Amount, OpenraiseError, Result, Tier, constants};

use crate::TokenQuote;

/// Ordered tiers plus the current (possibly lowered) hard cap.
///
/// The configured tiers are never rewritten. The hard cap clips them: a
/// tier's effective boundary is `min(boundary, hard_cap)`, and tiers that
/// start at or above the cap are unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSchedule {
    tiers: Vec<Tier>,
    hard_cap: Amount,
}

impl TierSchedule {
    /// Build a schedule from ascending tiers. The last boundary becomes both
    /// the hard cap and the ceiling it may never be raised past.
    ///
    /// # Errors
    /// Returns `Configuration` for an empty list, more than
    /// [`constants::MAX_TIERS`] tiers, non-increasing boundaries or a zero rate.
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        if tiers.is_empty() || tiers.len() > constants::MAX_TIERS {
            return Err(OpenraiseError::Configuration(format!(
                "tier schedule needs 1..={} tiers, got {}",
                constants::MAX_TIERS,
                tiers.len()
            )));
        }
        let mut previous = Amount::ZERO;
        for tier in &tiers {
            if tier.boundary <= previous || tier.rate == 0 {
                return Err(OpenraiseError::Configuration(format!(
                    "invalid tier (boundary {}, rate {}) after boundary {previous}",
                    tier.boundary, tier.rate
                )));
            }
            previous = tier.boundary;
        }
        Ok(Self {
            tiers,
            hard_cap: previous,
        })
    }

    /// Configured tiers, unclipped.
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    #[must_use]
    pub fn hard_cap(&self) -> Amount {
        self.hard_cap
    }

    /// Ceiling fixed at construction: the last configured boundary.
    #[must_use]
    pub fn original_hard_cap(&self) -> Amount {
        self.tiers.last().map_or(Amount::ZERO, |t| t.boundary)
    }

    /// Effective boundary and rate of the tier containing `raised`, or
    /// `None` once the hard cap is reached.
    fn step_at(&self, raised: Amount) -> Option<(Amount, u64)> {
        if raised >= self.hard_cap {
            return None;
        }
        self.tiers
            .iter()
            .find(|t| t.boundary > raised)
            .map(|t| (t.boundary.min(self.hard_cap), t.rate))
    }

    /// Rate of the tier containing `raised`; zero at or past the hard cap.
    #[must_use]
    pub fn current_rate(&self, raised: Amount) -> u64 {
        self.step_at(raised).map_or(0, |(_, rate)| rate)
    }

    /// Value left before the tier containing `raised` ends.
    #[must_use]
    pub fn wei_limit_of_current_step(&self, raised: Amount) -> Amount {
        self.step_at(raised)
            .map_or(Amount::ZERO, |(boundary, _)| boundary.saturating_sub(raised))
    }

    /// Value left before the hard cap.
    #[must_use]
    pub fn remaining_capacity(&self, raised: Amount) -> Amount {
        self.hard_cap.saturating_sub(raised)
    }

    /// Price `value` contributed on top of `raised`.
    ///
    /// The value is cut at every effective boundary it crosses and each
    /// piece is multiplied by its own tier's rate. Whatever lies beyond the
    /// hard cap is reported as overflow and earns nothing.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the token amount overflows.
    pub fn calculate_token_amount(&self, raised: Amount, value: Amount) -> Result<TokenQuote> {
        let mut cursor = raised;
        let mut remaining = value;
        let mut tokens = Amount::ZERO;
        let mut tiers_touched = 0;

        while !remaining.is_zero() {
            let Some((boundary, rate)) = self.step_at(cursor) else {
                break;
            };
            let part = remaining.min(boundary.saturating_sub(cursor));
            tokens = tokens.checked_add(part.checked_mul_rate(rate)?)?;
            cursor = cursor.checked_add(part)?;
            remaining = remaining.saturating_sub(part);
            tiers_touched += 1;
        }

        let quote = TokenQuote {
            admitted: value.saturating_sub(remaining),
            overflow: remaining,
            tokens,
            tiers_touched,
        };
        tracing::trace!(
            raised = %raised,
            value = %value,
            admitted = %quote.admitted,
            tokens = %quote.tokens,
            tiers = tiers_touched,
            "priced contribution"
        );
        Ok(quote)
    }

    /// Move the hard cap. Returns the previous cap.
    ///
    /// # Errors
    /// Returns `InvalidCap` if `new_cap` is below `raised` or above the
    /// original ceiling.
    pub fn set_hard_cap(&mut self, new_cap: Amount, raised: Amount) -> Result<Amount> {
        let ceiling = self.original_hard_cap();
        if new_cap < raised || new_cap > ceiling {
            return Err(OpenraiseError::InvalidCap {
                requested: new_cap,
                raised,
                ceiling,
            });
        }
        let previous = self.hard_cap;
        self.hard_cap = new_cap;
        Ok(previous)
    }
}
