//! Settlement cursor: durable progress through the contributor list.
//!
//! Settlement may run in one pass or in bounded batches across many calls.
//! The cursor remembers where the last batch stopped, which outcome was
//! decided for the whole sale, and whether the one-time completion step
//! (unsold tokens, escrow, ledger handover) already ran.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use openraise_types::SettlementOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementCursor {
    outcome: SettlementOutcome,
    position: usize,
    total: usize,
    completed: bool,
}

impl SettlementCursor {
    /// Begin settlement over `total` contributors with a fixed outcome.
    #[must_use]
    pub fn start(outcome: SettlementOutcome, total: usize) -> Self {
        Self {
            outcome,
            position: 0,
            total,
            completed: false,
        }
    }

    #[must_use]
    pub fn outcome(&self) -> SettlementOutcome {
        self.outcome
    }

    /// Index of the next contributor to settle.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total - self.position
    }

    /// Indices the next batch of at most `limit` contributors covers.
    #[must_use]
    pub fn next_batch(&self, limit: usize) -> Range<usize> {
        self.position..self.position.saturating_add(limit).min(self.total)
    }

    /// Mark one more contributor settled.
    pub fn advance(&mut self) {
        if self.position < self.total {
            self.position += 1;
        }
    }

    /// Every contributor settled, completion not yet run.
    #[must_use]
    pub fn needs_completion(&self) -> bool {
        self.position == self.total && !self.completed
    }

    pub fn complete(&mut self) {
        self.completed = true;
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// What one settlement call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementProgress {
    pub outcome: SettlementOutcome,
    /// Contributors settled by this call.
    pub processed: usize,
    /// Contributors still waiting after this call.
    pub remaining: usize,
    /// Whether the sale is fully settled.
    pub completed: bool,
}
