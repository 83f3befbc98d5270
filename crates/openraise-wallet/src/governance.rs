//! Owner-set votes.
//!
//! Every add or remove of a target address is its own consensus track,
//! independent of the transaction queue. A track collects the owners who
//! voted for it; the wallet applies the change once the track reaches
//! quorum and then clears it.

use std::collections::{BTreeMap, BTreeSet};

use openraise_types::{Address, OpenraiseError, OwnerOp, Result};

/// Pending owner-set votes keyed by `(operation, target)`.
#[derive(Debug, Clone, Default)]
pub struct OwnerVotes {
    tracks: BTreeMap<(OwnerOp, Address), BTreeSet<Address>>,
}

impl OwnerVotes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `voter`'s vote on `op` for `target`, returning the number
    /// of votes now on that track.
    ///
    /// # Errors
    /// Returns `OwnerVoteAlreadyCast` if `voter` is already on the track.
    pub fn cast(&mut self, op: OwnerOp, voter: Address, target: Address) -> Result<usize> {
        let track = self.tracks.entry((op, target)).or_default();
        if !track.insert(voter) {
            return Err(OpenraiseError::OwnerVoteAlreadyCast { voter, target });
        }
        Ok(track.len())
    }

    /// Voters on a track, in address order.
    #[must_use]
    pub fn voters(&self, op: OwnerOp, target: Address) -> Vec<Address> {
        self.tracks
            .get(&(op, target))
            .map(|track| track.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drop a track once its change has been applied.
    pub fn clear(&mut self, op: OwnerOp, target: Address) {
        self.tracks.remove(&(op, target));
    }

    /// Remove every vote cast by `voter`, dropping tracks left empty.
    pub fn purge_voter(&mut self, voter: Address) {
        self.tracks.retain(|_, track| {
            track.remove(&voter);
            !track.is_empty()
        });
    }

    /// Tracks holding at least `required` votes, in key order.
    #[must_use]
    pub fn at_quorum(&self, required: usize) -> Vec<(OwnerOp, Address)> {
        self.tracks
            .iter()
            .filter(|(_, track)| track.len() >= required)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Number of tracks with at least one vote.
    #[must_use]
    pub fn open_tracks(&self) -> usize {
        self.tracks.len()
    }
}
