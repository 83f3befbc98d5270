//! Admission kernel: the gate every contribution passes before it is priced.
//!
//! Checks run in a fixed order and the first failure rejects the whole
//! contribution:
//! 1. minimum contribution
//! 2. origin (contract accounts and blacklisted addresses are refused)
//! 3. per-participant lifetime cap, if the sale enforces one
//!
//! The sale window itself is checked by the engine, which owns the clock
//! and the raise state. The kernel also owns the whitelist, maintained by
//! the configured signer.

use std::collections::{BTreeMap, HashSet};

use openraise_ledger::NativeLedger;
use openraise_types::{
    Address, Amount, CapPolicy, OpenraiseError, ParticipantCaps, Result, SaleConfig,
};

/// Hard gate in front of the contribution registry.
#[derive(Debug, Clone)]
pub struct AdmissionKernel {
    /// Smallest accepted contribution.
    min_contribution: Amount,
    /// Lifetime caps, when enforced.
    caps: Option<ParticipantCaps>,
    policy: CapPolicy,
    /// Only this address may sign participants onto the whitelist.
    signer: Address,
    /// Whitelisted participants and the off-chain reference they were signed with.
    whitelist: BTreeMap<Address, String>,
    blacklist: HashSet<Address>,
}

impl AdmissionKernel {
    #[must_use]
    pub fn from_config(config: &SaleConfig) -> Self {
        Self {
            min_contribution: config.min_contribution,
            caps: config.participant_caps,
            policy: config.cap_policy,
            signer: config.signer,
            whitelist: BTreeMap::new(),
            blacklist: config.blacklist.iter().copied().collect(),
        }
    }

    /// Put `participant` on the whitelist. Signing twice overwrites the
    /// recorded reference.
    ///
    /// # Errors
    /// Returns `Unauthorized` unless `caller` is the signer.
    pub fn sign_participant(
        &mut self,
        caller: Address,
        participant: Address,
        reference: &str,
    ) -> Result<()> {
        if caller != self.signer {
            return Err(OpenraiseError::Unauthorized {
                caller,
                action: "sign participant".to_string(),
            });
        }
        self.whitelist.insert(participant, reference.to_string());
        Ok(())
    }

    #[must_use]
    pub fn is_whitelisted(&self, participant: Address) -> bool {
        self.whitelist.contains_key(&participant)
    }

    /// Reference the participant was signed with.
    #[must_use]
    pub fn signature_of(&self, participant: Address) -> Option<&str> {
        self.whitelist.get(&participant).map(String::as_str)
    }

    #[must_use]
    pub fn is_blacklisted(&self, participant: Address) -> bool {
        self.blacklist.contains(&participant)
    }

    /// Lifetime cap for `participant`, or `None` when caps are not enforced.
    #[must_use]
    pub fn participant_limit(&self, participant: Address) -> Option<Amount> {
        self.caps.map(|caps| {
            if self.is_whitelisted(participant) {
                caps.whitelisted
            } else {
                caps.base
            }
        })
    }

    /// How much of `value` the participant's cap still lets in, given what
    /// they have already invested. Without caps the whole value is allowed.
    #[must_use]
    pub fn allowed_contribution(
        &self,
        participant: Address,
        invested: Amount,
        value: Amount,
    ) -> Amount {
        match self.participant_limit(participant) {
            Some(limit) => limit.saturating_sub(invested).min(value),
            None => value,
        }
    }

    /// Run the ordered admission checks. Returns the value the participant
    /// may contribute, which is below `value` only under
    /// [`CapPolicy::AdmitPrefix`].
    ///
    /// # Errors
    /// - `BelowMinimum` when `value`, or the prefix admitted under
    ///   [`CapPolicy::AdmitPrefix`], is under the minimum contribution
    /// - `OriginNotAllowed` for contract accounts and blacklisted senders
    /// - `CapExceeded` when the lifetime cap is exhausted, or would be
    ///   exceeded under [`CapPolicy::RejectExcess`]
    pub fn admit(
        &self,
        native: &dyn NativeLedger,
        sender: Address,
        invested: Amount,
        value: Amount,
    ) -> Result<Amount> {
        // 1. Minimum
        if value < self.min_contribution {
            return Err(OpenraiseError::BelowMinimum {
                minimum: self.min_contribution,
                value,
            });
        }

        // 2. Origin
        if native.is_contract(sender) {
            return Err(OpenraiseError::OriginNotAllowed {
                address: sender,
                reason: "contract account".to_string(),
            });
        }
        if self.is_blacklisted(sender) {
            return Err(OpenraiseError::OriginNotAllowed {
                address: sender,
                reason: "blacklisted".to_string(),
            });
        }

        // 3. Lifetime cap
        let Some(limit) = self.participant_limit(sender) else {
            return Ok(value);
        };
        let allowed = self.allowed_contribution(sender, invested, value);
        let clipped = allowed < value && self.policy == CapPolicy::RejectExcess;
        if allowed.is_zero() || clipped {
            return Err(OpenraiseError::CapExceeded {
                limit,
                invested,
                attempted: value,
            });
        }
        // The floor also binds the admitted prefix.
        if allowed < self.min_contribution {
            return Err(OpenraiseError::BelowMinimum {
                minimum: self.min_contribution,
                value: allowed,
            });
        }
        Ok(allowed)
    }
}
