//! Configuration types for sales and consensus wallets.
//!
//! Both configs load from JSON and validate their structural invariants
//! before an engine is constructed from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, OpenraiseError, Result, Tier, Timestamp, constants};

/// How a contribution that crosses the participant's lifetime cap is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapPolicy {
    /// Reject the whole contribution with `CapExceeded`.
    #[default]
    RejectExcess,
    /// Admit the allowed prefix and leave the excess with the sender.
    AdmitPrefix,
}

/// Lifetime contribution caps per participant class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCaps {
    /// Cap for participants not on the whitelist.
    pub base: Amount,
    /// Cap for whitelisted participants.
    pub whitelisted: Amount,
}

impl Default for ParticipantCaps {
    fn default() -> Self {
        Self {
            base: Amount::new(constants::BASE_PARTICIPANT_CAP),
            whitelisted: Amount::new(constants::WHITELISTED_PARTICIPANT_CAP),
        }
    }
}

/// Full configuration of one sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Address of the sale engine's own account (escrow for raised value).
    pub sale_account: Address,
    /// Start of the contribution window (inclusive).
    pub starts_at: Timestamp,
    /// End of the contribution window (exclusive).
    pub ends_at: Timestamp,
    /// Destination of raised funds, unsold tokens and ledger ownership.
    pub payout_wallet: Address,
    /// Trusted operator: drives settlement, moves the cap and end date.
    pub operator: Address,
    /// Trusted signer: maintains the whitelist.
    pub signer: Address,
    /// Token ledger whose units are sold.
    pub token: Address,
    /// Pricing tiers, ascending by boundary. The last boundary is the hard cap.
    pub tiers: Vec<Tier>,
    /// Minimum total raise for the sale to succeed rather than refund.
    pub soft_cap: Amount,
    /// Smallest accepted single contribution.
    pub min_contribution: Amount,
    /// Per-participant lifetime caps, if the sale enforces them.
    pub participant_caps: Option<ParticipantCaps>,
    #[serde(default)]
    pub cap_policy: CapPolicy,
    /// Addresses refused outright (known exchange deposit addresses).
    #[serde(default)]
    pub blacklist: Vec<Address>,
}

impl SaleConfig {
    /// Three-tier sale with whitelist caps of 30 / 60 units.
    ///
    /// An empty `tiers` list selects the default schedule
    /// (4 000 / 50 000 / 200 000 units at 3 750 / 3 300 / 2 888).
    #[must_use]
    pub fn stage_a(
        sale_account: Address,
        starts_at: Timestamp,
        ends_at: Timestamp,
        payout_wallet: Address,
        operator: Address,
        token: Address,
        tiers: Vec<Tier>,
    ) -> Self {
        let tiers = if tiers.is_empty() {
            vec![
                Tier::new(Amount::new(4_000 * constants::UNIT), 3_750),
                Tier::new(Amount::new(50_000 * constants::UNIT), 3_300),
                Tier::new(Amount::new(200_000 * constants::UNIT), 2_888),
            ]
        } else {
            tiers
        };
        Self {
            sale_account,
            starts_at,
            ends_at,
            payout_wallet,
            operator,
            signer: operator,
            token,
            tiers,
            soft_cap: Amount::ZERO,
            min_contribution: Amount::new(constants::MIN_CONTRIBUTION),
            participant_caps: Some(ParticipantCaps::default()),
            cap_policy: CapPolicy::RejectExcess,
            blacklist: Vec::new(),
        }
    }

    /// Up-to-five-tier sale with an exchange blacklist and no participant caps.
    ///
    /// An empty `tiers` list selects the default schedule
    /// (500 / 6 000 / 14 000 / 20 000 units at 7 800 / 7 500 / 7 150 / 6 850).
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn stage_b(
        sale_account: Address,
        starts_at: Timestamp,
        ends_at: Timestamp,
        payout_wallet: Address,
        operator: Address,
        token: Address,
        blacklist: Vec<Address>,
        tiers: Vec<Tier>,
    ) -> Self {
        let tiers = if tiers.is_empty() {
            vec![
                Tier::new(Amount::new(500 * constants::UNIT), 7_800),
                Tier::new(Amount::new(6_000 * constants::UNIT), 7_500),
                Tier::new(Amount::new(14_000 * constants::UNIT), 7_150),
                Tier::new(Amount::new(20_000 * constants::UNIT), 6_850),
            ]
        } else {
            tiers
        };
        Self {
            sale_account,
            starts_at,
            ends_at,
            payout_wallet,
            operator,
            signer: operator,
            token,
            tiers,
            soft_cap: Amount::ZERO,
            min_contribution: Amount::new(constants::MIN_CONTRIBUTION),
            participant_caps: None,
            cap_policy: CapPolicy::RejectExcess,
            blacklist,
        }
    }

    #[must_use]
    pub fn with_soft_cap(mut self, soft_cap: Amount) -> Self {
        self.soft_cap = soft_cap;
        self
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer = signer;
        self
    }

    #[must_use]
    pub fn with_cap_policy(mut self, policy: CapPolicy) -> Self {
        self.cap_policy = policy;
        self
    }

    /// The hard cap implied by the tier list (last boundary).
    #[must_use]
    pub fn hard_cap(&self) -> Amount {
        self.tiers.last().map_or(Amount::ZERO, |t| t.boundary)
    }

    /// Parse and validate a JSON sale configuration.
    ///
    /// # Errors
    /// - `Serialization` if `json` does not describe a `SaleConfig`
    /// - `Configuration` if the parsed config fails [`Self::validate`]
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check structural invariants.
    ///
    /// # Errors
    /// Returns `Configuration` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(OpenraiseError::Configuration(
                "at least one pricing tier is required".to_string(),
            ));
        }
        if self.tiers.len() > constants::MAX_TIERS {
            return Err(OpenraiseError::Configuration(format!(
                "at most {} pricing tiers are supported, got {}",
                constants::MAX_TIERS,
                self.tiers.len()
            )));
        }
        let mut previous = Amount::ZERO;
        for (idx, tier) in self.tiers.iter().enumerate() {
            if tier.boundary <= previous {
                return Err(OpenraiseError::Configuration(format!(
                    "tier {idx} boundary {} must exceed {previous}",
                    tier.boundary
                )));
            }
            if tier.rate == 0 {
                return Err(OpenraiseError::Configuration(format!(
                    "tier {idx} rate must be positive"
                )));
            }
            previous = tier.boundary;
        }
        if self.ends_at <= self.starts_at {
            return Err(OpenraiseError::Configuration(
                "sale must end after it starts".to_string(),
            ));
        }
        if self.soft_cap > self.hard_cap() {
            return Err(OpenraiseError::Configuration(format!(
                "soft cap {} exceeds hard cap {}",
                self.soft_cap,
                self.hard_cap()
            )));
        }
        if self.payout_wallet.is_zero() || self.sale_account.is_zero() {
            return Err(OpenraiseError::Configuration(
                "sale and payout accounts must be non-zero".to_string(),
            ));
        }
        if let Some(caps) = self.participant_caps {
            if caps.base > caps.whitelisted {
                return Err(OpenraiseError::Configuration(
                    "base participant cap exceeds whitelisted cap".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Configuration of a consensus wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// The wallet's own account address.
    pub account: Address,
    /// Initial owners, in order.
    pub owners: Vec<Address>,
    /// Confirmations needed to execute a transaction or change the owner set.
    pub required: usize,
    /// Vesting instant for the time-gated variant.
    #[serde(default)]
    pub vested_at: Option<Timestamp>,
}

impl WalletConfig {
    #[must_use]
    pub fn new(account: Address, owners: Vec<Address>, required: usize) -> Self {
        Self {
            account,
            owners,
            required,
            vested_at: None,
        }
    }

    #[must_use]
    pub fn vested_at(mut self, instant: Timestamp) -> Self {
        self.vested_at = Some(instant);
        self
    }

    /// Parse and validate a JSON wallet configuration.
    ///
    /// # Errors
    /// - `Serialization` if `json` does not describe a `WalletConfig`
    /// - `InvalidRequirement` or `Configuration` if the parsed config fails
    ///   [`Self::validate`]
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check structural invariants.
    ///
    /// # Errors
    /// - `InvalidRequirement` if `required` is outside `1..=owners` or the
    ///   owner count exceeds the maximum
    /// - `Configuration` for duplicate or zero owners
    pub fn validate(&self) -> Result<()> {
        let owners = self.owners.len();
        if owners > constants::MAX_OWNER_COUNT || self.required == 0 || self.required > owners {
            return Err(OpenraiseError::InvalidRequirement {
                required: self.required,
                owners,
            });
        }
        let mut seen = HashSet::with_capacity(owners);
        for owner in &self.owners {
            if owner.is_zero() {
                return Err(OpenraiseError::Configuration(
                    "zero address cannot be an owner".to_string(),
                ));
            }
            if !seen.insert(*owner) {
                return Err(OpenraiseError::Configuration(format!(
                    "duplicate owner {owner}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn stage_a() -> SaleConfig {
        let now = Utc::now();
        SaleConfig::stage_a(
            Address::labelled("sale"),
            now,
            now + Duration::hours(1),
            Address::labelled("wallet"),
            Address::labelled("operator"),
            Address::labelled("token"),
            Vec::new(),
        )
    }

    #[test]
    fn stage_a_defaults() {
        let cfg = stage_a();
        assert_eq!(cfg.tiers.len(), 3);
        assert_eq!(cfg.hard_cap(), Amount::new(200_000 * constants::UNIT));
        assert_eq!(cfg.participant_caps, Some(ParticipantCaps::default()));
        assert_eq!(cfg.signer, cfg.operator);
        cfg.validate().unwrap();
    }

    #[test]
    fn stage_b_defaults() {
        let now = Utc::now();
        let cfg = SaleConfig::stage_b(
            Address::labelled("sale"),
            now,
            now + Duration::hours(1),
            Address::labelled("wallet"),
            Address::labelled("operator"),
            Address::labelled("token"),
            vec![Address::labelled("exchange")],
            Vec::new(),
        );
        assert_eq!(cfg.tiers.len(), 4);
        assert_eq!(cfg.tiers[0].rate, 7_800);
        assert!(cfg.participant_caps.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_non_increasing_tiers() {
        let mut cfg = stage_a();
        cfg.tiers[1].boundary = cfg.tiers[0].boundary;
        assert!(matches!(
            cfg.validate().unwrap_err(),
            OpenraiseError::Configuration(_)
        ));
    }

    #[test]
    fn rejects_too_many_tiers() {
        let mut cfg = stage_a();
        cfg.tiers = (1..=6)
            .map(|i| Tier::new(Amount::new(i * constants::UNIT), 100))
            .collect();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_soft_cap_above_hard_cap() {
        let cfg = stage_a().with_soft_cap(Amount::new(300_000 * constants::UNIT));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_window() {
        let mut cfg = stage_a();
        cfg.ends_at = cfg.starts_at;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sale_config_json_roundtrip() {
        let cfg = stage_a();
        let json = serde_json::to_string(&cfg).unwrap();
        let back = SaleConfig::from_json(&json).unwrap();
        assert_eq!(back.tiers, cfg.tiers);
        assert_eq!(back.ends_at, cfg.ends_at);
    }

    #[test]
    fn wallet_requirement_bounds() {
        let owners = vec![Address::labelled("a"), Address::labelled("b")];
        assert!(WalletConfig::new(Address::labelled("w"), owners.clone(), 2)
            .validate()
            .is_ok());
        assert!(matches!(
            WalletConfig::new(Address::labelled("w"), owners.clone(), 3)
                .validate()
                .unwrap_err(),
            OpenraiseError::InvalidRequirement { required: 3, owners: 2 }
        ));
        assert!(WalletConfig::new(Address::labelled("w"), owners, 0)
            .validate()
            .is_err());
    }

    #[test]
    fn wallet_rejects_duplicate_owner() {
        let a = Address::labelled("a");
        let err = WalletConfig::new(Address::labelled("w"), vec![a, a], 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, OpenraiseError::Configuration(_)));
    }

    #[test]
    fn wallet_from_json() {
        let a = Address::labelled("a");
        let cfg = WalletConfig::new(Address::labelled("w"), vec![a], 1);
        let json = serde_json::to_string(&cfg).unwrap();
        let back = WalletConfig::from_json(&json).unwrap();
        assert_eq!(back.owners, vec![a]);
        assert!(back.vested_at.is_none());
    }

    #[test]
    fn from_json_reports_parse_and_rule_errors() {
        let err = WalletConfig::from_json("{\"owners\": 3}").unwrap_err();
        assert!(matches!(err, OpenraiseError::Serialization(_)));

        let a = Address::labelled("a");
        let cfg = WalletConfig::new(Address::labelled("w"), vec![a, a], 1);
        let json = serde_json::to_string(&cfg).unwrap();
        let err = WalletConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, OpenraiseError::Configuration(_)));

        let err = SaleConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, OpenraiseError::Serialization(_)));
    }
}
