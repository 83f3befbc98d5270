//! Observable events emitted by the sale engine, the wallet and the
//! vesting collaborators.
//!
//! Each engine keeps an append-only log of these events. They are the
//! audit trail of every accepted state change: a rejected call emits
//! nothing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, OwnerOp, SettlementOutcome, Timestamp, TransactionId};

/// Events emitted by the sale engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleEvent {
    /// A contribution was admitted (fully or up to the hard cap).
    ContributionAccepted {
        sender: Address,
        admitted: Amount,
        refunded: Amount,
        tokens: Amount,
    },
    /// The signer put a participant on the whitelist.
    ParticipantSigned { participant: Address },
    /// The operator moved the hard cap.
    HardCapChanged { previous: Amount, current: Amount },
    /// The operator extended the sale window.
    EndsDateIncreased {
        previous: Timestamp,
        current: Timestamp,
    },
    /// One contributor was settled (tokens delivered or value refunded).
    ContributorSettled {
        contributor: Address,
        outcome: SettlementOutcome,
        amount: Amount,
    },
    /// The last contributor was settled and custody handed to the payout wallet.
    SettlementCompleted {
        outcome: SettlementOutcome,
        contributors: usize,
        unsold_tokens: Amount,
        forwarded: Amount,
    },
}

impl fmt::Display for SaleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContributionAccepted { .. } => write!(f, "CONTRIBUTION_ACCEPTED"),
            Self::ParticipantSigned { .. } => write!(f, "PARTICIPANT_SIGNED"),
            Self::HardCapChanged { .. } => write!(f, "HARD_CAP_CHANGED"),
            Self::EndsDateIncreased { .. } => write!(f, "ENDS_DATE_INCREASED"),
            Self::ContributorSettled { .. } => write!(f, "CONTRIBUTOR_SETTLED"),
            Self::SettlementCompleted { .. } => write!(f, "SETTLEMENT_COMPLETED"),
        }
    }
}

/// Why an execution attempt was postponed instead of performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferralReason {
    /// The vesting gate is still closed.
    NotYetVested,
    /// The wallet balance no longer covers the transaction.
    InsufficientFunds,
}

impl fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotYetVested => write!(f, "NOT_YET_VESTED"),
            Self::InsufficientFunds => write!(f, "INSUFFICIENT_FUNDS"),
        }
    }
}

/// Events emitted by the consensus wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    Deposit { sender: Address, value: Amount },
    Submission { id: TransactionId },
    Confirmation { owner: Address, id: TransactionId },
    Revocation { owner: Address, id: TransactionId },
    Execution { id: TransactionId },
    ExecutionDeferred {
        id: TransactionId,
        reason: DeferralReason,
    },
    OwnerVote {
        op: OwnerOp,
        voter: Address,
        target: Address,
    },
    OwnerAddition { owner: Address },
    OwnerRemoval { owner: Address },
    RequirementChange { required: usize },
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit { .. } => write!(f, "DEPOSIT"),
            Self::Submission { .. } => write!(f, "SUBMISSION"),
            Self::Confirmation { .. } => write!(f, "CONFIRMATION"),
            Self::Revocation { .. } => write!(f, "REVOCATION"),
            Self::Execution { .. } => write!(f, "EXECUTION"),
            Self::ExecutionDeferred { .. } => write!(f, "EXECUTION_DEFERRED"),
            Self::OwnerVote { .. } => write!(f, "OWNER_VOTE"),
            Self::OwnerAddition { .. } => write!(f, "OWNER_ADDITION"),
            Self::OwnerRemoval { .. } => write!(f, "OWNER_REMOVAL"),
            Self::RequirementChange { .. } => write!(f, "REQUIREMENT_CHANGE"),
        }
    }
}

/// Events emitted by the vesting collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VestingEvent {
    BeneficiaryAdded { beneficiary: Address, amount: Amount },
    BeneficiaryRemoved { beneficiary: Address },
    Released { beneficiary: Address, amount: Amount },
}

impl fmt::Display for VestingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeneficiaryAdded { .. } => write!(f, "BENEFICIARY_ADDED"),
            Self::BeneficiaryRemoved { .. } => write!(f, "BENEFICIARY_REMOVED"),
            Self::Released { .. } => write!(f, "RELEASED"),
        }
    }
}
