//! Error types for OpenRaise.
//!
//! All errors use the `OR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Sale admission errors
//! - 2xx: Sale administration errors
//! - 3xx: Settlement errors
//! - 4xx: Wallet transaction errors
//! - 5xx: Owner governance errors
//! - 6xx: Ledger collaborator errors
//! - 7xx: Vesting collaborator errors
//! - 9xx: General / internal errors
//!
//! Every error is a synchronous, all-or-nothing rejection of the call that
//! produced it. Conditions that only await more input (quorum not yet
//! reached, cap not yet hit) are never errors.

use thiserror::Error;

use crate::{Address, Amount, Timestamp, TransactionId};

/// Central error enum for all OpenRaise operations.
#[derive(Debug, Error)]
pub enum OpenraiseError {
    // =================================================================
    // Sale Admission Errors (1xx)
    // =================================================================
    /// The sale window is closed, the hard cap is exhausted, or settlement began.
    #[error("OR_ERR_100: Sale is not open for contributions")]
    NotOpen,

    /// The contribution is below the configured minimum.
    #[error("OR_ERR_101: Contribution below minimum: need {minimum}, got {value}")]
    BelowMinimum { minimum: Amount, value: Amount },

    /// The sender is a contract account or a blacklisted address.
    #[error("OR_ERR_102: Origin not allowed: {address} ({reason})")]
    OriginNotAllowed { address: Address, reason: String },

    /// The contribution would exceed the participant's lifetime cap.
    #[error("OR_ERR_103: Participant cap exceeded: limit {limit}, invested {invested}, attempted {attempted}")]
    CapExceeded {
        limit: Amount,
        invested: Amount,
        attempted: Amount,
    },

    // =================================================================
    // Sale Administration Errors (2xx)
    // =================================================================
    /// The requested hard cap is below the raised amount or above the original ceiling.
    #[error("OR_ERR_200: Invalid hard cap {requested}: raised {raised}, ceiling {ceiling}")]
    InvalidCap {
        requested: Amount,
        raised: Amount,
        ceiling: Amount,
    },

    /// The caller lacks the role required for this action.
    #[error("OR_ERR_201: {caller} is not authorized to {action}")]
    Unauthorized { caller: Address, action: String },

    /// The new end date does not extend the sale window.
    #[error("OR_ERR_202: Invalid end date {requested}: current end is {current}")]
    InvalidEndsDate {
        requested: Timestamp,
        current: Timestamp,
    },

    /// The operation is not allowed once settlement has started.
    #[error("OR_ERR_203: Settlement already in progress")]
    SettlementInProgress,

    // =================================================================
    // Settlement Errors (3xx)
    // =================================================================
    /// Neither the end date nor the hard cap has been reached.
    #[error("OR_ERR_300: Sale cannot be settled yet")]
    NotYetEndable,

    // =================================================================
    // Wallet Transaction Errors (4xx)
    // =================================================================
    /// The caller is not a current wallet owner.
    #[error("OR_ERR_400: Not a wallet owner: {0}")]
    NotOwner(Address),

    /// The owner already confirmed this transaction.
    #[error("OR_ERR_401: {owner} already confirmed {id}")]
    AlreadyConfirmed { id: TransactionId, owner: Address },

    /// The owner has no confirmation on this transaction to revoke.
    #[error("OR_ERR_402: {owner} has not confirmed {id}")]
    NotConfirmed { id: TransactionId, owner: Address },

    /// The transaction was executed; it accepts no further changes.
    #[error("OR_ERR_403: Transaction already executed: {0}")]
    AlreadyExecuted(TransactionId),

    /// No transaction with this id exists.
    #[error("OR_ERR_404: Unknown transaction: {0}")]
    UnknownTransaction(TransactionId),

    /// The wallet does not hold enough of the asset to cover the transaction.
    #[error("OR_ERR_405: Insufficient wallet funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    /// Execution is blocked until the vesting instant.
    #[error("OR_ERR_406: Funds are not vested until {vested_at}")]
    NotYetVested { vested_at: Timestamp },

    // =================================================================
    // Owner Governance Errors (5xx)
    // =================================================================
    /// Required confirmations outside `1..=owners`, or an invalid owner list.
    #[error("OR_ERR_500: Invalid requirement: {required} of {owners} owners")]
    InvalidRequirement { required: usize, owners: usize },

    /// The address is already an owner.
    #[error("OR_ERR_501: Already an owner: {0}")]
    OwnerExists(Address),

    /// The owner already voted for this owner-set change.
    #[error("OR_ERR_502: {voter} already voted for this change of {target}")]
    OwnerVoteAlreadyCast { voter: Address, target: Address },

    // =================================================================
    // Ledger Collaborator Errors (6xx)
    // =================================================================
    /// Not enough balance on a ledger account.
    #[error("OR_ERR_600: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// The token ledger is frozen; only its owner may move tokens.
    #[error("OR_ERR_601: Token ledger is frozen")]
    LedgerFrozen,

    /// The caller does not own the token ledger.
    #[error("OR_ERR_602: {0} does not own the token ledger")]
    NotLedgerOwner(Address),

    /// No token ledger is registered at this address.
    #[error("OR_ERR_603: Unknown token ledger: {0}")]
    UnknownToken(Address),

    /// Transfers to the zero address are rejected.
    #[error("OR_ERR_604: Invalid recipient: {0}")]
    InvalidRecipient(Address),

    /// Integer arithmetic overflowed.
    #[error("OR_ERR_605: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Balances no longer add up to the recorded supply.
    #[error("OR_ERR_606: Supply invariant violated: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Vesting Collaborator Errors (7xx)
    // =================================================================
    /// Allocations would exceed the tokens held by the vesting account.
    #[error("OR_ERR_700: Allocation {requested} exceeds unallocated balance {available}")]
    AllocationExceedsBalance { requested: Amount, available: Amount },

    /// The address has no vesting allocation.
    #[error("OR_ERR_701: Unknown beneficiary: {0}")]
    UnknownBeneficiary(Address),

    /// Nothing is left to release.
    #[error("OR_ERR_702: Nothing to release")]
    NothingToRelease,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OR_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("OR_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("OR_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpenraiseError>;

impl From<serde_json::Error> for OpenraiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = OpenraiseError::UnknownTransaction(TransactionId(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("OR_ERR_404"), "Got: {msg}");
        assert!(msg.contains("tx:7"));
    }

    #[test]
    fn cap_exceeded_display() {
        let err = OpenraiseError::CapExceeded {
            limit: Amount::new(30),
            invested: Amount::new(30),
            attempted: Amount::new(1),
        };
        let msg = format!("{err}");
        assert!(msg.contains("OR_ERR_103"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn serde_json_errors_convert() {
        let parse: std::result::Result<u8, _> = serde_json::from_str("not json");
        let err: OpenraiseError = parse.unwrap_err().into();
        assert!(matches!(err, OpenraiseError::Serialization(_)));
    }

    #[test]
    fn all_errors_have_or_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(OpenraiseError::NotOpen),
            Box::new(OpenraiseError::NotYetEndable),
            Box::new(OpenraiseError::LedgerFrozen),
            Box::new(OpenraiseError::NothingToRelease),
            Box::new(OpenraiseError::NotOwner(Address::ZERO)),
            Box::new(OpenraiseError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OR_ERR_"),
                "Error missing OR_ERR_ prefix: {msg}"
            );
        }
    }
}
