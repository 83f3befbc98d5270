//! Consensus wallet transaction model.
//!
//! ## State Machine
//!
//! ```text
//!   submit ┌───────────┐  confirmations >= required  ┌──────────┐
//!   ──────▶│ SUBMITTED ├────────────────────────────▶│ EXECUTED │
//!          └──┬─────▲──┘                             └──────────┘
//!     confirm │     │ revoke
//!             └─────┘
//! ```
//!
//! `EXECUTED` is terminal: no confirmation or revocation is accepted after it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, TransactionId};

/// Administrative call on a token ledger owned by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerCall {
    /// Lift the transfer freeze.
    Unfreeze,
    /// Hand ledger ownership to another account.
    TransferOwnership(Address),
}

/// What a transaction does when it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payload {
    /// Send `value` native currency to `destination`.
    NativeTransfer,
    /// Send `value` units of `token` to `destination`.
    TokenTransfer { token: Address },
    /// Run an administrative call on `token`. Carries no value.
    LedgerCall { token: Address, call: LedgerCall },
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeTransfer => write!(f, "NATIVE_TRANSFER"),
            Self::TokenTransfer { .. } => write!(f, "TOKEN_TRANSFER"),
            Self::LedgerCall {
                call: LedgerCall::Unfreeze,
                ..
            } => write!(f, "LEDGER_UNFREEZE"),
            Self::LedgerCall {
                call: LedgerCall::TransferOwnership(_),
                ..
            } => write!(f, "LEDGER_TRANSFER_OWNERSHIP"),
        }
    }
}

/// A queued wallet transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub destination: Address,
    pub value: Amount,
    pub payload: Payload,
    /// Set exactly once, on successful execution. Terminal.
    pub executed: bool,
}

impl Transaction {
    /// Whether this transaction passes a pending/executed status filter.
    #[must_use]
    pub fn matches(&self, include_pending: bool, include_executed: bool) -> bool {
        (include_pending && !self.executed) || (include_executed && self.executed)
    }
}

/// Direction of an owner-set mutation voted on by the current owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OwnerOp {
    Add,
    Remove,
}

impl fmt::Display for OwnerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "ADD"),
            Self::Remove => write!(f, "REMOVE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(executed: bool) -> Transaction {
        Transaction {
            id: TransactionId(0),
            destination: Address::labelled("dest"),
            value: Amount::new(1),
            payload: Payload::NativeTransfer,
            executed,
        }
    }

    #[test]
    fn status_filter() {
        assert!(tx(false).matches(true, false));
        assert!(!tx(false).matches(false, true));
        assert!(tx(true).matches(false, true));
        assert!(tx(true).matches(true, true));
        assert!(!tx(true).matches(false, false));
    }

    #[test]
    fn payload_display() {
        let token = Address::labelled("token");
        assert_eq!(Payload::NativeTransfer.to_string(), "NATIVE_TRANSFER");
        assert_eq!(
            Payload::LedgerCall {
                token,
                call: LedgerCall::Unfreeze
            }
            .to_string(),
            "LEDGER_UNFREEZE"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let mut t = tx(false);
        t.payload = Payload::TokenTransfer {
            token: Address::labelled("token"),
        };
        let json = serde_json::to_string(&t).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
