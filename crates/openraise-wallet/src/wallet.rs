//! The consensus wallet.
//!
//! ## Transaction flow
//!
//! ```text
//!   submit ──▶ SUBMITTED ──confirm (count >= required)──▶ gate open, funds cover? ──▶ EXECUTED
//!                 ▲   │                                          │ no
//!                 └───┘ revoke                                   ▼
//!                                                    stays SUBMITTED (deferred, retryable)
//! ```
//!
//! Submission auto-confirms for the submitter. Any confirmation that
//! brings a transaction to quorum tries to execute it in the same call.
//! If the gate is closed or the balance no longer covers the payout, the
//! confirmation stands and execution is deferred; the next confirmation or
//! an explicit [`Wallet::execute`] retries it. A failed outbound transfer
//! aborts the whole call, confirmation included.
//!
//! The owner set is governed by its own vote tracks (see
//! [`OwnerVotes`]); removing an owner purges its confirmations and votes.

use std::collections::{BTreeMap, BTreeSet};

use openraise_ledger::Ledgers;
use openraise_types::{
    Address, Amount, CallContext, DeferralReason, LedgerCall, OpenraiseError, OwnerOp, Payload,
    Result, Timestamp, Transaction, TransactionId, WalletConfig, WalletEvent, constants,
};
use serde::{Deserialize, Serialize};

use crate::{ExecutionGate, OwnerVotes, Ungated, VestingGate};

/// What happened to a transaction after a confirmation or retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// The payout went through; the transaction is terminal.
    Executed,
    /// Quorum not reached yet.
    AwaitingConfirmations { confirmations: usize, required: usize },
    /// Quorum reached, execution postponed.
    Deferred(DeferralReason),
}

impl ExecutionOutcome {
    #[must_use]
    pub fn is_executed(self) -> bool {
        matches!(self, Self::Executed)
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub id: TransactionId,
    /// Outcome of the submitter's automatic confirmation.
    pub outcome: ExecutionOutcome,
}

/// Result of an owner-set vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceOutcome {
    /// Vote recorded; the change needs more votes.
    Pending { votes: usize, required: usize },
    /// The owner set changed.
    Applied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// Gate or funds shortfalls defer execution.
    Deferrable,
    /// Gate or funds shortfalls are errors.
    Strict,
}

/// N-of-M consensus wallet over a pluggable execution gate.
#[derive(Debug, Clone)]
pub struct Wallet<G> {
    account: Address,
    owners: Vec<Address>,
    required: usize,
    transactions: BTreeMap<TransactionId, Transaction>,
    confirmations: BTreeMap<TransactionId, BTreeSet<Address>>,
    next_id: TransactionId,
    votes: OwnerVotes,
    gate: G,
    events: Vec<WalletEvent>,
}

/// Wallet that executes as soon as quorum is reached.
pub type MultisigWallet = Wallet<Ungated>;

/// Wallet that holds every payout until its vesting instant.
pub type VestedMultisigWallet = Wallet<VestingGate>;

impl MultisigWallet {
    /// # Errors
    /// - `InvalidRequirement` / `Configuration` for an invalid owner setup
    /// - `Configuration` if the configuration carries a vesting instant
    pub fn new(config: &WalletConfig) -> Result<Self> {
        if config.vested_at.is_some() {
            return Err(OpenraiseError::Configuration(
                "a vesting instant requires a vested wallet".to_string(),
            ));
        }
        Self::with_gate(config, Ungated)
    }
}

impl VestedMultisigWallet {
    /// # Errors
    /// - `InvalidRequirement` / `Configuration` for an invalid owner setup
    /// - `Configuration` if the configuration has no vesting instant
    pub fn new(config: &WalletConfig) -> Result<Self> {
        let vested_at = config.vested_at.ok_or_else(|| {
            OpenraiseError::Configuration("vested wallet needs a vesting instant".to_string())
        })?;
        Self::with_gate(config, VestingGate::new(vested_at))
    }

    /// Instant from which transactions may execute.
    #[must_use]
    pub fn vested_date(&self) -> Timestamp {
        self.gate.vested_at()
    }
}

impl<G: ExecutionGate> Wallet<G> {
    /// Build a wallet with an explicit gate.
    ///
    /// # Errors
    /// Returns `InvalidRequirement` or `Configuration` if the owner list or
    /// the requirement is invalid.
    pub fn with_gate(config: &WalletConfig, gate: G) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            account = %config.account,
            owners = config.owners.len(),
            required = config.required,
            "wallet created"
        );
        Ok(Self {
            account: config.account,
            owners: config.owners.clone(),
            required: config.required,
            transactions: BTreeMap::new(),
            confirmations: BTreeMap::new(),
            next_id: TransactionId(0),
            votes: OwnerVotes::new(),
            gate,
            events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------
    // Funding
    // -----------------------------------------------------------------

    /// Move `value` native units from the caller into the wallet.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the caller holds less than `value`.
    pub fn deposit(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        value: Amount,
    ) -> Result<()> {
        if value.is_zero() {
            return Ok(());
        }
        ledgers
            .native_mut()
            .transfer(ctx.caller, self.account, value)?;
        self.events.push(WalletEvent::Deposit {
            sender: ctx.caller,
            value,
        });
        tracing::debug!(sender = %ctx.caller, value = %value, "deposit");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------

    /// Queue a transaction and confirm it for the submitter.
    ///
    /// The wallet must already hold `value` of the asset the payload moves.
    /// If the submitter's confirmation reaches quorum the transaction runs
    /// in this call; a failed transfer then discards the whole submission.
    ///
    /// # Errors
    /// - `NotOwner` if the caller is not an owner
    /// - `InvalidRecipient` for a zero destination or new ledger owner
    /// - `Configuration` for a ledger call carrying value
    /// - `UnknownToken` if the payload names an unregistered ledger
    /// - `InsufficientFunds` if the wallet balance does not cover `value`
    /// - any ledger error raised by an immediate execution
    pub fn submit(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        destination: Address,
        value: Amount,
        payload: Payload,
    ) -> Result<SubmitReceipt> {
        self.check_owner(ctx.caller)?;
        if destination.is_zero() {
            return Err(OpenraiseError::InvalidRecipient(destination));
        }
        if let Payload::LedgerCall { call, .. } = payload {
            if !value.is_zero() {
                return Err(OpenraiseError::Configuration(
                    "ledger calls carry no value".to_string(),
                ));
            }
            if let LedgerCall::TransferOwnership(new_owner) = call {
                if new_owner.is_zero() {
                    return Err(OpenraiseError::InvalidRecipient(new_owner));
                }
            }
        }
        self.check_funds(&*ledgers, payload, value).inspect_err(|err| {
            tracing::warn!(submitter = %ctx.caller, payload = %payload, value = %value, error = %err, "submission rejected");
        })?;

        let id = self.next_id;
        let mark = self.events.len();
        self.transactions.insert(
            id,
            Transaction {
                id,
                destination,
                value,
                payload,
                executed: false,
            },
        );
        self.confirmations.insert(id, BTreeSet::new());
        self.next_id = id.next();
        self.events.push(WalletEvent::Submission { id });
        tracing::debug!(id = %id, submitter = %ctx.caller, payload = %payload, destination = %destination, value = %value, "transaction submitted");

        match self.confirm_as(ctx, ledgers, id) {
            Ok(outcome) => Ok(SubmitReceipt { id, outcome }),
            Err(err) => {
                self.transactions.remove(&id);
                self.confirmations.remove(&id);
                self.next_id = id;
                self.events.truncate(mark);
                Err(err)
            }
        }
    }

    /// Queue a native-currency payout.
    ///
    /// # Errors
    /// See [`submit`](Self::submit).
    pub fn submit_transaction(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        destination: Address,
        value: Amount,
    ) -> Result<SubmitReceipt> {
        self.submit(ctx, ledgers, destination, value, Payload::NativeTransfer)
    }

    /// Queue a token payout from the wallet's balance on `token`.
    ///
    /// # Errors
    /// See [`submit`](Self::submit).
    pub fn submit_token_transaction(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        token: Address,
        destination: Address,
        value: Amount,
    ) -> Result<SubmitReceipt> {
        self.submit(
            ctx,
            ledgers,
            destination,
            value,
            Payload::TokenTransfer { token },
        )
    }

    /// Queue an unfreeze of a ledger the wallet owns.
    ///
    /// # Errors
    /// See [`submit`](Self::submit).
    pub fn unfreeze_token(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        token: Address,
    ) -> Result<SubmitReceipt> {
        self.submit(
            ctx,
            ledgers,
            token,
            Amount::ZERO,
            Payload::LedgerCall {
                token,
                call: LedgerCall::Unfreeze,
            },
        )
    }

    /// Queue a hand-over of a ledger the wallet owns.
    ///
    /// # Errors
    /// See [`submit`](Self::submit).
    pub fn pass_ownership(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        token: Address,
        new_owner: Address,
    ) -> Result<SubmitReceipt> {
        self.submit(
            ctx,
            ledgers,
            token,
            Amount::ZERO,
            Payload::LedgerCall {
                token,
                call: LedgerCall::TransferOwnership(new_owner),
            },
        )
    }

    /// Confirm a transaction, executing it if this reaches quorum.
    ///
    /// A closed gate or a funds shortfall at quorum is reported as
    /// [`ExecutionOutcome::Deferred`]; the confirmation is kept.
    ///
    /// # Errors
    /// - `NotOwner`, `UnknownTransaction`, `AlreadyExecuted`, `AlreadyConfirmed`
    /// - any ledger error raised by the execution; the confirmation is then
    ///   discarded
    pub fn confirm(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        id: TransactionId,
    ) -> Result<ExecutionOutcome> {
        self.check_owner(ctx.caller)?;
        self.confirm_as(ctx, ledgers, id)
    }

    /// Withdraw the caller's confirmation of an open transaction.
    ///
    /// # Errors
    /// - `NotOwner`, `UnknownTransaction`, `AlreadyExecuted`
    /// - `NotConfirmed` if the caller has not confirmed `id`
    pub fn revoke(&mut self, ctx: &CallContext, id: TransactionId) -> Result<()> {
        let owner = ctx.caller;
        self.check_owner(owner)?;
        self.check_open(id)?;
        let removed = self
            .confirmations
            .get_mut(&id)
            .is_some_and(|set| set.remove(&owner));
        if !removed {
            return Err(OpenraiseError::NotConfirmed { id, owner });
        }
        self.events.push(WalletEvent::Revocation { owner, id });
        tracing::debug!(id = %id, owner = %owner, "confirmation revoked");
        Ok(())
    }

    /// Retry a transaction without adding a confirmation.
    ///
    /// Below quorum this is a no-op reporting
    /// [`ExecutionOutcome::AwaitingConfirmations`].
    ///
    /// # Errors
    /// - `NotOwner`, `UnknownTransaction`, `AlreadyExecuted`
    /// - `NotYetVested` while the gate is closed
    /// - `InsufficientFunds` if the wallet balance does not cover the payout
    /// - any ledger error raised by the execution
    pub fn execute(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        id: TransactionId,
    ) -> Result<ExecutionOutcome> {
        self.check_owner(ctx.caller)?;
        self.check_open(id)?;
        self.try_execute(ctx.now, ledgers, id, Attempt::Strict)
    }

    fn confirm_as(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        id: TransactionId,
    ) -> Result<ExecutionOutcome> {
        let owner = ctx.caller;
        self.check_open(id)?;
        if !self.confirmations.entry(id).or_default().insert(owner) {
            return Err(OpenraiseError::AlreadyConfirmed { id, owner });
        }
        let mark = self.events.len();
        self.events.push(WalletEvent::Confirmation { owner, id });
        tracing::debug!(id = %id, owner = %owner, confirmations = self.confirmation_count(id), "transaction confirmed");

        self.try_execute(ctx.now, ledgers, id, Attempt::Deferrable)
            .inspect_err(|_| {
                if let Some(set) = self.confirmations.get_mut(&id) {
                    set.remove(&owner);
                }
                self.events.truncate(mark);
            })
    }

    fn try_execute(
        &mut self,
        now: Timestamp,
        ledgers: &mut dyn Ledgers,
        id: TransactionId,
        attempt: Attempt,
    ) -> Result<ExecutionOutcome> {
        let confirmations = self.confirmation_count(id);
        if confirmations < self.required {
            return Ok(ExecutionOutcome::AwaitingConfirmations {
                confirmations,
                required: self.required,
            });
        }
        let tx = self
            .transactions
            .get(&id)
            .cloned()
            .ok_or(OpenraiseError::UnknownTransaction(id))?;

        let ready = self
            .gate
            .check(now)
            .and_then(|()| self.check_funds(&*ledgers, tx.payload, tx.value));
        if let Err(err) = ready {
            let reason = match err {
                OpenraiseError::NotYetVested { .. } if attempt == Attempt::Deferrable => {
                    DeferralReason::NotYetVested
                }
                OpenraiseError::InsufficientFunds { .. } if attempt == Attempt::Deferrable => {
                    DeferralReason::InsufficientFunds
                }
                other => return Err(other),
            };
            self.events
                .push(WalletEvent::ExecutionDeferred { id, reason });
            tracing::warn!(id = %id, reason = %reason, "execution deferred");
            return Ok(ExecutionOutcome::Deferred(reason));
        }

        self.perform(ledgers, &tx)?;
        Ok(ExecutionOutcome::Executed)
    }

    /// Mark executed, then move value; the mark is undone if the move fails.
    fn perform(&mut self, ledgers: &mut dyn Ledgers, tx: &Transaction) -> Result<()> {
        let account = self.account;
        self.set_executed(tx.id, true);

        let moved = match tx.payload {
            Payload::NativeTransfer => {
                ledgers
                    .native_mut()
                    .transfer(account, tx.destination, tx.value)
            }
            Payload::TokenTransfer { token } => ledgers
                .token_mut(token)
                .and_then(|ledger| ledger.transfer(account, tx.destination, tx.value)),
            Payload::LedgerCall { token, call } => {
                ledgers.token_mut(token).and_then(|ledger| match call {
                    LedgerCall::Unfreeze => ledger.unfreeze(account),
                    LedgerCall::TransferOwnership(new_owner) => {
                        ledger.transfer_ownership(account, new_owner)
                    }
                })
            }
        };
        if let Err(err) = moved {
            self.set_executed(tx.id, false);
            tracing::warn!(id = %tx.id, payload = %tx.payload, error = %err, "execution failed");
            return Err(err);
        }

        self.events.push(WalletEvent::Execution { id: tx.id });
        tracing::info!(
            id = %tx.id,
            payload = %tx.payload,
            destination = %tx.destination,
            value = %tx.value,
            "transaction executed"
        );
        Ok(())
    }

    fn set_executed(&mut self, id: TransactionId, executed: bool) {
        if let Some(tx) = self.transactions.get_mut(&id) {
            tx.executed = executed;
        }
    }

    fn check_funds(&self, ledgers: &dyn Ledgers, payload: Payload, value: Amount) -> Result<()> {
        let available = match payload {
            Payload::NativeTransfer => ledgers.native().balance_of(self.account),
            Payload::TokenTransfer { token } => ledgers.token(token)?.balance_of(self.account),
            Payload::LedgerCall { token, .. } => {
                ledgers.token(token)?;
                return Ok(());
            }
        };
        if value > available {
            return Err(OpenraiseError::InsufficientFunds {
                needed: value,
                available,
            });
        }
        Ok(())
    }

    fn check_owner(&self, caller: Address) -> Result<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(OpenraiseError::NotOwner(caller))
        }
    }

    fn check_open(&self, id: TransactionId) -> Result<()> {
        match self.transactions.get(&id) {
            None => Err(OpenraiseError::UnknownTransaction(id)),
            Some(tx) if tx.executed => Err(OpenraiseError::AlreadyExecuted(id)),
            Some(_) => Ok(()),
        }
    }

    // -----------------------------------------------------------------
    // Owner governance
    // -----------------------------------------------------------------

    /// Vote to add `owner`. Applied once the votes reach `required`.
    ///
    /// # Errors
    /// - `NotOwner` if the caller is not an owner
    /// - `InvalidRecipient` for the zero address
    /// - `OwnerExists` if `owner` already is one
    /// - `InvalidRequirement` if the owner set is full
    /// - `OwnerVoteAlreadyCast` on a repeated vote
    pub fn add_owner(&mut self, ctx: &CallContext, owner: Address) -> Result<GovernanceOutcome> {
        let voter = ctx.caller;
        self.check_owner(voter)?;
        if owner.is_zero() {
            return Err(OpenraiseError::InvalidRecipient(owner));
        }
        if self.is_owner(owner) {
            return Err(OpenraiseError::OwnerExists(owner));
        }
        if self.owners.len() >= constants::MAX_OWNER_COUNT {
            return Err(OpenraiseError::InvalidRequirement {
                required: self.required,
                owners: self.owners.len() + 1,
            });
        }

        let votes = self.votes.cast(OwnerOp::Add, voter, owner)?;
        self.events.push(WalletEvent::OwnerVote {
            op: OwnerOp::Add,
            voter,
            target: owner,
        });
        if votes < self.required {
            tracing::debug!(target_owner = %owner, voter = %voter, votes, required = self.required, "owner addition vote");
            return Ok(GovernanceOutcome::Pending {
                votes,
                required: self.required,
            });
        }

        self.apply_addition(owner);
        Ok(GovernanceOutcome::Applied)
    }

    /// Vote to remove `owner`. Applied once the votes reach `required`.
    ///
    /// On removal the owner's confirmations and pending votes are purged,
    /// and `required` is lowered to the owner count if it now exceeds it.
    /// Other add or remove tracks whose votes meet the lowered requirement
    /// are applied in the same call.
    ///
    /// # Errors
    /// - `NotOwner` if the caller or `owner` is not an owner
    /// - `InvalidRequirement` if `owner` is the last owner
    /// - `OwnerVoteAlreadyCast` on a repeated vote
    pub fn remove_owner(
        &mut self,
        ctx: &CallContext,
        owner: Address,
    ) -> Result<GovernanceOutcome> {
        let voter = ctx.caller;
        self.check_owner(voter)?;
        self.check_owner(owner)?;
        if self.owners.len() == 1 {
            return Err(OpenraiseError::InvalidRequirement {
                required: self.required,
                owners: 0,
            });
        }

        let votes = self.votes.cast(OwnerOp::Remove, voter, owner)?;
        self.events.push(WalletEvent::OwnerVote {
            op: OwnerOp::Remove,
            voter,
            target: owner,
        });
        if votes < self.required {
            tracing::debug!(target_owner = %owner, voter = %voter, votes, required = self.required, "owner removal vote");
            return Ok(GovernanceOutcome::Pending {
                votes,
                required: self.required,
            });
        }

        self.apply_removal(owner);
        self.apply_ready_tracks();
        Ok(GovernanceOutcome::Applied)
    }

    fn apply_addition(&mut self, owner: Address) {
        self.owners.push(owner);
        self.votes.clear(OwnerOp::Add, owner);
        self.events.push(WalletEvent::OwnerAddition { owner });
        tracing::info!(owner = %owner, owners = self.owners.len(), "owner added");
    }

    fn apply_removal(&mut self, owner: Address) {
        self.owners.retain(|existing| *existing != owner);
        self.votes.clear(OwnerOp::Remove, owner);
        self.votes.purge_voter(owner);
        let mut purged = 0_usize;
        for set in self.confirmations.values_mut() {
            if set.remove(&owner) {
                purged += 1;
            }
        }
        self.events.push(WalletEvent::OwnerRemoval { owner });

        if self.required > self.owners.len() {
            self.required = self.owners.len();
            self.events.push(WalletEvent::RequirementChange {
                required: self.required,
            });
        }
        tracing::info!(
            owner = %owner,
            purged_confirmations = purged,
            owners = self.owners.len(),
            required = self.required,
            "owner removed"
        );
    }

    /// Apply every vote track that meets the current requirement.
    ///
    /// A removal can lower `required` below the votes already cast on
    /// another track. Runs until no track changes the owner set, since an
    /// applied removal may lower the requirement again. Tracks that no
    /// longer pass the owner-set checks stay open.
    fn apply_ready_tracks(&mut self) {
        loop {
            let mut applied = false;
            for (op, target) in self.votes.at_quorum(self.required) {
                match op {
                    OwnerOp::Add => {
                        if self.is_owner(target) || self.owners.len() >= constants::MAX_OWNER_COUNT
                        {
                            continue;
                        }
                        self.apply_addition(target);
                    }
                    OwnerOp::Remove => {
                        if !self.is_owner(target) || self.owners.len() == 1 {
                            continue;
                        }
                        self.apply_removal(target);
                    }
                }
                applied = true;
                // The requirement and the tracks may have moved; rescan.
                break;
            }
            if !applied {
                break;
            }
        }
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    #[must_use]
    pub fn account(&self) -> Address {
        self.account
    }

    /// Current owners, in the order they joined.
    #[must_use]
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    #[must_use]
    pub fn is_owner(&self, address: Address) -> bool {
        self.owners.contains(&address)
    }

    #[must_use]
    pub fn required(&self) -> usize {
        self.required
    }

    #[must_use]
    pub fn gate(&self) -> &G {
        &self.gate
    }

    #[must_use]
    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    /// Owners who confirmed `id`, in owner order.
    #[must_use]
    pub fn confirmations(&self, id: TransactionId) -> Vec<Address> {
        let Some(set) = self.confirmations.get(&id) else {
            return Vec::new();
        };
        self.owners
            .iter()
            .filter(|owner| set.contains(owner))
            .copied()
            .collect()
    }

    #[must_use]
    pub fn confirmation_count(&self, id: TransactionId) -> usize {
        self.confirmations.get(&id).map_or(0, BTreeSet::len)
    }

    /// Whether `id` has reached quorum.
    #[must_use]
    pub fn is_confirmed(&self, id: TransactionId) -> bool {
        self.confirmation_count(id) >= self.required
    }

    /// Transactions carrying a confirmation from `owner`.
    #[must_use]
    pub fn confirmed_transactions_of(&self, owner: Address) -> Vec<TransactionId> {
        self.confirmations
            .iter()
            .filter(|(_, set)| set.contains(&owner))
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn owners_confirmed_owner_add(&self, target: Address) -> Vec<Address> {
        self.votes.voters(OwnerOp::Add, target)
    }

    #[must_use]
    pub fn owners_confirmed_owner_remove(&self, target: Address) -> Vec<Address> {
        self.votes.voters(OwnerOp::Remove, target)
    }

    /// Ids passing the status filter, sliced to positions `from..to` of
    /// the filtered list.
    #[must_use]
    pub fn transaction_ids(
        &self,
        from: usize,
        to: usize,
        pending: bool,
        executed: bool,
    ) -> Vec<TransactionId> {
        self.transactions
            .values()
            .filter(|tx| tx.matches(pending, executed))
            .map(|tx| tx.id)
            .skip(from)
            .take(to.saturating_sub(from))
            .collect()
    }

    #[must_use]
    pub fn transaction_count(&self, pending: bool, executed: bool) -> usize {
        self.transactions
            .values()
            .filter(|tx| tx.matches(pending, executed))
            .count()
    }

    #[must_use]
    pub fn native_balance(&self, ledgers: &dyn Ledgers) -> Amount {
        ledgers.native().balance_of(self.account)
    }

    /// The wallet's balance on `token`.
    ///
    /// # Errors
    /// Returns `UnknownToken` if no ledger is registered at `token`.
    pub fn token_balance(&self, ledgers: &dyn Ledgers, token: Address) -> Result<Amount> {
        Ok(ledgers.token(token)?.balance_of(self.account))
    }

    /// Event log, oldest first.
    #[must_use]
    pub fn events(&self) -> &[WalletEvent] {
        &self.events
    }
}
