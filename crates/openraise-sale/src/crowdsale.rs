//! The sale engine.
//!
//! ## Lifecycle
//!
//! ```text
//!   PENDING ──starts_at──▶ FUNDING ──ends_at / hard cap──▶ ENDED ──settled──▶ FINALIZED
//! ```
//!
//! During FUNDING every contribution goes through the admission kernel,
//! is priced by the tier schedule and escrowed on the sale's own account.
//! Once ENDED, the operator settles contributors in one pass or in bounded
//! batches. The outcome (distribute tokens or refund value) is decided
//! once, from the soft cap, when the first batch runs. After the last
//! contributor: unsold tokens and escrowed value go to the payout wallet,
//! the token ledger is unfrozen (distribution only) and its ownership
//! handed over.
//!
//! Every call is all-or-nothing. Accounting is updated before any outbound
//! transfer and restored if that transfer fails.

use openraise_ledger::Ledgers;
use openraise_pricing::{TierSchedule, TokenQuote};
use openraise_types::{
    Address, Amount, CallContext, OpenraiseError, Result, SaleConfig, SaleEvent, SalePhase,
    SettlementOutcome, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::{AdmissionKernel, ContributionRegistry, SettlementCursor, SettlementProgress};

/// What an accepted contribution did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionReceipt {
    /// Value taken from the sender and escrowed.
    pub admitted: Amount,
    /// Part of the offered value left with the sender (cap overflow).
    pub refunded: Amount,
    /// Tokens credited for `admitted`.
    pub tokens: Amount,
    /// Whether the sender became a new contributor.
    pub first_contribution: bool,
}

/// A tiered, capped token sale with batched settlement.
#[derive(Debug, Clone)]
pub struct Crowdsale {
    /// The engine's own account: escrows value and holds the tokens for sale.
    account: Address,
    payout_wallet: Address,
    operator: Address,
    token: Address,
    soft_cap: Amount,
    starts_at: Timestamp,
    ends_at: Timestamp,
    schedule: TierSchedule,
    kernel: AdmissionKernel,
    registry: ContributionRegistry,
    wei_raised: Amount,
    /// `None` until the first settlement batch runs.
    settlement: Option<SettlementCursor>,
    events: Vec<SaleEvent>,
}

impl Crowdsale {
    /// Build a sale from a validated configuration.
    ///
    /// # Errors
    /// Returns `Configuration` if the configuration is invalid.
    pub fn new(config: &SaleConfig) -> Result<Self> {
        config.validate()?;
        let schedule = TierSchedule::new(config.tiers.clone())?;
        tracing::info!(
            account = %config.sale_account,
            hard_cap = %schedule.hard_cap(),
            soft_cap = %config.soft_cap,
            tiers = config.tiers.len(),
            "crowdsale created"
        );
        Ok(Self {
            account: config.sale_account,
            payout_wallet: config.payout_wallet,
            operator: config.operator,
            token: config.token,
            soft_cap: config.soft_cap,
            starts_at: config.starts_at,
            ends_at: config.ends_at,
            schedule,
            kernel: AdmissionKernel::from_config(config),
            registry: ContributionRegistry::new(),
            wei_raised: Amount::ZERO,
            settlement: None,
            events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------
    // Contributions
    // -----------------------------------------------------------------

    /// Contribute `value` native units from `ctx.caller`.
    ///
    /// Only the admitted part is taken from the sender; value that would
    /// push the raise past the hard cap stays with them and is reported
    /// as `refunded`.
    ///
    /// # Errors
    /// - `NotOpen` outside the window, at the hard cap, or once settlement began
    /// - any admission error (`BelowMinimum`, `OriginNotAllowed`, `CapExceeded`)
    /// - `InsufficientBalance` if the sender does not hold `value`
    pub fn contribute(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        value: Amount,
    ) -> Result<ContributionReceipt> {
        let sender = ctx.caller;
        if !self.is_open(ctx.now) {
            tracing::warn!(sender = %sender, value = %value, phase = %self.phase(ctx.now), "contribution outside funding phase");
            return Err(OpenraiseError::NotOpen);
        }

        let invested = self.registry.invested_amount_of(sender);
        let allowed = self
            .kernel
            .admit(ledgers.native(), sender, invested, value)
            .inspect_err(|err| {
                tracing::warn!(sender = %sender, value = %value, error = %err, "contribution rejected");
            })?;
        let held = ledgers.native().balance_of(sender);
        if held < value {
            return Err(OpenraiseError::InsufficientBalance {
                needed: value,
                available: held,
            });
        }

        let quote = self.schedule.calculate_token_amount(self.wei_raised, allowed)?;
        let admitted = quote.admitted;
        let refunded = value.saturating_sub(admitted);
        let previous_raised = self.wei_raised;
        let new_raised = previous_raised.checked_add(admitted)?;

        // Effects
        let created = self.registry.record(sender, admitted, quote.tokens)?;
        self.wei_raised = new_raised;

        // Interaction
        if let Err(err) = ledgers.native_mut().transfer(sender, self.account, admitted) {
            self.wei_raised = previous_raised;
            self.registry.rollback(sender, admitted, quote.tokens, created);
            return Err(err);
        }

        tracing::info!(
            sender = %sender,
            admitted = %admitted,
            refunded = %refunded,
            tokens = %quote.tokens,
            raised = %self.wei_raised,
            "contribution accepted"
        );
        self.events.push(SaleEvent::ContributionAccepted {
            sender,
            admitted,
            refunded,
            tokens: quote.tokens,
        });
        Ok(ContributionReceipt {
            admitted,
            refunded,
            tokens: quote.tokens,
            first_contribution: created,
        })
    }

    /// Whitelist `participant`, raising their lifetime cap.
    ///
    /// # Errors
    /// Returns `Unauthorized` unless the caller is the configured signer.
    pub fn sign_participant(
        &mut self,
        ctx: &CallContext,
        participant: Address,
        reference: &str,
    ) -> Result<()> {
        self.kernel
            .sign_participant(ctx.caller, participant, reference)?;
        tracing::debug!(participant = %participant, "participant signed");
        self.events
            .push(SaleEvent::ParticipantSigned { participant });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Move the hard cap within `[wei_raised, original hard cap]`. The new
    /// cap may not fall below the soft cap.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is the operator
    /// - `SettlementInProgress` once settlement began
    /// - `InvalidCap` outside the allowed range or below the soft cap
    pub fn change_hard_cap(&mut self, ctx: &CallContext, new_cap: Amount) -> Result<()> {
        self.check_operator(ctx, "change hard cap")?;
        if self.settlement.is_some() {
            return Err(OpenraiseError::SettlementInProgress);
        }
        if new_cap < self.soft_cap {
            return Err(OpenraiseError::InvalidCap {
                requested: new_cap,
                raised: self.wei_raised,
                ceiling: self.schedule.original_hard_cap(),
            });
        }
        let previous = self.schedule.set_hard_cap(new_cap, self.wei_raised)?;
        tracing::info!(previous = %previous, current = %new_cap, "hard cap changed");
        self.events.push(SaleEvent::HardCapChanged {
            previous,
            current: new_cap,
        });
        Ok(())
    }

    /// Push the end of the sale window later.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is the operator
    /// - `SettlementInProgress` once settlement began
    /// - `InvalidEndsDate` unless `new_end` is after the current end
    pub fn increase_ends_date(&mut self, ctx: &CallContext, new_end: Timestamp) -> Result<()> {
        self.check_operator(ctx, "increase ends date")?;
        if self.settlement.is_some() {
            return Err(OpenraiseError::SettlementInProgress);
        }
        if new_end <= self.ends_at {
            return Err(OpenraiseError::InvalidEndsDate {
                requested: new_end,
                current: self.ends_at,
            });
        }
        let previous = self.ends_at;
        self.ends_at = new_end;
        tracing::info!(previous = %previous, current = %new_end, "ends date increased");
        self.events.push(SaleEvent::EndsDateIncreased {
            previous,
            current: new_end,
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------

    /// Settle every remaining contributor and complete the sale.
    ///
    /// # Errors
    /// See [`Crowdsale::finalize_partial`].
    pub fn finalize(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
    ) -> Result<SettlementProgress> {
        self.finalize_partial(ctx, ledgers, usize::MAX)
    }

    /// Settle at most `limit` contributors from the cursor on. The call
    /// that settles the last one also completes the sale. Calling again
    /// after completion does nothing.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is the operator
    /// - `NotYetEndable` before the end date while the hard cap is not reached
    /// - `LedgerFrozen`, `InsufficientBalance` or `NotLedgerOwner` when the
    ///   batch cannot be paid out; checked before anything moves
    pub fn finalize_partial(
        &mut self,
        ctx: &CallContext,
        ledgers: &mut dyn Ledgers,
        limit: usize,
    ) -> Result<SettlementProgress> {
        self.check_operator(ctx, "finalize crowdsale")?;

        let mut cursor = match self.settlement {
            Some(cursor) if cursor.is_completed() => {
                return Ok(SettlementProgress {
                    outcome: cursor.outcome(),
                    processed: 0,
                    remaining: 0,
                    completed: true,
                });
            }
            Some(cursor) => cursor,
            None => {
                if !self.is_endable(ctx.now) {
                    return Err(OpenraiseError::NotYetEndable);
                }
                SettlementCursor::start(self.decide_outcome(), self.registry.unique_contributors())
            }
        };

        let batch = cursor.next_batch(limit);
        self.preflight(ledgers, &cursor, batch.clone())?;

        if self.settlement.is_none() {
            tracing::info!(
                outcome = %cursor.outcome(),
                raised = %self.wei_raised,
                contributors = cursor.total(),
                "settlement started"
            );
        }
        self.settlement = Some(cursor);

        let mut processed = 0;
        for idx in batch {
            let contributor = self
                .registry
                .contributor(idx)
                .ok_or_else(|| OpenraiseError::Internal(format!("no contributor at {idx}")))?;
            let amount = self.settle_one(ledgers, cursor.outcome(), contributor)?;
            cursor.advance();
            self.settlement = Some(cursor);
            processed += 1;
            tracing::debug!(contributor = %contributor, outcome = %cursor.outcome(), amount = %amount, "contributor settled");
            self.events.push(SaleEvent::ContributorSettled {
                contributor,
                outcome: cursor.outcome(),
                amount,
            });
        }

        if cursor.needs_completion() {
            self.complete(ledgers, cursor.outcome())?;
            cursor.complete();
            self.settlement = Some(cursor);
        }

        Ok(SettlementProgress {
            outcome: cursor.outcome(),
            processed,
            remaining: cursor.remaining(),
            completed: cursor.is_completed(),
        })
    }

    fn decide_outcome(&self) -> SettlementOutcome {
        if self.wei_raised >= self.soft_cap {
            SettlementOutcome::Distribute
        } else {
            SettlementOutcome::Refund
        }
    }

    /// Check that the batch, and completion if this batch reaches the end,
    /// can be paid out in full.
    fn preflight(
        &self,
        ledgers: &dyn Ledgers,
        cursor: &SettlementCursor,
        batch: std::ops::Range<usize>,
    ) -> Result<()> {
        let token = ledgers.token(self.token)?;
        match cursor.outcome() {
            SettlementOutcome::Distribute => {
                let needed = self.registry.tokens_in(batch.clone())?;
                if !needed.is_zero() && token.is_frozen() && token.owner() != self.account {
                    return Err(OpenraiseError::LedgerFrozen);
                }
                let held = token.balance_of(self.account);
                if held < needed {
                    return Err(OpenraiseError::InsufficientBalance {
                        needed,
                        available: held,
                    });
                }
            }
            SettlementOutcome::Refund => {
                let needed = self.registry.invested_in(batch.clone())?;
                let held = ledgers.native().balance_of(self.account);
                if held < needed {
                    return Err(OpenraiseError::InsufficientBalance {
                        needed,
                        available: held,
                    });
                }
            }
        }
        if batch.end == cursor.total() && token.owner() != self.account {
            return Err(OpenraiseError::NotLedgerOwner(self.account));
        }
        Ok(())
    }

    fn settle_one(
        &self,
        ledgers: &mut dyn Ledgers,
        outcome: SettlementOutcome,
        contributor: Address,
    ) -> Result<Amount> {
        let entry = self.registry.entry(contributor);
        match outcome {
            SettlementOutcome::Distribute => {
                ledgers
                    .token_mut(self.token)?
                    .transfer(self.account, contributor, entry.tokens)?;
                Ok(entry.tokens)
            }
            SettlementOutcome::Refund => {
                ledgers
                    .native_mut()
                    .transfer(self.account, contributor, entry.invested)?;
                Ok(entry.invested)
            }
        }
    }

    /// One-time handover to the payout wallet.
    fn complete(&mut self, ledgers: &mut dyn Ledgers, outcome: SettlementOutcome) -> Result<()> {
        let unsold = {
            let token = ledgers.token_mut(self.token)?;
            let unsold = token.balance_of(self.account);
            if !unsold.is_zero() {
                token.transfer(self.account, self.payout_wallet, unsold)?;
            }
            unsold
        };

        let forwarded = match outcome {
            SettlementOutcome::Distribute => {
                let escrow = ledgers.native().balance_of(self.account);
                if !escrow.is_zero() {
                    ledgers
                        .native_mut()
                        .transfer(self.account, self.payout_wallet, escrow)?;
                }
                escrow
            }
            SettlementOutcome::Refund => Amount::ZERO,
        };

        let token = ledgers.token_mut(self.token)?;
        if outcome == SettlementOutcome::Distribute {
            token.unfreeze(self.account)?;
        }
        token.transfer_ownership(self.account, self.payout_wallet)?;

        let contributors = self.registry.unique_contributors();
        tracing::info!(
            outcome = %outcome,
            contributors,
            unsold = %unsold,
            forwarded = %forwarded,
            wallet = %self.payout_wallet,
            "settlement completed"
        );
        self.events.push(SaleEvent::SettlementCompleted {
            outcome,
            contributors,
            unsold_tokens: unsold,
            forwarded,
        });
        Ok(())
    }

    fn check_operator(&self, ctx: &CallContext, action: &str) -> Result<()> {
        if ctx.caller == self.operator {
            Ok(())
        } else {
            Err(OpenraiseError::Unauthorized {
                caller: ctx.caller,
                action: action.to_string(),
            })
        }
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    /// Lifecycle phase at `now`.
    #[must_use]
    pub fn phase(&self, now: Timestamp) -> SalePhase {
        match self.settlement {
            Some(cursor) if cursor.is_completed() => SalePhase::Finalized,
            Some(_) => SalePhase::Ended,
            None if now < self.starts_at => SalePhase::Pending,
            None if self.is_endable(now) => SalePhase::Ended,
            None => SalePhase::Funding,
        }
    }

    /// Contributions are accepted at `now`.
    #[must_use]
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.phase(now) == SalePhase::Funding
    }

    /// Settlement may start at `now`.
    #[must_use]
    pub fn is_endable(&self, now: Timestamp) -> bool {
        now >= self.ends_at || self.wei_raised >= self.schedule.hard_cap()
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.settlement.is_some_and(|c| c.is_completed())
    }

    #[must_use]
    pub fn account(&self) -> Address {
        self.account
    }

    #[must_use]
    pub fn payout_wallet(&self) -> Address {
        self.payout_wallet
    }

    #[must_use]
    pub fn token(&self) -> Address {
        self.token
    }

    #[must_use]
    pub fn wei_raised(&self) -> Amount {
        self.wei_raised
    }

    #[must_use]
    pub fn hard_cap(&self) -> Amount {
        self.schedule.hard_cap()
    }

    #[must_use]
    pub fn original_hard_cap(&self) -> Amount {
        self.schedule.original_hard_cap()
    }

    #[must_use]
    pub fn soft_cap(&self) -> Amount {
        self.soft_cap
    }

    #[must_use]
    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    #[must_use]
    pub fn ends_at(&self) -> Timestamp {
        self.ends_at
    }

    #[must_use]
    pub fn current_rate(&self, raised: Amount) -> u64 {
        self.schedule.current_rate(raised)
    }

    #[must_use]
    pub fn wei_limit_of_current_step(&self, raised: Amount) -> Amount {
        self.schedule.wei_limit_of_current_step(raised)
    }

    /// Price `value` as if contributed on top of `raised`.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the token amount overflows.
    pub fn calculate_token_amount(&self, raised: Amount, value: Amount) -> Result<TokenQuote> {
        self.schedule.calculate_token_amount(raised, value)
    }

    #[must_use]
    pub fn invested_amount_of(&self, participant: Address) -> Amount {
        self.registry.invested_amount_of(participant)
    }

    #[must_use]
    pub fn token_amount_of(&self, participant: Address) -> Amount {
        self.registry.token_amount_of(participant)
    }

    #[must_use]
    pub fn contributor(&self, index: usize) -> Option<Address> {
        self.registry.contributor(index)
    }

    #[must_use]
    pub fn unique_contributors(&self) -> usize {
        self.registry.unique_contributors()
    }

    #[must_use]
    pub fn is_whitelisted(&self, participant: Address) -> bool {
        self.kernel.is_whitelisted(participant)
    }

    /// Outcome decided for the sale, once settlement has started.
    #[must_use]
    pub fn settlement_outcome(&self) -> Option<SettlementOutcome> {
        self.settlement.map(|c| c.outcome())
    }

    /// Index of the next contributor to settle.
    #[must_use]
    pub fn settlement_position(&self) -> usize {
        self.settlement.map_or(0, |c| c.position())
    }

    /// Append-only event log.
    #[must_use]
    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use openraise_ledger::{Chain, TokenLedger};
    use openraise_types::{Tier, constants, units};

    struct Fixture {
        sale: Crowdsale,
        chain: Chain,
        operator: Address,
        wallet: Address,
        token: Address,
        now: Timestamp,
    }

    impl Fixture {
        fn ctx(&self, caller: Address) -> CallContext {
            CallContext::new(caller, self.now)
        }

        fn op(&self) -> CallContext {
            self.ctx(self.operator)
        }

        fn after_end(&self, caller: Address) -> CallContext {
            CallContext::new(caller, self.sale.ends_at() + Duration::seconds(1))
        }

        fn contribute(&mut self, who: &str, value: &str) -> Result<ContributionReceipt> {
            let ctx = self.ctx(Address::labelled(who));
            self.sale.contribute(&ctx, &mut self.chain, units(value))
        }
    }

    fn tiers(steps: &[(&str, u64)]) -> Vec<Tier> {
        steps.iter()
            .map(|(boundary, rate)| Tier::new(units(boundary), *rate))
            .collect()
    }

    fn setup(tier_spec: &[(&str, u64)], soft_cap: &str) -> Fixture {
        let now = Utc::now();
        let account = Address::labelled("sale");
        let operator = Address::labelled("operator");
        let wallet = Address::labelled("wallet");
        let config = SaleConfig::stage_a(
            account,
            now - Duration::minutes(1),
            now + Duration::hours(1),
            wallet,
            operator,
            Address::labelled("token"),
            tiers(tier_spec),
        )
        .with_soft_cap(units(soft_cap));

        let mut chain = Chain::new();
        let token = chain.deploy_token(
            config.token,
            account,
            Amount::new(constants::DEFAULT_TOKEN_SUPPLY),
        );
        chain.mark_contract(account);
        for who in ["alice", "bob", "carol", "dave"] {
            chain
                .bank_mut()
                .credit(Address::labelled(who), units("100"))
                .unwrap();
        }
        Fixture {
            sale: Crowdsale::new(&config).unwrap(),
            chain,
            operator,
            wallet,
            token,
            now,
        }
    }

    fn small() -> Fixture {
        setup(&[("1", 3750), ("2", 3300), ("3", 2888)], "0")
    }

    #[test]
    fn tiered_amounts_accumulate() {
        let mut f = small();
        f.contribute("alice", "0.3").unwrap();
        f.contribute("alice", "1.2").unwrap();
        let alice = Address::labelled("alice");
        assert_eq!(f.sale.invested_amount_of(alice), units("1.5"));
        assert_eq!(f.sale.token_amount_of(alice), units("5400"));
        assert_eq!(f.sale.wei_raised(), units("1.5"));
        assert_eq!(f.chain.native_balance(f.sale.account()), units("1.5"));
        assert_eq!(f.sale.unique_contributors(), 1);
    }

    #[test]
    fn overflow_past_hard_cap_stays_with_sender() {
        let mut f = small();
        f.contribute("alice", "2.5").unwrap();
        let receipt = f.contribute("bob", "1").unwrap();
        assert_eq!(receipt.admitted, units("0.5"));
        assert_eq!(receipt.refunded, units("0.5"));
        assert_eq!(f.chain.native_balance(Address::labelled("bob")), units("99.5"));
        assert_eq!(f.sale.wei_raised(), f.sale.hard_cap());

        // Hard cap reached: the sale has ended.
        assert_eq!(f.sale.phase(f.now), SalePhase::Ended);
        assert!(matches!(
            f.contribute("carol", "1").unwrap_err(),
            OpenraiseError::NotOpen
        ));
    }

    #[test]
    fn window_is_enforced() {
        let mut f = small();
        let alice = Address::labelled("alice");
        let early = CallContext::new(alice, f.sale.starts_at() - Duration::seconds(1));
        assert_eq!(f.sale.phase(early.now), SalePhase::Pending);
        assert!(matches!(
            f.sale.contribute(&early, &mut f.chain, units("1")).unwrap_err(),
            OpenraiseError::NotOpen
        ));
        let late = f.after_end(alice);
        assert!(f.sale.contribute(&late, &mut f.chain, units("1")).is_err());
        assert_eq!(f.sale.phase(f.now), SalePhase::Funding);
    }

    #[test]
    fn rejected_contribution_leaves_no_trace() {
        let mut f = small();
        assert!(matches!(
            f.contribute("alice", "0.05").unwrap_err(),
            OpenraiseError::BelowMinimum { .. }
        ));
        assert!(matches!(
            f.contribute("nobody", "1").unwrap_err(),
            OpenraiseError::InsufficientBalance { .. }
        ));
        assert_eq!(f.sale.unique_contributors(), 0);
        assert_eq!(f.sale.wei_raised(), Amount::ZERO);
        assert!(f.sale.events().is_empty());
    }

    #[test]
    fn participant_cap_rejects_whole_contribution() {
        let mut f = setup(&[("4000", 3750), ("50000", 3300), ("200000", 2888)], "0");
        f.chain
            .bank_mut()
            .credit(Address::labelled("alice"), units("100"))
            .unwrap();
        f.contribute("alice", "30").unwrap();
        assert!(matches!(
            f.contribute("alice", "0.1").unwrap_err(),
            OpenraiseError::CapExceeded { .. }
        ));

        let alice = Address::labelled("alice");
        let ctx = f.op();
        f.sale.sign_participant(&ctx, alice, "kyc").unwrap();
        assert!(f.sale.is_whitelisted(alice));
        assert!(f.contribute("alice", "31").is_err());
        f.contribute("alice", "30").unwrap();
        assert_eq!(f.sale.invested_amount_of(alice), units("60"));
    }

    #[test]
    fn hard_cap_changes() {
        let mut f = setup(
            &[("1", 7800), ("2", 7500), ("3", 7150), ("4", 6850), ("5", 6500)],
            "0",
        );
        f.contribute("alice", "3").unwrap();
        let ctx = f.op();
        assert!(matches!(
            f.sale.change_hard_cap(&ctx, units("2.9")).unwrap_err(),
            OpenraiseError::InvalidCap { .. }
        ));
        f.sale.change_hard_cap(&ctx, units("4.1")).unwrap();
        assert!(f.sale.change_hard_cap(&ctx, units("5.001")).is_err());

        let receipt = f.contribute("alice", "5").unwrap();
        assert_eq!(receipt.admitted, units("1.1"));
        assert_eq!(f.sale.wei_raised(), units("4.1"));

        let as_alice = f.ctx(Address::labelled("alice"));
        assert!(matches!(
            f.sale.change_hard_cap(&as_alice, units("4.5")).unwrap_err(),
            OpenraiseError::Unauthorized { .. }
        ));
    }

    #[test]
    fn hard_cap_stays_above_soft_cap() {
        let mut f = setup(&[("1", 3750), ("2", 3300), ("3", 2888)], "2");
        f.contribute("alice", "1").unwrap();
        let ctx = f.op();
        assert!(matches!(
            f.sale.change_hard_cap(&ctx, units("1.5")).unwrap_err(),
            OpenraiseError::InvalidCap { .. }
        ));
        assert_eq!(f.sale.hard_cap(), units("3"));

        f.sale.change_hard_cap(&ctx, units("2")).unwrap();
        assert_eq!(f.sale.hard_cap(), units("2"));
    }

    #[test]
    fn ends_date_only_moves_forward() {
        let mut f = small();
        let ctx = f.op();
        let end = f.sale.ends_at();
        assert!(matches!(
            f.sale
                .increase_ends_date(&ctx, end - Duration::hours(2))
                .unwrap_err(),
            OpenraiseError::InvalidEndsDate { .. }
        ));

        let late = end + Duration::minutes(5);
        assert_eq!(f.sale.phase(late), SalePhase::Ended);
        f.sale
            .increase_ends_date(&ctx, end + Duration::hours(1))
            .unwrap();
        assert_eq!(f.sale.phase(late), SalePhase::Funding);
    }

    #[test]
    fn settlement_waits_for_end() {
        let mut f = small();
        f.contribute("alice", "1").unwrap();
        let ctx = f.op();
        assert!(matches!(
            f.sale.finalize(&ctx, &mut f.chain).unwrap_err(),
            OpenraiseError::NotYetEndable
        ));
        let alice = Address::labelled("alice");
        let ctx = f.after_end(alice);
        assert!(matches!(
            f.sale.finalize(&ctx, &mut f.chain).unwrap_err(),
            OpenraiseError::Unauthorized { .. }
        ));
    }

    #[test]
    fn distribute_hands_over_everything() {
        let mut f = small();
        f.contribute("alice", "1").unwrap();
        f.contribute("bob", "0.5").unwrap();
        let ctx = f.after_end(f.operator);
        let progress = f.sale.finalize(&ctx, &mut f.chain).unwrap();
        assert!(progress.completed);
        assert_eq!(progress.processed, 2);
        assert_eq!(progress.outcome, SettlementOutcome::Distribute);

        let alice = Address::labelled("alice");
        let bob = Address::labelled("bob");
        assert_eq!(f.chain.token_balance(f.token, alice), units("3750"));
        assert_eq!(f.chain.token_balance(f.token, bob), units("1650"));
        assert_eq!(f.chain.native_balance(f.wallet), units("1.5"));
        assert_eq!(f.chain.native_balance(f.sale.account()), Amount::ZERO);

        let token = f.chain.token(f.token).unwrap();
        assert!(!token.is_frozen());
        assert_eq!(token.owner(), f.wallet);
        let sold = units("5400");
        assert_eq!(
            token.balance_of(f.wallet),
            Amount::new(constants::DEFAULT_TOKEN_SUPPLY)
                .checked_sub(sold)
                .unwrap()
        );
        assert_eq!(f.sale.phase(ctx.now), SalePhase::Finalized);
    }

    #[test]
    fn refund_below_soft_cap() {
        let mut f = setup(&[("1", 3750), ("2", 3300), ("3", 2888)], "2");
        f.contribute("alice", "1").unwrap();
        f.contribute("bob", "0.5").unwrap();
        let ctx = f.after_end(f.operator);
        let progress = f.sale.finalize(&ctx, &mut f.chain).unwrap();
        assert_eq!(progress.outcome, SettlementOutcome::Refund);

        assert_eq!(f.chain.native_balance(Address::labelled("alice")), units("100"));
        assert_eq!(f.chain.native_balance(Address::labelled("bob")), units("100"));
        assert_eq!(f.chain.token_balance(f.token, Address::labelled("alice")), Amount::ZERO);
        assert_eq!(f.chain.native_balance(f.wallet), Amount::ZERO);

        let token = f.chain.token(f.token).unwrap();
        assert!(token.is_frozen());
        assert_eq!(token.owner(), f.wallet);
        assert_eq!(token.balance_of(f.wallet), token.total_supply());
    }

    #[test]
    fn partial_batches_then_noop() {
        let mut f = small();
        for who in ["alice", "bob", "carol"] {
            f.contribute(who, "0.5").unwrap();
        }
        let ctx = f.after_end(f.operator);

        let first = f.sale.finalize_partial(&ctx, &mut f.chain, 2).unwrap();
        assert_eq!(first.processed, 2);
        assert_eq!(first.remaining, 1);
        assert!(!first.completed);
        assert_eq!(f.sale.settlement_position(), 2);
        assert_eq!(f.sale.phase(ctx.now), SalePhase::Ended);

        // Settlement started: no more admin changes.
        assert!(matches!(
            f.sale.change_hard_cap(&ctx, units("2.9")).unwrap_err(),
            OpenraiseError::SettlementInProgress
        ));

        let second = f.sale.finalize_partial(&ctx, &mut f.chain, 2).unwrap();
        assert_eq!(second.processed, 1);
        assert!(second.completed);

        let events_before = f.sale.events().len();
        let again = f.sale.finalize(&ctx, &mut f.chain).unwrap();
        assert_eq!(again.processed, 0);
        assert!(again.completed);
        assert_eq!(f.sale.events().len(), events_before);
        assert!(f.sale.is_finalized());
    }

    #[test]
    fn preflight_blocks_unpayable_batch() {
        let mut f = small();
        f.contribute("alice", "1").unwrap();
        // Sale no longer owns the ledger: completion would fail.
        f.chain
            .token_mut(f.token)
            .unwrap()
            .transfer_ownership(f.sale.account(), f.operator)
            .unwrap();
        let ctx = f.after_end(f.operator);
        let err = f.sale.finalize(&ctx, &mut f.chain).unwrap_err();
        assert!(matches!(err, OpenraiseError::LedgerFrozen));
        assert_eq!(f.sale.settlement_outcome(), None);
        assert_eq!(f.chain.token_balance(f.token, Address::labelled("alice")), Amount::ZERO);
    }

    #[test]
    fn empty_sale_completes_immediately() {
        let mut f = small();
        let ctx = f.after_end(f.operator);
        let progress = f.sale.finalize(&ctx, &mut f.chain).unwrap();
        assert!(progress.completed);
        assert_eq!(progress.processed, 0);
        assert_eq!(f.chain.token(f.token).unwrap().owner(), f.wallet);
    }

    #[test]
    fn views_delegate_to_schedule() {
        let f = small();
        assert_eq!(f.sale.current_rate(units("1")), 3300);
        assert_eq!(f.sale.wei_limit_of_current_step(units("1.5")), units("0.5"));
        let q = f.sale.calculate_token_amount(Amount::ZERO, units("1")).unwrap();
        assert_eq!(q.tokens, units("3750"));
        assert_eq!(f.sale.hard_cap(), units("3"));
        assert_eq!(f.sale.original_hard_cap(), units("3"));
        assert_eq!(f.sale.soft_cap(), Amount::ZERO);
    }
}
