//! Vesting collaborators.
//!
//! - [`TokenVesting`]: an owner allocates tokens held by the vesting account
//!   to beneficiaries; after the release instant they are paid out, either
//!   pushed to everyone by `release` or pulled one at a time by `withdraw`.
//! - [`SimpleTokenVesting`]: a single beneficiary receives the account's
//!   whole balance of any token once the vesting instant has passed.
//!
//! Payouts mark an entry claimed before the token transfer is issued, and
//! restore it if the transfer fails, so a beneficiary can never be paid twice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use openraise_types::{
    Address, Amount, CallContext, OpenraiseError, Result, Timestamp, VestingEvent,
};

use crate::TokenLedger;

/// One beneficiary's allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingEntry {
    pub amount: Amount,
    pub claimed: bool,
}

/// Multi-beneficiary vesting account for one token.
#[derive(Debug, Clone)]
pub struct TokenVesting {
    account: Address,
    token: Address,
    owner: Address,
    release_at: Timestamp,
    entries: BTreeMap<Address, VestingEntry>,
    events: Vec<VestingEvent>,
}

impl TokenVesting {
    #[must_use]
    pub fn new(account: Address, token: Address, owner: Address, release_at: Timestamp) -> Self {
        Self {
            account,
            token,
            owner,
            release_at,
            entries: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn account(&self) -> Address {
        self.account
    }

    #[must_use]
    pub fn release_at(&self) -> Timestamp {
        self.release_at
    }

    #[must_use]
    pub fn entry(&self, beneficiary: Address) -> Option<&VestingEntry> {
        self.entries.get(&beneficiary)
    }

    #[must_use]
    pub fn events(&self) -> &[VestingEvent] {
        &self.events
    }

    /// Sum of allocations not yet paid out.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the sum overflows.
    pub fn outstanding(&self) -> Result<Amount> {
        self.entries
            .values()
            .filter(|e| !e.claimed)
            .try_fold(Amount::ZERO, |acc, e| acc.checked_add(e.amount))
    }

    /// Allocate `amount` more tokens to `beneficiary`.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is the owner
    /// - `InvalidRecipient` for the zero address
    /// - `AllocationExceedsBalance` if outstanding allocations would exceed
    ///   the tokens held by the vesting account
    pub fn add_beneficiary(
        &mut self,
        ctx: &CallContext,
        token: &dyn TokenLedger,
        beneficiary: Address,
        amount: Amount,
    ) -> Result<()> {
        self.check_owner(ctx, "add beneficiary")?;
        self.check_token(token)?;
        if beneficiary.is_zero() {
            return Err(OpenraiseError::InvalidRecipient(beneficiary));
        }
        let available = token
            .balance_of(self.account)
            .saturating_sub(self.outstanding()?);
        if amount > available {
            return Err(OpenraiseError::AllocationExceedsBalance {
                requested: amount,
                available,
            });
        }

        let entry = self.entries.entry(beneficiary).or_insert(VestingEntry {
            amount: Amount::ZERO,
            claimed: false,
        });
        if entry.claimed {
            *entry = VestingEntry {
                amount,
                claimed: false,
            };
        } else {
            entry.amount = entry.amount.checked_add(amount)?;
        }
        tracing::debug!(beneficiary = %beneficiary, amount = %amount, "vesting beneficiary added");
        self.events.push(VestingEvent::BeneficiaryAdded {
            beneficiary,
            amount,
        });
        Ok(())
    }

    /// Drop an unpaid allocation.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is the owner
    /// - `UnknownBeneficiary` if there is no unpaid allocation
    pub fn remove_beneficiary(&mut self, ctx: &CallContext, beneficiary: Address) -> Result<()> {
        self.check_owner(ctx, "remove beneficiary")?;
        match self.entries.get(&beneficiary) {
            Some(entry) if !entry.claimed => {
                self.entries.remove(&beneficiary);
                self.events
                    .push(VestingEvent::BeneficiaryRemoved { beneficiary });
                Ok(())
            }
            _ => Err(OpenraiseError::UnknownBeneficiary(beneficiary)),
        }
    }

    /// Pay every unclaimed allocation. Returns the total paid.
    ///
    /// # Errors
    /// - `NotYetVested` before the release instant
    /// - `LedgerFrozen` / `InsufficientBalance` if the payout cannot be made;
    ///   checked before any entry is touched
    pub fn release(&mut self, ctx: &CallContext, token: &mut dyn TokenLedger) -> Result<Amount> {
        self.check_released(ctx)?;
        self.check_token(token)?;
        let total = self.outstanding()?;
        if token.is_frozen() && token.owner() != self.account {
            return Err(OpenraiseError::LedgerFrozen);
        }
        let held = token.balance_of(self.account);
        if held < total {
            return Err(OpenraiseError::InsufficientBalance {
                needed: total,
                available: held,
            });
        }

        let pending: Vec<Address> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.claimed)
            .map(|(addr, _)| *addr)
            .collect();
        for beneficiary in pending {
            self.pay(beneficiary, token)?;
        }
        tracing::info!(total = %total, "vesting released");
        Ok(total)
    }

    /// Pull the caller's own allocation.
    ///
    /// # Errors
    /// See [`TokenVesting::withdraw_for`].
    pub fn withdraw(&mut self, ctx: &CallContext, token: &mut dyn TokenLedger) -> Result<Amount> {
        self.withdraw_for(ctx, ctx.caller, token)
    }

    /// Pay `beneficiary`'s allocation. Anyone may trigger it; the tokens
    /// always go to the beneficiary.
    ///
    /// # Errors
    /// - `NotYetVested` before the release instant
    /// - `UnknownBeneficiary` if there is no allocation
    /// - `NothingToRelease` if it was already paid
    pub fn withdraw_for(
        &mut self,
        ctx: &CallContext,
        beneficiary: Address,
        token: &mut dyn TokenLedger,
    ) -> Result<Amount> {
        self.check_released(ctx)?;
        self.check_token(token)?;
        match self.entries.get(&beneficiary) {
            None => Err(OpenraiseError::UnknownBeneficiary(beneficiary)),
            Some(entry) if entry.claimed => Err(OpenraiseError::NothingToRelease),
            Some(_) => self.pay(beneficiary, token),
        }
    }

    fn pay(&mut self, beneficiary: Address, token: &mut dyn TokenLedger) -> Result<Amount> {
        let Some(entry) = self.entries.get_mut(&beneficiary) else {
            return Err(OpenraiseError::UnknownBeneficiary(beneficiary));
        };
        let amount = entry.amount;
        entry.claimed = true;
        if let Err(err) = token.transfer(self.account, beneficiary, amount) {
            if let Some(entry) = self.entries.get_mut(&beneficiary) {
                entry.claimed = false;
            }
            return Err(err);
        }
        self.events.push(VestingEvent::Released {
            beneficiary,
            amount,
        });
        Ok(amount)
    }

    fn check_owner(&self, ctx: &CallContext, action: &str) -> Result<()> {
        if ctx.caller == self.owner {
            Ok(())
        } else {
            Err(OpenraiseError::Unauthorized {
                caller: ctx.caller,
                action: action.to_string(),
            })
        }
    }

    fn check_token(&self, token: &dyn TokenLedger) -> Result<()> {
        if token.address() == self.token {
            Ok(())
        } else {
            Err(OpenraiseError::UnknownToken(token.address()))
        }
    }

    fn check_released(&self, ctx: &CallContext) -> Result<()> {
        if ctx.now < self.release_at {
            return Err(OpenraiseError::NotYetVested {
                vested_at: self.release_at,
            });
        }
        Ok(())
    }
}

/// Single-beneficiary vesting account holding any number of tokens.
#[derive(Debug, Clone)]
pub struct SimpleTokenVesting {
    account: Address,
    beneficiary: Address,
    vested_at: Timestamp,
    events: Vec<VestingEvent>,
}

impl SimpleTokenVesting {
    #[must_use]
    pub fn new(account: Address, beneficiary: Address, vested_at: Timestamp) -> Self {
        Self {
            account,
            beneficiary,
            vested_at,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn account(&self) -> Address {
        self.account
    }

    #[must_use]
    pub fn vested_date(&self) -> Timestamp {
        self.vested_at
    }

    #[must_use]
    pub fn events(&self) -> &[VestingEvent] {
        &self.events
    }

    /// Move the account's whole balance of `token` to the beneficiary.
    ///
    /// # Errors
    /// - `NotYetVested` before the vesting instant
    /// - `NothingToRelease` if the account holds none of `token`
    pub fn release(&mut self, ctx: &CallContext, token: &mut dyn TokenLedger) -> Result<Amount> {
        if ctx.now < self.vested_at {
            return Err(OpenraiseError::NotYetVested {
                vested_at: self.vested_at,
            });
        }
        let amount = token.balance_of(self.account);
        if amount.is_zero() {
            return Err(OpenraiseError::NothingToRelease);
        }
        token.transfer(self.account, self.beneficiary, amount)?;
        tracing::info!(beneficiary = %self.beneficiary, amount = %amount, "vested tokens released");
        self.events.push(VestingEvent::Released {
            beneficiary: self.beneficiary,
            amount,
        });
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chain, Ledgers};
    use chrono::{Duration, Utc};
    use openraise_types::units;

    struct Fixture {
        chain: Chain,
        token: Address,
        owner: Address,
        vesting: TokenVesting,
        now: Timestamp,
    }

    fn setup(funding: &str) -> Fixture {
        let now = Utc::now();
        let owner = Address::labelled("owner");
        let mut chain = Chain::new();
        let token = chain.deploy_token(Address::labelled("token"), owner, units("1000"));
        chain.token_mut(token).unwrap().unfreeze(owner).unwrap();
        let account = Address::labelled("vesting");
        chain
            .token_mut(token)
            .unwrap()
            .transfer(owner, account, units(funding))
            .unwrap();
        Fixture {
            chain,
            token,
            owner,
            vesting: TokenVesting::new(account, token, owner, now),
            now,
        }
    }

    #[test]
    fn only_owner_adds_beneficiary() {
        let mut f = setup("2");
        let ctx = CallContext::new(f.owner, f.now);
        let b1 = Address::labelled("b1");
        let b2 = Address::labelled("b2");
        f.vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), b2, units("1"))
            .unwrap();
        let err = f
            .vesting
            .add_beneficiary(
                &ctx.with_caller(b1),
                f.chain.token(f.token).unwrap(),
                b1,
                units("1"),
            )
            .unwrap_err();
        assert!(matches!(err, OpenraiseError::Unauthorized { .. }));

        f.vesting
            .release(&ctx, f.chain.token_mut(f.token).unwrap())
            .unwrap();
        assert_eq!(f.chain.token_balance(f.token, b2), units("1"));
        assert_eq!(f.chain.token_balance(f.token, b1), Amount::ZERO);
    }

    #[test]
    fn allocations_cannot_exceed_holdings() {
        let mut f = setup("1.1");
        let ctx = CallContext::new(f.owner, f.now);
        let b = Address::labelled("b");
        f.vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), b, units("1"))
            .unwrap();
        let err = f
            .vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), b, units("1.1"))
            .unwrap_err();
        assert!(matches!(err, OpenraiseError::AllocationExceedsBalance { .. }));

        f.vesting
            .release(&ctx, f.chain.token_mut(f.token).unwrap())
            .unwrap();
        assert_eq!(f.chain.token_balance(f.token, b), units("1"));
    }

    #[test]
    fn nothing_before_release_instant() {
        let mut f = setup("1");
        let ctx = CallContext::new(f.owner, f.now);
        let b = Address::labelled("b");
        f.vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), b, units("1"))
            .unwrap();
        let early = ctx.at(f.now - Duration::seconds(1));
        assert!(matches!(
            f.vesting
                .withdraw_for(&early, b, f.chain.token_mut(f.token).unwrap())
                .unwrap_err(),
            OpenraiseError::NotYetVested { .. }
        ));
        assert!(f
            .vesting
            .release(&early, f.chain.token_mut(f.token).unwrap())
            .is_err());
    }

    #[test]
    fn withdraw_pays_once() {
        let mut f = setup("1");
        let ctx = CallContext::new(f.owner, f.now);
        let b = Address::labelled("b");
        f.vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), b, units("1"))
            .unwrap();
        let as_b = ctx.with_caller(b);
        let paid = f
            .vesting
            .withdraw(&as_b, f.chain.token_mut(f.token).unwrap())
            .unwrap();
        assert_eq!(paid, units("1"));
        assert!(f.vesting.entry(b).unwrap().claimed);
        assert!(matches!(
            f.vesting
                .withdraw(&as_b, f.chain.token_mut(f.token).unwrap())
                .unwrap_err(),
            OpenraiseError::NothingToRelease
        ));
        assert_eq!(f.chain.token_balance(f.token, b), units("1"));
    }

    #[test]
    fn failed_transfer_restores_entry() {
        let mut f = setup("1");
        let ctx = CallContext::new(f.owner, f.now);
        let b = Address::labelled("b");
        f.vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), b, units("1"))
            .unwrap();
        f.chain.token_mut(f.token).unwrap().freeze(f.owner).unwrap();
        let err = f
            .vesting
            .withdraw_for(&ctx, b, f.chain.token_mut(f.token).unwrap())
            .unwrap_err();
        assert!(matches!(err, OpenraiseError::LedgerFrozen));
        assert!(!f.vesting.entry(b).unwrap().claimed);
    }

    #[test]
    fn remove_beneficiary_frees_allocation() {
        let mut f = setup("1");
        let ctx = CallContext::new(f.owner, f.now);
        let b = Address::labelled("b");
        let c = Address::labelled("c");
        f.vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), b, units("1"))
            .unwrap();
        f.vesting.remove_beneficiary(&ctx, b).unwrap();
        assert!(f.vesting.entry(b).is_none());
        assert!(matches!(
            f.vesting.remove_beneficiary(&ctx, b).unwrap_err(),
            OpenraiseError::UnknownBeneficiary(_)
        ));
        f.vesting
            .add_beneficiary(&ctx, f.chain.token(f.token).unwrap(), c, units("1"))
            .unwrap();
        assert_eq!(f.vesting.events().len(), 3);
    }

    #[test]
    fn simple_vesting_gates_on_date() {
        let now = Utc::now();
        let owner = Address::labelled("owner");
        let beneficiary = Address::labelled("beneficiary");
        let account = Address::labelled("simple-vesting");
        let mut chain = Chain::new();
        let token = chain.deploy_token(Address::labelled("token"), owner, units("10"));
        chain.token_mut(token).unwrap().unfreeze(owner).unwrap();
        chain
            .token_mut(token)
            .unwrap()
            .transfer(owner, account, units("2"))
            .unwrap();

        let mut vesting = SimpleTokenVesting::new(account, beneficiary, now + Duration::seconds(2));
        let ctx = CallContext::new(beneficiary, now);
        assert!(matches!(
            vesting
                .release(&ctx, chain.token_mut(token).unwrap())
                .unwrap_err(),
            OpenraiseError::NotYetVested { .. }
        ));

        let later = ctx.at(now + Duration::seconds(3));
        let paid = vesting.release(&later, chain.token_mut(token).unwrap()).unwrap();
        assert_eq!(paid, units("2"));
        assert_eq!(chain.token_balance(token, beneficiary), units("2"));
        assert!(matches!(
            vesting
                .release(&later, chain.token_mut(token).unwrap())
                .unwrap_err(),
            OpenraiseError::NothingToRelease
        ));
    }
}
