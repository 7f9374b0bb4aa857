//! Resolution Engine — create, challenge, finalize, withdraw.
//!
//! Every operation reads the store, stages its mutations in one
//! [`WriteBatch`], commits, and only then talks to the Settlement Executor and
//! the event bus. A failed operation therefore leaves no trace.
//!
//! The engine is single-writer: mutating operations take `&mut self`, and
//! callers that accept concurrent requests must funnel them through one owner
//! (see the sequencer in `counterstake-node`).

use std::sync::Arc;

use counterstake_store::{CounterstakeStore, StakeEntry, WriteBatch};
use counterstake_types::{
    Address, Amount, Claim, ClaimId, ClaimNum, CounterstakeParams, Outcome, Timestamp,
};
use counterstake_utils::format_hours;

use crate::error::EngineError;
use crate::events::{ClaimEvent, EventBus};
use crate::ledger::StakeLedger;
use crate::ops::{
    ChallengeReceipt, ChallengeRequest, CreateClaim, CreateReceipt, FinalizeReceipt, LossReceipt,
    WithdrawReceipt,
};
use crate::payout::payout;
use crate::price::{self, AssetPair, PriceProvider};
use crate::registry::ClaimRegistry;
use crate::settlement::{Asset, NoticeKind, SettlementExecutor, SettlementNotice};

pub struct ResolutionEngine {
    store: Arc<dyn CounterstakeStore>,
    price: Arc<dyn PriceProvider>,
    settlement: Arc<dyn SettlementExecutor>,
    params: CounterstakeParams,
    pair: AssetPair,
    events: EventBus,
}

impl ResolutionEngine {
    pub fn new(
        store: Arc<dyn CounterstakeStore>,
        price: Arc<dyn PriceProvider>,
        settlement: Arc<dyn SettlementExecutor>,
        params: CounterstakeParams,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self {
            store,
            price,
            settlement,
            params,
            pair: AssetPair::default(),
            events: EventBus::new(),
        })
    }

    pub fn with_asset_pair(mut self, pair: AssetPair) -> Self {
        self.pair = pair;
        self
    }

    pub fn params(&self) -> &CounterstakeParams {
        &self.params
    }

    /// Replace the parameter snapshot used by subsequent operations.
    ///
    /// Open claims keep their periods schedule; the new coefficient applies to
    /// their next escalation.
    pub fn update_params(&mut self, params: CounterstakeParams) -> Result<(), EngineError> {
        params.validate()?;
        tracing::info!(
            ratio = %params.ratio,
            counterstake_coef = %params.counterstake_coef,
            "counterstake parameters updated"
        );
        self.params = params;
        Ok(())
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ClaimEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Create ──────────────────────────────────────────────────────────

    /// Register a claim, record the claimant's stake on `yes`, and release the
    /// claimed value immediately.
    pub fn create(&mut self, req: CreateClaim, now: Timestamp) -> Result<CreateReceipt, EngineError> {
        validate_create(&req)?;

        let ready_at = req.txts.plus_secs(self.params.min_tx_age);
        if !ready_at.has_passed(now) {
            return Err(EngineError::TxTooRecent { ready_at });
        }

        let registry = ClaimRegistry::new(self.store.as_ref());
        let claim_id = ClaimId::derive(
            &req.sender_address,
            &req.recipient_address,
            &req.txid,
            req.txts,
            req.amount,
            req.reward,
            &req.data,
        );
        registry.ensure_claimable(&claim_id)?;

        let quote = self.price.get_price(&self.pair)?;
        let required = price::required_stake(&self.params, quote, req.amount)?;
        if req.stake < required {
            return Err(EngineError::InsufficientStake {
                received: req.stake,
                required,
            });
        }

        let is_large = self
            .params
            .is_large(price::bonding_value(quote, req.amount)?);
        let periods = self.params.periods_for(is_large).to_vec();
        let first_period = periods.first().copied().unwrap_or_default();
        let challenging_target = self
            .params
            .counterstake_coef
            .ceil_mul(req.stake)
            .ok_or(EngineError::Overflow)?;
        let claim_num = registry.next_claim_num()?;

        let mut claim = Claim {
            claim_num,
            claim_id,
            amount: req.amount,
            reward: req.reward,
            sender_address: req.sender_address,
            recipient_address: req.recipient_address,
            claimant_address: req.claimant_address,
            txid: req.txid,
            txts: req.txts,
            data: req.data,
            current_outcome: Outcome::Yes,
            period_number: 0,
            challenging_target,
            yes_stake: 0,
            no_stake: 0,
            periods,
            created_ts: now,
            expiry_ts: now.plus_secs(first_period),
            is_large,
            withdrawn: false,
            finished: false,
        };

        let mut batch = WriteBatch::new();
        let claimant = claim.claimant_address.clone();
        StakeLedger::record(&mut claim, &mut batch, Outcome::Yes, &claimant, req.stake)?;
        batch
            .index_claim_id(claim_id, claim_num)
            .set_last_claim_num(claim_num)
            .put_claim(claim.clone());
        self.store.commit(batch)?;

        let net = claim.amount - claim.reward;
        if net > 0 {
            self.settlement
                .release(&claim.recipient_address, Asset::Claimed, net);
        }
        if claim.reward > 0 {
            self.settlement
                .release(&claim.claimant_address, Asset::Claimed, claim.reward);
        }
        self.settlement.notify(&SettlementNotice {
            claim_num,
            sender_address: claim.sender_address.clone(),
            address: claim.recipient_address.clone(),
            amount: claim.amount,
            kind: NoticeKind::Claimed,
        });
        self.events.emit(&ClaimEvent::NewClaim {
            claim_num,
            claimant: claim.claimant_address.clone(),
            amount: claim.amount,
            stake: req.stake,
            is_large,
        });
        tracing::info!(
            claim_num,
            amount = claim.amount,
            stake = req.stake,
            is_large,
            expiry = claim.expiry_ts.as_secs(),
            "new claim"
        );

        Ok(CreateReceipt {
            claim_num,
            claim_id,
            is_large,
            challenging_target,
            expiry_ts: claim.expiry_ts,
            message: format!(
                "challenging period expires in {} hours",
                format_hours(first_period)
            ),
        })
    }

    // ── Challenge ───────────────────────────────────────────────────────

    /// Stake on the currently losing outcome; flips the outcome once its total
    /// reaches the challenging target.
    pub fn challenge(
        &mut self,
        req: ChallengeRequest,
        now: Timestamp,
    ) -> Result<ChallengeReceipt, EngineError> {
        if req.stake == 0 {
            return Err(EngineError::Validation("stake must be positive".to_string()));
        }
        if !req.staker.is_valid() {
            return Err(EngineError::Validation("invalid staker address".to_string()));
        }

        let mut claim = ClaimRegistry::new(self.store.as_ref()).load(req.claim_num)?;
        if !claim.is_open(now) {
            return Err(EngineError::ChallengingPeriodExpired);
        }
        if req.outcome == claim.current_outcome {
            return Err(EngineError::OutcomeAlreadyCurrent);
        }

        let acceptance = StakeLedger::accept(&claim, req.outcome, req.stake);
        let mut batch = WriteBatch::new();
        StakeLedger::record(
            &mut claim,
            &mut batch,
            req.outcome,
            &req.staker,
            acceptance.accepted,
        )?;

        let flipped = claim.total(req.outcome) >= claim.challenging_target;
        if flipped {
            claim.current_outcome = req.outcome;
            claim.period_number = claim
                .period_number
                .checked_add(1)
                .ok_or(EngineError::Overflow)?;
            claim.challenging_target = self
                .params
                .counterstake_coef
                .ceil_mul(claim.challenging_target)
                .ok_or(EngineError::Overflow)?;
            claim.expiry_ts = now.plus_secs(claim.period_secs(claim.period_number));
        }
        batch.put_claim(claim.clone());
        self.store.commit(batch)?;

        if acceptance.refunded > 0 {
            self.settlement
                .refund(&req.staker, Asset::Bonding, acceptance.refunded);
        }
        self.events.emit(&ClaimEvent::Challenged {
            claim_num: claim.claim_num,
            staker: req.staker.clone(),
            outcome: req.outcome,
            accepted: acceptance.accepted,
            flipped,
            period_number: claim.period_number,
        });

        if flipped {
            tracing::info!(
                claim_num = claim.claim_num,
                outcome = %claim.current_outcome,
                period_number = claim.period_number,
                target = claim.challenging_target,
                "outcome flipped"
            );
        } else {
            tracing::debug!(
                claim_num = claim.claim_num,
                outcome = %req.outcome,
                accepted = acceptance.accepted,
                refunded = acceptance.refunded,
                "counterstake accepted"
            );
        }

        let message = format!(
            "current outcome {} {}. Total staked {} on yes, {} on no. Expires in {} hours.",
            if flipped { "became" } else { "stays" },
            claim.current_outcome,
            claim.yes_stake,
            claim.no_stake,
            format_hours(claim.expiry_ts.secs_after(now)),
        );

        Ok(ChallengeReceipt {
            claim_num: claim.claim_num,
            flipped,
            accepted: acceptance.accepted,
            refunded: acceptance.refunded,
            current_outcome: claim.current_outcome,
            period_number: claim.period_number,
            yes_stake: claim.yes_stake,
            no_stake: claim.no_stake,
            challenging_target: claim.challenging_target,
            expiry_ts: claim.expiry_ts,
            message,
        })
    }

    // ── Finalize / withdraw ─────────────────────────────────────────────

    /// Lock the claim with its current outcome once the period has expired.
    ///
    /// Calling this on an already-finished claim succeeds without effect.
    pub fn finalize(
        &mut self,
        claim_num: ClaimNum,
        now: Timestamp,
    ) -> Result<FinalizeReceipt, EngineError> {
        let mut claim = ClaimRegistry::new(self.store.as_ref()).load(claim_num)?;
        let newly_finished = lock_finished(&mut claim, now)?;
        if newly_finished {
            let mut batch = WriteBatch::new();
            batch.put_claim(claim.clone());
            self.store.commit(batch)?;
            self.announce_finished(&claim);
        }
        Ok(FinalizeReceipt {
            claim_num,
            outcome: claim.current_outcome,
            newly_finished,
            message: newly_finished.then(|| finished_message(claim_num)),
        })
    }

    /// Pay `beneficiary` their share of the pot, finalizing the claim first if
    /// this is the first call past expiry.
    pub fn withdraw(
        &mut self,
        claim_num: ClaimNum,
        beneficiary: &Address,
        now: Timestamp,
    ) -> Result<WithdrawReceipt, EngineError> {
        let mut claim = ClaimRegistry::new(self.store.as_ref()).load(claim_num)?;
        let newly_finished = lock_finished(&mut claim, now)?;

        let winning = claim.current_outcome;
        let ledger = StakeLedger::new(self.store.as_ref());
        let stake = ledger.stake_of(claim_num, winning, beneficiary)?;
        let party_path = winning == Outcome::Yes && claim.is_party(beneficiary);

        let mut batch = WriteBatch::new();
        let amount = if stake > 0 {
            if self.store.is_withdrawn(claim_num, beneficiary)? {
                return Err(EngineError::AlreadyWithdrawn);
            }
            batch.mark_withdrawn(claim_num, beneficiary.clone());
            if party_path {
                claim.withdrawn = true;
            }
            payout(
                stake,
                claim.total(winning),
                claim.total(winning.opposite()),
            )
            .ok_or(EngineError::Overflow)?
        } else if party_path {
            if claim.withdrawn {
                return Err(EngineError::AlreadyIssued);
            }
            claim.withdrawn = true;
            0
        } else {
            return Err(EngineError::NotEligible);
        };

        batch.put_claim(claim.clone());
        self.store.commit(batch)?;

        if newly_finished {
            self.announce_finished(&claim);
        }
        if amount > 0 {
            self.settlement.release(beneficiary, Asset::Bonding, amount);
        }
        self.events.emit(&ClaimEvent::Withdrawn {
            claim_num,
            beneficiary: beneficiary.clone(),
            payout: amount,
        });
        tracing::debug!(claim_num, beneficiary = %beneficiary, payout = amount, "withdrawn");

        Ok(WithdrawReceipt {
            claim_num,
            beneficiary: beneficiary.clone(),
            outcome: winning,
            payout: amount,
            message: newly_finished.then(|| finished_message(claim_num)),
        })
    }

    // ── Loss acknowledgement ────────────────────────────────────────────

    /// Mark a forfeited stake as accounted for, exactly once.
    pub fn acknowledge_loss(
        &mut self,
        claim_num: ClaimNum,
        staker: &Address,
    ) -> Result<LossReceipt, EngineError> {
        let claim = ClaimRegistry::new(self.store.as_ref()).load(claim_num)?;
        if !claim.finished {
            return Err(EngineError::NotFinished);
        }
        let ledger = StakeLedger::new(self.store.as_ref());
        if ledger.stake_of(claim_num, claim.current_outcome, staker)? > 0 {
            return Err(EngineError::StillWinning);
        }
        let forfeited = ledger.stake_of(claim_num, claim.current_outcome.opposite(), staker)?;
        if forfeited == 0 {
            return Err(EngineError::NothingToAcknowledge);
        }
        if self.store.is_loss_acknowledged(claim_num, staker)? {
            return Err(EngineError::AlreadyAccounted);
        }

        let mut batch = WriteBatch::new();
        batch.mark_loss_acknowledged(claim_num, staker.clone());
        self.store.commit(batch)?;

        self.events.emit(&ClaimEvent::LossAcknowledged {
            claim_num,
            staker: staker.clone(),
            forfeited,
        });
        tracing::debug!(claim_num, staker = %staker, forfeited, "loss acknowledged");

        Ok(LossReceipt {
            claim_num,
            staker: staker.clone(),
            forfeited,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn claim(&self, claim_num: ClaimNum) -> Result<Claim, EngineError> {
        ClaimRegistry::new(self.store.as_ref()).load(claim_num)
    }

    pub fn stake(
        &self,
        claim_num: ClaimNum,
        outcome: Outcome,
        staker: &Address,
    ) -> Result<Amount, EngineError> {
        StakeLedger::new(self.store.as_ref()).stake_of(claim_num, outcome, staker)
    }

    pub fn stakes_on(
        &self,
        claim_num: ClaimNum,
        outcome: Outcome,
    ) -> Result<Vec<StakeEntry>, EngineError> {
        StakeLedger::new(self.store.as_ref()).entries(claim_num, outcome)
    }

    /// Minimum initial stake for a claim of `amount` at the current price.
    pub fn required_stake(&self, amount: Amount) -> Result<Amount, EngineError> {
        let quote = self.price.get_price(&self.pair)?;
        Ok(price::required_stake(&self.params, quote, amount)?)
    }

    /// Stake still needed on `outcome` to flip the claim; zero for the
    /// current outcome.
    pub fn missing_stake(&self, claim_num: ClaimNum, outcome: Outcome) -> Result<Amount, EngineError> {
        let claim = self.claim(claim_num)?;
        if outcome == claim.current_outcome {
            return Ok(0);
        }
        Ok(claim
            .challenging_target
            .saturating_sub(claim.total(outcome)))
    }

    pub fn ongoing_claim_nums(&self) -> Result<Vec<ClaimNum>, EngineError> {
        ClaimRegistry::new(self.store.as_ref()).ongoing()
    }

    pub fn last_claim_num(&self) -> Result<ClaimNum, EngineError> {
        ClaimRegistry::new(self.store.as_ref()).last_claim_num()
    }

    fn announce_finished(&self, claim: &Claim) {
        self.settlement.notify(&SettlementNotice {
            claim_num: claim.claim_num,
            sender_address: claim.sender_address.clone(),
            address: claim.recipient_address.clone(),
            amount: claim.amount,
            kind: NoticeKind::Finished {
                outcome: claim.current_outcome,
            },
        });
        self.events.emit(&ClaimEvent::Finished {
            claim_num: claim.claim_num,
            outcome: claim.current_outcome,
        });
        tracing::info!(
            claim_num = claim.claim_num,
            outcome = %claim.current_outcome,
            yes = claim.yes_stake,
            no = claim.no_stake,
            "claim finished"
        );
    }
}

/// Set `finished` if the period has expired. Returns whether it changed.
fn lock_finished(claim: &mut Claim, now: Timestamp) -> Result<bool, EngineError> {
    if claim.finished {
        return Ok(false);
    }
    if !claim.expiry_ts.has_passed(now) {
        return Err(EngineError::ChallengingPeriodOngoing);
    }
    claim.finished = true;
    Ok(true)
}

fn finished_message(claim_num: ClaimNum) -> String {
    format!("finished claim {claim_num}")
}

fn validate_create(req: &CreateClaim) -> Result<(), EngineError> {
    let invalid = |msg: &str| Err(EngineError::Validation(msg.to_string()));
    if req.amount == 0 {
        return invalid("amount must be positive");
    }
    if req.reward > req.amount {
        return invalid("reward exceeds amount");
    }
    if req.stake == 0 {
        return invalid("stake must be positive");
    }
    if req.txid.trim().is_empty() {
        return invalid("txid must not be empty");
    }
    for (name, address) in [
        ("sender", &req.sender_address),
        ("recipient", &req.recipient_address),
        ("claimant", &req.claimant_address),
    ] {
        if !address.is_valid() {
            return Err(EngineError::Validation(format!("invalid {name} address")));
        }
    }
    Ok(())
}
