//! Stake Ledger — per-claim, per-outcome, per-staker balances.
//!
//! Reads come straight from the store; writes are staged in the operation's
//! [`WriteBatch`] together with the matching change to the claim's recorded
//! totals, so the two can never diverge.

use counterstake_store::{CounterstakeStore, StakeEntry, WriteBatch};
use counterstake_types::{Address, Amount, Claim, ClaimNum, Outcome};

use crate::error::EngineError;

/// Split of a requested counterstake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Acceptance {
    /// Part recorded on the ledger.
    pub accepted: Amount,
    /// Part returned to the staker immediately.
    pub refunded: Amount,
}

pub struct StakeLedger<'a> {
    store: &'a dyn CounterstakeStore,
}

impl<'a> StakeLedger<'a> {
    pub fn new(store: &'a dyn CounterstakeStore) -> Self {
        Self { store }
    }

    pub fn stake_of(
        &self,
        claim_num: ClaimNum,
        outcome: Outcome,
        staker: &Address,
    ) -> Result<Amount, EngineError> {
        Ok(self.store.get_stake(claim_num, outcome, staker)?)
    }

    pub fn entries(
        &self,
        claim_num: ClaimNum,
        outcome: Outcome,
    ) -> Result<Vec<StakeEntry>, EngineError> {
        Ok(self.store.stakes_on(claim_num, outcome)?)
    }

    /// Accept at most what the losing side still lacks to reach the target.
    pub fn accept(claim: &Claim, outcome: Outcome, requested: Amount) -> Acceptance {
        let missing = claim
            .challenging_target
            .saturating_sub(claim.total(outcome));
        let accepted = requested.min(missing);
        Acceptance {
            accepted,
            refunded: requested - accepted,
        }
    }

    /// Stage `amount` on `outcome` for `staker`, updating the claim's totals.
    pub fn record(
        claim: &mut Claim,
        batch: &mut WriteBatch,
        outcome: Outcome,
        staker: &Address,
        amount: Amount,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Ok(());
        }
        claim
            .add_to_total(outcome, amount)
            .ok_or(EngineError::Overflow)?;
        batch.add_stake(claim.claim_num, outcome, staker.clone(), amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterstake_store::WriteOp;
    use counterstake_types::{ClaimId, Timestamp};

    fn claim(target: Amount, yes: Amount, no: Amount) -> Claim {
        Claim {
            claim_num: 7,
            claim_id: ClaimId::new([0; 32]),
            amount: 10,
            reward: 0,
            sender_address: Address::new("s"),
            recipient_address: Address::new("r"),
            claimant_address: Address::new("r"),
            txid: "tx".into(),
            txts: Timestamp::new(0),
            data: String::new(),
            current_outcome: Outcome::Yes,
            period_number: 0,
            challenging_target: target,
            yes_stake: yes,
            no_stake: no,
            periods: vec![100],
            created_ts: Timestamp::new(0),
            expiry_ts: Timestamp::new(100),
            is_large: false,
            withdrawn: false,
            finished: false,
        }
    }

    #[test]
    fn accept_caps_at_missing_amount() {
        let c = claim(15, 10, 5);
        assert_eq!(
            StakeLedger::accept(&c, Outcome::No, 20),
            Acceptance {
                accepted: 10,
                refunded: 10
            }
        );
        assert_eq!(
            StakeLedger::accept(&c, Outcome::No, 3),
            Acceptance {
                accepted: 3,
                refunded: 0
            }
        );
    }

    #[test]
    fn record_updates_totals_and_batch_together() {
        let mut c = claim(15, 10, 0);
        let mut batch = WriteBatch::new();
        let staker = Address::new("a");
        StakeLedger::record(&mut c, &mut batch, Outcome::No, &staker, 5).unwrap();
        assert_eq!(c.no_stake, 5);
        assert_eq!(
            batch.ops(),
            &[WriteOp::AddStake {
                claim_num: 7,
                outcome: Outcome::No,
                staker,
                amount: 5
            }]
        );
    }

    #[test]
    fn zero_amount_records_nothing() {
        let mut c = claim(15, 10, 0);
        let mut batch = WriteBatch::new();
        StakeLedger::record(&mut c, &mut batch, Outcome::No, &Address::new("a"), 0).unwrap();
        assert!(batch.is_empty());
        assert_eq!(c.no_stake, 0);
    }
}
