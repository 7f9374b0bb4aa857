//! Staged mutations of a single engine operation.
//!
//! A batch is built while an operation runs and committed at its end. If the
//! operation fails, the batch is dropped and the store is left untouched.

use crate::StoreError;
use counterstake_types::{Address, Amount, Claim, ClaimId, ClaimNum, Outcome};

/// One staged mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite a claim record.
    PutClaim(Claim),
    /// Point an identity key at a claim number.
    IndexClaimId { claim_id: ClaimId, claim_num: ClaimNum },
    /// Advance the claim-number counter.
    SetLastClaimNum(ClaimNum),
    /// Add to a staker's balance on one outcome.
    AddStake {
        claim_num: ClaimNum,
        outcome: Outcome,
        staker: Address,
        amount: Amount,
    },
    /// Record that `address` has been paid out for a claim.
    MarkWithdrawn { claim_num: ClaimNum, address: Address },
    /// Record that a forfeited stake has been acknowledged.
    MarkLossAcknowledged { claim_num: ClaimNum, staker: Address },
}

/// Ordered list of mutations applied atomically by
/// [`CounterstakeStore::commit`](crate::CounterstakeStore::commit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_claim(&mut self, claim: Claim) -> &mut Self {
        self.ops.push(WriteOp::PutClaim(claim));
        self
    }

    pub fn index_claim_id(&mut self, claim_id: ClaimId, claim_num: ClaimNum) -> &mut Self {
        self.ops.push(WriteOp::IndexClaimId { claim_id, claim_num });
        self
    }

    pub fn set_last_claim_num(&mut self, claim_num: ClaimNum) -> &mut Self {
        self.ops.push(WriteOp::SetLastClaimNum(claim_num));
        self
    }

    pub fn add_stake(
        &mut self,
        claim_num: ClaimNum,
        outcome: Outcome,
        staker: Address,
        amount: Amount,
    ) -> &mut Self {
        self.ops.push(WriteOp::AddStake {
            claim_num,
            outcome,
            staker,
            amount,
        });
        self
    }

    pub fn mark_withdrawn(&mut self, claim_num: ClaimNum, address: Address) -> &mut Self {
        self.ops.push(WriteOp::MarkWithdrawn { claim_num, address });
        self
    }

    pub fn mark_loss_acknowledged(&mut self, claim_num: ClaimNum, staker: Address) -> &mut Self {
        self.ops.push(WriteOp::MarkLossAcknowledged { claim_num, staker });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Reject writes that would break ledger invariants.
    ///
    /// Backends call this before touching storage.
    pub fn validate(&self) -> Result<(), StoreError> {
        for op in &self.ops {
            if let WriteOp::AddStake {
                claim_num, amount, ..
            } = op
            {
                if *amount == 0 {
                    return Err(StoreError::InvalidWrite(format!(
                        "zero stake for claim {claim_num}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stake_is_rejected() {
        let mut batch = WriteBatch::new();
        batch.add_stake(1, Outcome::No, Address::new("a"), 0);
        assert!(matches!(batch.validate(), Err(StoreError::InvalidWrite(_))));
    }

    #[test]
    fn ops_keep_insertion_order() {
        let mut batch = WriteBatch::new();
        batch
            .set_last_claim_num(3)
            .mark_withdrawn(3, Address::new("a"));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.ops()[0], WriteOp::SetLastClaimNum(3));
    }
}
