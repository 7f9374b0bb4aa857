//! Nullable store — thread-safe in-memory storage for testing.

use counterstake_store::{
    ClaimStore, CounterstakeStore, StakeEntry, StakeStore, StoreError, WriteBatch, WriteOp,
};
use counterstake_types::{Address, Amount, Claim, ClaimId, ClaimNum, Outcome};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Clone, Default)]
struct Tables {
    claims: BTreeMap<ClaimNum, Claim>,
    ids: HashMap<ClaimId, ClaimNum>,
    last_claim_num: ClaimNum,
    stakes: BTreeMap<(ClaimNum, Outcome, Address), Amount>,
    withdrawn: BTreeSet<(ClaimNum, Address)>,
    acknowledged: BTreeSet<(ClaimNum, Address)>,
}

impl Tables {
    fn apply(&mut self, op: WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::PutClaim(claim) => {
                self.claims.insert(claim.claim_num, claim);
            }
            WriteOp::IndexClaimId {
                claim_id,
                claim_num,
            } => {
                self.ids.insert(claim_id, claim_num);
            }
            WriteOp::SetLastClaimNum(n) => self.last_claim_num = n,
            WriteOp::AddStake {
                claim_num,
                outcome,
                staker,
                amount,
            } => {
                let slot = self.stakes.entry((claim_num, outcome, staker)).or_default();
                *slot = slot
                    .checked_add(amount)
                    .ok_or_else(|| StoreError::InvalidWrite("stake overflow".to_string()))?;
            }
            WriteOp::MarkWithdrawn { claim_num, address } => {
                self.withdrawn.insert((claim_num, address));
            }
            WriteOp::MarkLossAcknowledged { claim_num, staker } => {
                self.acknowledged.insert((claim_num, staker));
            }
        }
        Ok(())
    }
}

/// An in-memory counterstake store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullStore {
    tables: Mutex<Tables>,
    fail_next_commit: AtomicBool,
    commits: Mutex<u64>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit` fail with a backend error without applying anything.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        *self.commits.lock().unwrap()
    }
}

impl ClaimStore for NullStore {
    fn get_claim(&self, claim_num: ClaimNum) -> Result<Option<Claim>, StoreError> {
        Ok(self.tables.lock().unwrap().claims.get(&claim_num).cloned())
    }

    fn claim_num_by_id(&self, claim_id: &ClaimId) -> Result<Option<ClaimNum>, StoreError> {
        Ok(self.tables.lock().unwrap().ids.get(claim_id).copied())
    }

    fn last_claim_num(&self) -> Result<ClaimNum, StoreError> {
        Ok(self.tables.lock().unwrap().last_claim_num)
    }

    fn ongoing_claim_nums(&self) -> Result<Vec<ClaimNum>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .claims
            .values()
            .filter(|c| !c.finished)
            .map(|c| c.claim_num)
            .collect())
    }
}

impl StakeStore for NullStore {
    fn get_stake(
        &self,
        claim_num: ClaimNum,
        outcome: Outcome,
        staker: &Address,
    ) -> Result<Amount, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .stakes
            .get(&(claim_num, outcome, staker.clone()))
            .copied()
            .unwrap_or(0))
    }

    fn stakes_on(&self, claim_num: ClaimNum, outcome: Outcome) -> Result<Vec<StakeEntry>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .stakes
            .iter()
            .filter(|((n, o, _), _)| *n == claim_num && *o == outcome)
            .map(|((_, _, staker), amount)| StakeEntry {
                staker: staker.clone(),
                amount: *amount,
            })
            .collect())
    }

    fn is_withdrawn(&self, claim_num: ClaimNum, address: &Address) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .withdrawn
            .contains(&(claim_num, address.clone())))
    }

    fn is_loss_acknowledged(&self, claim_num: ClaimNum, staker: &Address) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .acknowledged
            .contains(&(claim_num, staker.clone())))
    }
}

impl CounterstakeStore for NullStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        batch.validate()?;
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        // Apply to a copy and swap, so a failing op leaves nothing behind.
        let mut staged = tables.clone();
        for op in batch {
            staged.apply(op)?;
        }
        *tables = staged;
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }
}
