//! Claim Registry — claim records, identity-key dedup and numbering.

use counterstake_store::CounterstakeStore;
use counterstake_types::{Claim, ClaimId, ClaimNum, Outcome};

use crate::error::EngineError;

pub struct ClaimRegistry<'a> {
    store: &'a dyn CounterstakeStore,
}

impl<'a> ClaimRegistry<'a> {
    pub fn new(store: &'a dyn CounterstakeStore) -> Self {
        Self { store }
    }

    /// Load a claim or fail with `NoSuchClaim`.
    pub fn load(&self, claim_num: ClaimNum) -> Result<Claim, EngineError> {
        self.store
            .get_claim(claim_num)?
            .ok_or(EngineError::NoSuchClaim)
    }

    /// Number the next claim will get.
    pub fn next_claim_num(&self) -> Result<ClaimNum, EngineError> {
        self.store
            .last_claim_num()?
            .checked_add(1)
            .ok_or(EngineError::Overflow)
    }

    /// Fail with `DuplicateClaim` unless `claim_id` may be claimed now.
    ///
    /// An identity key is free if it was never claimed, or if its latest claim
    /// finished with outcome `no` (the transfer was judged not to have
    /// happened, so nothing was ultimately owed for it).
    pub fn ensure_claimable(&self, claim_id: &ClaimId) -> Result<(), EngineError> {
        let Some(existing) = self.store.claim_num_by_id(claim_id)? else {
            return Ok(());
        };
        let claim = self
            .store
            .get_claim(existing)?
            .ok_or_else(|| {
                counterstake_store::StoreError::Corruption(format!(
                    "identity index points at missing claim {existing}"
                ))
            })?;
        if claim.finished && claim.current_outcome == Outcome::No {
            Ok(())
        } else {
            Err(EngineError::DuplicateClaim)
        }
    }

    pub fn last_claim_num(&self) -> Result<ClaimNum, EngineError> {
        Ok(self.store.last_claim_num()?)
    }

    pub fn ongoing(&self) -> Result<Vec<ClaimNum>, EngineError> {
        Ok(self.store.ongoing_claim_nums()?)
    }
}
