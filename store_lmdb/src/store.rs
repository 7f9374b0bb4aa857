//! LMDB implementation of the claim and stake stores.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use counterstake_store::{
    ClaimStore, CounterstakeStore, StakeEntry, StakeStore, StoreError, WriteBatch, WriteOp,
};
use counterstake_types::{Address, Amount, Claim, ClaimId, ClaimNum, Outcome};

use crate::LmdbError;

const LAST_CLAIM_NUM_KEY: &[u8] = b"last_claim_num";

/// Handle onto the counterstake tables of an [`LmdbEnvironment`](crate::LmdbEnvironment).
#[derive(Clone)]
pub struct LmdbStore {
    pub(crate) env: Arc<Env>,
    pub(crate) claims_db: Database<Bytes, Bytes>,
    pub(crate) claim_ids_db: Database<Bytes, Bytes>,
    pub(crate) ongoing_db: Database<Bytes, Bytes>,
    pub(crate) stakes_db: Database<Bytes, Bytes>,
    pub(crate) withdrawn_db: Database<Bytes, Bytes>,
    pub(crate) acknowledged_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

// ── Key layout ──────────────────────────────────────────────────────────

fn claim_key(claim_num: ClaimNum) -> [u8; 8] {
    claim_num.to_be_bytes()
}

fn stake_prefix(claim_num: ClaimNum, outcome: Outcome) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.extend_from_slice(&claim_num.to_be_bytes());
    key.push(outcome.to_byte());
    key
}

fn stake_key(claim_num: ClaimNum, outcome: Outcome, staker: &Address) -> Vec<u8> {
    let mut key = stake_prefix(claim_num, outcome);
    key.extend_from_slice(staker.as_str().as_bytes());
    key
}

fn address_key(claim_num: ClaimNum, address: &Address) -> Vec<u8> {
    let mut key = claim_num.to_be_bytes().to_vec();
    key.extend_from_slice(address.as_str().as_bytes());
    key
}

fn decode_u64(bytes: &[u8], what: &str) -> Result<u64, LmdbError> {
    if bytes.len() != 8 {
        return Err(LmdbError::Serialization(format!(
            "invalid {what} bytes length"
        )));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf))
}

fn decode_amount(bytes: &[u8]) -> Result<Amount, LmdbError> {
    if bytes.len() != 16 {
        return Err(LmdbError::Serialization(
            "invalid stake bytes length".to_string(),
        ));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(buf))
}

impl LmdbStore {
    fn apply(&self, wtxn: &mut RwTxn, op: WriteOp) -> Result<(), LmdbError> {
        match op {
            WriteOp::PutClaim(claim) => {
                let key = claim_key(claim.claim_num);
                let value = bincode::serialize(&claim)?;
                self.claims_db.put(wtxn, &key, &value)?;
                if claim.finished {
                    self.ongoing_db.delete(wtxn, &key)?;
                } else {
                    self.ongoing_db.put(wtxn, &key, &[])?;
                }
            }
            WriteOp::IndexClaimId {
                claim_id,
                claim_num,
            } => {
                self.claim_ids_db
                    .put(wtxn, claim_id.as_bytes(), &claim_key(claim_num))?;
            }
            WriteOp::SetLastClaimNum(claim_num) => {
                self.meta_db
                    .put(wtxn, LAST_CLAIM_NUM_KEY, &claim_num.to_be_bytes())?;
            }
            WriteOp::AddStake {
                claim_num,
                outcome,
                staker,
                amount,
            } => {
                let key = stake_key(claim_num, outcome, &staker);
                let current = match self.stakes_db.get(wtxn, &key)? {
                    Some(bytes) => decode_amount(bytes)?,
                    None => 0,
                };
                let updated = current
                    .checked_add(amount)
                    .ok_or_else(|| LmdbError::InvalidWrite("stake overflow".to_string()))?;
                self.stakes_db.put(wtxn, &key, &updated.to_be_bytes())?;
            }
            WriteOp::MarkWithdrawn { claim_num, address } => {
                self.withdrawn_db
                    .put(wtxn, &address_key(claim_num, &address), &[])?;
            }
            WriteOp::MarkLossAcknowledged { claim_num, staker } => {
                self.acknowledged_db
                    .put(wtxn, &address_key(claim_num, &staker), &[])?;
            }
        }
        Ok(())
    }

    fn contains(&self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(db.get(&rtxn, key).map_err(LmdbError::from)?.is_some())
    }
}

impl ClaimStore for LmdbStore {
    fn get_claim(&self, claim_num: ClaimNum) -> Result<Option<Claim>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .claims_db
            .get(&rtxn, &claim_key(claim_num))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn claim_num_by_id(&self, claim_id: &ClaimId) -> Result<Option<ClaimNum>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .claim_ids_db
            .get(&rtxn, claim_id.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(decode_u64(bytes, "claim number")?)),
            None => Ok(None),
        }
    }

    fn last_claim_num(&self) -> Result<ClaimNum, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .meta_db
            .get(&rtxn, LAST_CLAIM_NUM_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode_u64(bytes, "last claim number")?),
            None => Ok(0),
        }
    }

    fn ongoing_claim_nums(&self) -> Result<Vec<ClaimNum>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.ongoing_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut nums = Vec::new();
        for entry in iter {
            let (key, _) = entry.map_err(LmdbError::from)?;
            nums.push(decode_u64(key, "claim number")?);
        }
        Ok(nums)
    }
}

impl StakeStore for LmdbStore {
    fn get_stake(
        &self,
        claim_num: ClaimNum,
        outcome: Outcome,
        staker: &Address,
    ) -> Result<Amount, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .stakes_db
            .get(&rtxn, &stake_key(claim_num, outcome, staker))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode_amount(bytes)?),
            None => Ok(0),
        }
    }

    fn stakes_on(&self, claim_num: ClaimNum, outcome: Outcome) -> Result<Vec<StakeEntry>, StoreError> {
        let prefix = stake_prefix(claim_num, outcome);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .stakes_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for entry in iter {
            let (key, value) = entry.map_err(LmdbError::from)?;
            let staker = std::str::from_utf8(&key[prefix.len()..])
                .map_err(|e| LmdbError::Serialization(e.to_string()))?;
            entries.push(StakeEntry {
                staker: Address::new(staker),
                amount: decode_amount(value)?,
            });
        }
        Ok(entries)
    }

    fn is_withdrawn(&self, claim_num: ClaimNum, address: &Address) -> Result<bool, StoreError> {
        self.contains(self.withdrawn_db, &address_key(claim_num, address))
    }

    fn is_loss_acknowledged(&self, claim_num: ClaimNum, staker: &Address) -> Result<bool, StoreError> {
        self.contains(self.acknowledged_db, &address_key(claim_num, staker))
    }
}

impl CounterstakeStore for LmdbStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        batch.validate()?;
        let ops = batch.len();
        // Dropping the transaction on error aborts every op already applied.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for op in batch {
            self.apply(&mut wtxn, op)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(ops, "batch committed");
        Ok(())
    }
}
