//! Stake ledger storage trait.

use crate::StoreError;
use counterstake_types::{Address, Amount, ClaimNum, Outcome};
use serde::{Deserialize, Serialize};

/// One staker's balance on one outcome of one claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEntry {
    pub staker: Address,
    pub amount: Amount,
}

/// Read access to per-claim, per-outcome, per-staker balances.
///
/// Entries are always positive: a staker with nothing on an outcome has no
/// entry rather than a zero one.
pub trait StakeStore {
    /// Balance of `staker` on `outcome`, zero when absent.
    fn get_stake(
        &self,
        claim_num: ClaimNum,
        outcome: Outcome,
        staker: &Address,
    ) -> Result<Amount, StoreError>;

    /// All entries on one outcome of a claim, ordered by staker.
    fn stakes_on(&self, claim_num: ClaimNum, outcome: Outcome) -> Result<Vec<StakeEntry>, StoreError>;

    /// Whether `address` has already been paid out for this claim.
    fn is_withdrawn(&self, claim_num: ClaimNum, address: &Address) -> Result<bool, StoreError>;

    /// Whether a forfeited stake of `staker` has been acknowledged.
    fn is_loss_acknowledged(&self, claim_num: ClaimNum, staker: &Address) -> Result<bool, StoreError>;
}
