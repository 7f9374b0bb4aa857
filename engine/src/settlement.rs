//! Settlement Executor seam.
//!
//! The engine computes what must move and tells the executor after the
//! operation has committed. Executors queue the instruction; they cannot veto
//! it, so the trait methods do not return errors.

use counterstake_types::{Address, Amount, ClaimNum, Outcome};
use serde::{Deserialize, Serialize};

/// Which asset a transfer is denominated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// The asset whose remote transfer was claimed.
    Claimed,
    /// The asset stakes are posted in.
    Bonding,
}

/// Why a settlement notice was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Claimed,
    Finished { outcome: Outcome },
}

/// Reconciliation record for off-ledger bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementNotice {
    pub claim_num: ClaimNum,
    pub sender_address: Address,
    pub address: Address,
    pub amount: Amount,
    pub kind: NoticeKind,
}

/// Performs the physical movement of value computed by the engine.
pub trait SettlementExecutor: Send + Sync {
    /// Pay `amount` of `asset` to `to`.
    fn release(&self, to: &Address, asset: Asset, amount: Amount);

    /// Return an unaccepted part of a stake.
    fn refund(&self, to: &Address, asset: Asset, amount: Amount);

    /// Reconciliation notice on claim creation and finalization.
    fn notify(&self, notice: &SettlementNotice);
}
