//! Requests accepted and receipts returned by the engine.

use counterstake_types::{Address, Amount, ClaimId, ClaimNum, Outcome, Timestamp};
use serde::{Deserialize, Serialize};

/// A new claim on a remote transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClaim {
    pub sender_address: Address,
    pub recipient_address: Address,
    pub claimant_address: Address,
    pub txid: String,
    pub txts: Timestamp,
    pub amount: Amount,
    #[serde(default)]
    pub reward: Amount,
    #[serde(default)]
    pub data: String,
    /// Initial stake on `yes`, in bonding-asset units.
    pub stake: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReceipt {
    pub claim_num: ClaimNum,
    pub claim_id: ClaimId,
    pub is_large: bool,
    pub challenging_target: Amount,
    pub expiry_ts: Timestamp,
    pub message: String,
}

/// A counterstake on the outcome that is currently losing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRequest {
    pub claim_num: ClaimNum,
    pub staker: Address,
    pub outcome: Outcome,
    pub stake: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeReceipt {
    pub claim_num: ClaimNum,
    pub flipped: bool,
    pub accepted: Amount,
    pub refunded: Amount,
    pub current_outcome: Outcome,
    pub period_number: u32,
    pub yes_stake: Amount,
    pub no_stake: Amount,
    pub challenging_target: Amount,
    pub expiry_ts: Timestamp,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeReceipt {
    pub claim_num: ClaimNum,
    pub outcome: Outcome,
    /// Whether this call locked the claim.
    pub newly_finished: bool,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub claim_num: ClaimNum,
    pub beneficiary: Address,
    pub outcome: Outcome,
    pub payout: Amount,
    /// `"finished claim <n>"` on the call that finalized the claim.
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossReceipt {
    pub claim_num: ClaimNum,
    pub staker: Address,
    pub forfeited: Amount,
}
