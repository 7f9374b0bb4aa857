//! Operation journal: the replayable record of engine calls.
//!
//! One [`JournalEntry`] per line (JSON). Replaying the same journal against an
//! empty store reproduces the same claims, stakes and results, because the
//! engine only ever sees the timestamps written in the journal.

use serde::{Deserialize, Serialize};

use counterstake_engine::{
    ChallengeReceipt, ChallengeRequest, CreateClaim, CreateReceipt, FinalizeReceipt, LossReceipt,
    WithdrawReceipt,
};
use counterstake_types::{Address, Claim, ClaimNum, CounterstakeParams, Timestamp};

use crate::NodeError;

/// One engine call, keyed by its name: `{"challenge": {...}}`.
///
/// Externally tagged so that the 128-bit amount fields deserialize straight
/// from the input instead of through serde's buffered representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create(CreateClaim),
    Challenge(ChallengeRequest),
    Finalize {
        claim_num: ClaimNum,
    },
    Withdraw {
        claim_num: ClaimNum,
        beneficiary: Address,
    },
    AcknowledgeLoss {
        claim_num: ClaimNum,
        staker: Address,
    },
    UpdateParams(CounterstakeParams),
    GetClaim {
        claim_num: ClaimNum,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Challenge(_) => "challenge",
            Self::Finalize { .. } => "finalize",
            Self::Withdraw { .. } => "withdraw",
            Self::AcknowledgeLoss { .. } => "acknowledge_loss",
            Self::UpdateParams(_) => "update_params",
            Self::GetClaim { .. } => "get_claim",
        }
    }
}

/// A timestamped operation. Without `ts` the sequencer's clock is used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Timestamp>,
    pub op: Operation,
}

/// What a successful operation returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    Created(CreateReceipt),
    Challenged(ChallengeReceipt),
    Finalized(FinalizeReceipt),
    Withdrawn(WithdrawReceipt),
    LossAcknowledged(LossReceipt),
    ParamsUpdated,
    Claim(Claim),
}

/// Parse a JSON-lines journal. Blank lines and lines starting with `#` are
/// skipped.
pub fn parse_journal(input: &str) -> Result<Vec<JournalEntry>, NodeError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| NodeError::Journal {
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}
