//! The claim record.

use crate::{Address, Amount, ClaimId, Outcome, Timestamp};
use serde::{Deserialize, Serialize};

/// Sequential claim number. The first claim is number 1.
pub type ClaimNum = u64;

/// A claim that a transfer happened on the remote ledger, together with the
/// running state of its dispute.
///
/// Claims are never deleted; once `finished` they remain as an audit record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_num: ClaimNum,
    pub claim_id: ClaimId,

    // ── What was claimed ────────────────────────────────────────────────
    pub amount: Amount,
    pub reward: Amount,
    /// Origin-side sender of the remote transfer.
    pub sender_address: Address,
    /// Beneficiary of the released value.
    pub recipient_address: Address,
    /// Poster of the initial stake.
    pub claimant_address: Address,
    pub txid: String,
    pub txts: Timestamp,
    /// Opaque payload forwarded with the transfer.
    pub data: String,

    // ── Dispute state ───────────────────────────────────────────────────
    pub current_outcome: Outcome,
    pub period_number: u32,
    /// Total the losing side must reach to flip the outcome.
    pub challenging_target: Amount,
    pub yes_stake: Amount,
    pub no_stake: Amount,
    /// Challenging periods (seconds) fixed at creation from the normal or
    /// large schedule.
    pub periods: Vec<u64>,
    pub created_ts: Timestamp,
    pub expiry_ts: Timestamp,
    pub is_large: bool,
    /// Set once the recipient/claimant path has been issued after a `yes` result.
    pub withdrawn: bool,
    pub finished: bool,
}

impl Claim {
    /// Recorded stake total for one outcome.
    pub fn total(&self, outcome: Outcome) -> Amount {
        match outcome {
            Outcome::Yes => self.yes_stake,
            Outcome::No => self.no_stake,
        }
    }

    /// Add to the recorded total for one outcome, `None` on overflow.
    pub fn add_to_total(&mut self, outcome: Outcome, amount: Amount) -> Option<()> {
        let slot = match outcome {
            Outcome::Yes => &mut self.yes_stake,
            Outcome::No => &mut self.no_stake,
        };
        *slot = slot.checked_add(amount)?;
        Some(())
    }

    /// Length of the challenging period for `period_number`; the last entry
    /// repeats once the schedule is exhausted.
    pub fn period_secs(&self, period_number: u32) -> u64 {
        let last = self.periods.len().saturating_sub(1);
        let idx = (period_number as usize).min(last);
        self.periods.get(idx).copied().unwrap_or_default()
    }

    /// When the current period began: creation, or the latest flip.
    pub fn period_start(&self) -> Timestamp {
        Timestamp::new(
            self.expiry_ts
                .as_secs()
                .saturating_sub(self.period_secs(self.period_number)),
        )
    }

    /// Whether challenges are still accepted at `now`.
    pub fn is_open(&self, now: Timestamp) -> bool {
        !self.finished && !self.expiry_ts.has_passed(now)
    }

    /// Whether `address` is the claimant or the recipient.
    pub fn is_party(&self, address: &Address) -> bool {
        *address == self.recipient_address || *address == self.claimant_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Claim {
        Claim {
            claim_num: 1,
            claim_id: ClaimId::new([1; 32]),
            amount: 10,
            reward: 0,
            sender_address: Address::new("s"),
            recipient_address: Address::new("r"),
            claimant_address: Address::new("c"),
            txid: "tx".into(),
            txts: Timestamp::new(0),
            data: String::new(),
            current_outcome: Outcome::Yes,
            period_number: 0,
            challenging_target: 15,
            yes_stake: 10,
            no_stake: 0,
            periods: vec![10, 20, 30],
            created_ts: Timestamp::new(0),
            expiry_ts: Timestamp::new(10),
            is_large: false,
            withdrawn: false,
            finished: false,
        }
    }

    #[test]
    fn period_schedule_repeats_last_entry() {
        let claim = sample();
        assert_eq!(claim.period_secs(0), 10);
        assert_eq!(claim.period_secs(2), 30);
        assert_eq!(claim.period_secs(9), 30);
    }

    #[test]
    fn period_start_follows_the_latest_flip() {
        let mut claim = sample();
        assert_eq!(claim.period_start(), Timestamp::new(0));
        claim.period_number = 1;
        claim.expiry_ts = Timestamp::new(27);
        assert_eq!(claim.period_start(), Timestamp::new(7));
    }

    #[test]
    fn open_until_expiry() {
        let mut claim = sample();
        assert!(claim.is_open(Timestamp::new(9)));
        assert!(!claim.is_open(Timestamp::new(10)));
        claim.finished = true;
        assert!(!claim.is_open(Timestamp::new(0)));
    }

    #[test]
    fn totals_track_each_side() {
        let mut claim = sample();
        claim.add_to_total(Outcome::No, 5).unwrap();
        assert_eq!(claim.total(Outcome::No), 5);
        assert_eq!(claim.total(Outcome::Yes), 10);
        claim.yes_stake = u128::MAX;
        assert!(claim.add_to_total(Outcome::Yes, 1).is_none());
    }
}
