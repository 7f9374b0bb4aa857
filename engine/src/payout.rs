//! Pot distribution.
//!
//! Winners split the whole pot `W + L` pro rata to their winning stake:
//!
//! `payout(s) = floor(s × (W + L) / W)`
//!
//! Each floor loses strictly less than one unit, so the undistributed dust is
//! below the number of winning stakers. Dust stays in the pot.

use counterstake_types::Amount;

/// Payout owed to a winner holding `stake` of the `winning_total`, with
/// `losing_total` forfeited by the other side. `None` on overflow.
pub fn payout(stake: Amount, winning_total: Amount, losing_total: Amount) -> Option<Amount> {
    if winning_total == 0 {
        return Some(0);
    }
    let pot = winning_total.checked_add(losing_total)?;
    Some(stake.checked_mul(pot)? / winning_total)
}

/// Totals of a full distribution, used to reason about dust.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Distribution {
    pub pot: Amount,
    pub paid: Amount,
}

impl Distribution {
    pub fn dust(&self) -> Amount {
        self.pot.saturating_sub(self.paid)
    }
}

/// Distribute the pot among all `winning_stakes` (which must sum to the
/// winning total).
pub fn distribute(winning_stakes: &[Amount], losing_total: Amount) -> Option<Distribution> {
    let winning_total = winning_stakes
        .iter()
        .try_fold(0u128, |acc, s| acc.checked_add(*s))?;
    let pot = winning_total.checked_add(losing_total)?;
    let paid = winning_stakes.iter().try_fold(0u128, |acc, s| {
        acc.checked_add(payout(*s, winning_total, losing_total)?)
    })?;
    Some(Distribution { pot, paid })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_winners_leave_one_unit_of_dust() {
        // W = 15 (5 + 10), L = 10.
        assert_eq!(payout(5, 15, 10), Some(8));
        assert_eq!(payout(10, 15, 10), Some(16));
        let d = distribute(&[5, 10], 10).unwrap();
        assert_eq!(d.pot, 25);
        assert_eq!(d.paid, 24);
        assert_eq!(d.dust(), 1);
    }

    #[test]
    fn sole_winner_takes_everything() {
        assert_eq!(payout(10, 10, 15), Some(25));
    }

    #[test]
    fn uncontested_claim_returns_stake() {
        assert_eq!(payout(10, 10, 0), Some(10));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(payout(u128::MAX, u128::MAX, 1), None);
    }
}
