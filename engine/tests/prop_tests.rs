mod common;

use proptest::prelude::*;

use common::*;
use counterstake_engine::payout::{distribute, payout};
use counterstake_types::Outcome;

const STAKERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

proptest! {
    /// The challenging target never decreases, and the total on the losing
    /// side never exceeds it.
    #[test]
    fn target_is_monotonic_and_bounds_the_losing_side(
        steps in prop::collection::vec((0usize..4, 1u128..200), 1..30),
    ) {
        let mut h = harness();
        h.engine.create(claim_request("tx", 10, 10), at(0)).unwrap();

        let mut target = h.engine.claim(1).unwrap().challenging_target;
        for (i, (who, amount)) in steps.into_iter().enumerate() {
            let claim = h.engine.claim(1).unwrap();
            let outcome = claim.current_outcome.opposite();
            let r = h
                .engine
                .challenge(challenge(1, STAKERS[who], outcome, amount), at(60 * (i as u64 + 1)))
                .unwrap();

            prop_assert!(r.challenging_target >= target);
            prop_assert_eq!(r.accepted + r.refunded, amount);
            let after = h.engine.claim(1).unwrap();
            let losing = after.total(after.current_outcome.opposite());
            prop_assert!(losing < after.challenging_target);
            if r.flipped {
                prop_assert_eq!(after.current_outcome, outcome);
                prop_assert!(r.challenging_target > target);
            }
            target = r.challenging_target;
        }
    }

    /// Per-outcome totals on the claim always equal the sum of the ledger.
    #[test]
    fn claim_totals_match_ledger(
        steps in prop::collection::vec((0usize..4, 1u128..200), 0..30),
    ) {
        let mut h = harness();
        h.engine.create(claim_request("tx", 10, 10), at(0)).unwrap();

        for (i, (who, amount)) in steps.into_iter().enumerate() {
            let outcome = h.engine.claim(1).unwrap().current_outcome.opposite();
            h.engine
                .challenge(challenge(1, STAKERS[who], outcome, amount), at(60 * (i as u64 + 1)))
                .unwrap();
        }

        let claim = h.engine.claim(1).unwrap();
        for outcome in [Outcome::Yes, Outcome::No] {
            let ledger: u128 = h
                .engine
                .stakes_on(1, outcome)
                .unwrap()
                .iter()
                .map(|e| e.amount)
                .sum();
            prop_assert_eq!(ledger, claim.total(outcome));
        }
    }

    /// Every winner withdraws once; the pot is never overdrawn and the dust is
    /// below the number of winners.
    #[test]
    fn payouts_never_exceed_pot(
        steps in prop::collection::vec((0usize..4, 1u128..200), 0..30),
    ) {
        let mut h = harness();
        h.engine.create(claim_request("tx", 10, 10), at(0)).unwrap();
        for (i, (who, amount)) in steps.into_iter().enumerate() {
            let outcome = h.engine.claim(1).unwrap().current_outcome.opposite();
            h.engine
                .challenge(challenge(1, STAKERS[who], outcome, amount), at(60 * (i as u64 + 1)))
                .unwrap();
        }

        let expiry = h.engine.claim(1).unwrap().expiry_ts;
        h.engine.finalize(1, expiry).unwrap();
        let claim = h.engine.claim(1).unwrap();
        let winners = h.engine.stakes_on(1, claim.current_outcome).unwrap();

        let mut paid = 0u128;
        for entry in &winners {
            paid += h.engine.withdraw(1, &entry.staker, expiry).unwrap().payout;
        }
        let pot = claim.yes_stake + claim.no_stake;
        prop_assert!(paid <= pot);
        prop_assert!(pot - paid < winners.len() as u128);
    }

    #[test]
    fn distribute_matches_individual_payouts(
        stakes in prop::collection::vec(1u128..1_000_000, 1..20),
        losing in 0u128..10_000_000,
    ) {
        let d = distribute(&stakes, losing).unwrap();
        let total: u128 = stakes.iter().sum();
        let sum: u128 = stakes.iter().map(|s| payout(*s, total, losing).unwrap()).sum();
        prop_assert_eq!(d.paid, sum);
        prop_assert!(d.dust() < stakes.len() as u128);
        prop_assert_eq!(d.pot, total + losing);
    }
}
