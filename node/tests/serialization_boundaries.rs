//! Property tests for the two serialization boundaries of the node: claim
//! records stored with bincode, and journal entries read as JSON.

use proptest::prelude::*;

use counterstake_engine::{ChallengeRequest, CreateClaim};
use counterstake_node::{JournalEntry, Operation};
use counterstake_types::{Address, Claim, ClaimId, Outcome, Timestamp};

fn arb_address() -> impl Strategy<Value = Address> {
    "[a-z0-9_]{1,24}".prop_map(|s| Address::new(s))
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Yes), Just(Outcome::No)]
}

fn arb_claim() -> impl Strategy<Value = Claim> {
    (
        (1u64..u64::MAX, any::<[u8; 32]>(), any::<u128>(), any::<u128>()),
        (arb_address(), arb_address(), arb_address(), ".{0,40}", any::<u64>()),
        (arb_outcome(), any::<u32>(), any::<u128>(), any::<u128>(), any::<u128>()),
        (prop::collection::vec(1u64..10_000_000, 1..6), any::<u64>(), any::<u64>()),
        (any::<bool>(), any::<bool>(), any::<bool>()),
    )
        .prop_map(
            |(
                (claim_num, id, amount, reward),
                (sender, recipient, claimant, data, txts),
                (outcome, period_number, target, yes, no),
                (periods, created, expiry),
                (is_large, withdrawn, finished),
            )| Claim {
                claim_num,
                claim_id: ClaimId::new(id),
                amount,
                reward,
                sender_address: sender,
                recipient_address: recipient,
                claimant_address: claimant,
                txid: format!("tx-{claim_num}"),
                txts: Timestamp::new(txts),
                data,
                current_outcome: outcome,
                period_number,
                challenging_target: target,
                yes_stake: yes,
                no_stake: no,
                periods,
                created_ts: Timestamp::new(created),
                expiry_ts: Timestamp::new(expiry),
                is_large,
                withdrawn,
                finished,
            },
        )
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (arb_address(), arb_address(), "[a-f0-9]{8,64}", 0u64..u64::MAX / 2, 1u64..u64::MAX, any::<u64>())
            .prop_map(|(sender, recipient, txid, txts, amount, stake)| {
                Operation::Create(CreateClaim {
                    sender_address: sender,
                    claimant_address: recipient.clone(),
                    recipient_address: recipient,
                    txid,
                    txts: Timestamp::new(txts),
                    amount: amount as u128,
                    reward: 0,
                    data: String::new(),
                    stake: stake as u128,
                })
            }),
        (any::<u64>(), arb_address(), arb_outcome(), any::<u64>()).prop_map(
            |(claim_num, staker, outcome, stake)| Operation::Challenge(ChallengeRequest {
                claim_num,
                staker,
                outcome,
                stake: stake as u128,
            })
        ),
        any::<u64>().prop_map(|claim_num| Operation::Finalize { claim_num }),
        (any::<u64>(), arb_address())
            .prop_map(|(claim_num, beneficiary)| Operation::Withdraw { claim_num, beneficiary }),
        (any::<u64>(), arb_address())
            .prop_map(|(claim_num, staker)| Operation::AcknowledgeLoss { claim_num, staker }),
    ]
}

proptest! {
    #[test]
    fn stored_claims_decode_to_the_same_record(claim in arb_claim()) {
        let bytes = bincode::serialize(&claim).unwrap();
        let decoded: Claim = bincode::deserialize(&bytes).unwrap();
        prop_assert_eq!(decoded, claim);
    }

    #[test]
    fn journal_lines_read_back_identically(
        ts in prop::option::of(any::<u64>()),
        op in arb_operation(),
    ) {
        let entry = JournalEntry { ts: ts.map(Timestamp::new), op };
        let line = serde_json::to_string(&entry).unwrap();
        prop_assert!(!line.contains('\n'));
        let parsed = counterstake_node::parse_journal(&line).unwrap();
        prop_assert_eq!(parsed, vec![entry]);
    }
}
