#![allow(dead_code)]

use std::sync::Arc;

use counterstake_engine::{ChallengeRequest, CreateClaim, ResolutionEngine};
use counterstake_nullables::{NullPriceProvider, NullSettlement, NullStore};
use counterstake_types::{Address, Amount, CounterstakeParams, Outcome, Timestamp};

pub const HOUR: u64 = 3600;
pub const T0: u64 = 1_700_000_000;

pub struct Harness {
    pub engine: ResolutionEngine,
    pub store: Arc<NullStore>,
    pub price: Arc<NullPriceProvider>,
    pub settlement: Arc<NullSettlement>,
}

/// ratio 1.5, coef 1.5, periods 12h/72h/168h/720h, large claims disabled.
pub fn example_params() -> CounterstakeParams {
    CounterstakeParams {
        ratio: "1.5".parse().unwrap(),
        counterstake_coef: "1.5".parse().unwrap(),
        min_stake: 0,
        challenging_periods: vec![12 * HOUR, 72 * HOUR, 168 * HOUR, 720 * HOUR],
        large_challenging_periods: vec![72 * HOUR, 168 * HOUR, 720 * HOUR, 1440 * HOUR],
        large_threshold: 0,
        min_tx_age: 0,
    }
}

/// Price of 2/3 bonding unit per claimed unit, so that with ratio 1.5 a claim
/// of 10 requires a stake of exactly 10.
pub fn harness() -> Harness {
    harness_with(example_params(), NullPriceProvider::new(2, 3))
}

pub fn harness_with(params: CounterstakeParams, price: NullPriceProvider) -> Harness {
    let store = Arc::new(NullStore::new());
    let price = Arc::new(price);
    let settlement = Arc::new(NullSettlement::new());
    let engine = ResolutionEngine::new(
        store.clone(),
        price.clone(),
        settlement.clone(),
        params,
    )
    .unwrap();
    Harness {
        engine,
        store,
        price,
        settlement,
    }
}

pub fn addr(name: &str) -> Address {
    Address::new(name)
}

pub fn at(offset_secs: u64) -> Timestamp {
    Timestamp::new(T0 + offset_secs)
}

pub fn claim_request(txid: &str, amount: Amount, stake: Amount) -> CreateClaim {
    CreateClaim {
        sender_address: addr("origin-sender"),
        recipient_address: addr("recipient"),
        claimant_address: addr("recipient"),
        txid: txid.to_string(),
        txts: Timestamp::new(T0 - HOUR),
        amount,
        reward: 0,
        data: String::new(),
        stake,
    }
}

pub fn challenge(claim_num: u64, staker: &str, outcome: Outcome, stake: Amount) -> ChallengeRequest {
    ChallengeRequest {
        claim_num,
        staker: addr(staker),
        outcome,
        stake,
    }
}
