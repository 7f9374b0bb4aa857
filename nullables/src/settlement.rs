//! Nullable settlement executor — records every instruction.

use counterstake_engine::{Asset, SettlementExecutor, SettlementNotice};
use counterstake_types::{Address, Amount};
use std::sync::Mutex;

/// One instruction received by [`NullSettlement`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettlementCall {
    Release {
        to: Address,
        asset: Asset,
        amount: Amount,
    },
    Refund {
        to: Address,
        asset: Asset,
        amount: Amount,
    },
    Notice(SettlementNotice),
}

/// Settlement executor that moves nothing and remembers everything.
#[derive(Default)]
pub struct NullSettlement {
    calls: Mutex<Vec<SettlementCall>>,
}

impl NullSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// All instructions in the order received.
    pub fn calls(&self) -> Vec<SettlementCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Total released to `to` in `asset`.
    pub fn released_to(&self, to: &Address, asset: Asset) -> Amount {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                SettlementCall::Release {
                    to: t,
                    asset: a,
                    amount,
                } if t == to && *a == asset => Some(*amount),
                _ => None,
            })
            .sum()
    }

    /// Total refunded to `to` in `asset`.
    pub fn refunded_to(&self, to: &Address, asset: Asset) -> Amount {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                SettlementCall::Refund {
                    to: t,
                    asset: a,
                    amount,
                } if t == to && *a == asset => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn notices(&self) -> Vec<SettlementNotice> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                SettlementCall::Notice(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl SettlementExecutor for NullSettlement {
    fn release(&self, to: &Address, asset: Asset, amount: Amount) {
        self.calls.lock().unwrap().push(SettlementCall::Release {
            to: to.clone(),
            asset,
            amount,
        });
    }

    fn refund(&self, to: &Address, asset: Asset, amount: Amount) {
        self.calls.lock().unwrap().push(SettlementCall::Refund {
            to: to.clone(),
            asset,
            amount,
        });
    }

    fn notify(&self, notice: &SettlementNotice) {
        self.calls
            .lock()
            .unwrap()
            .push(SettlementCall::Notice(notice.clone()));
    }
}
