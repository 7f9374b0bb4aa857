//! Settlement executor that records instructions in the log.
//!
//! Moving value on either ledger happens outside this service; the daemon
//! emits every instruction as a structured event for downstream tooling.

use counterstake_engine::{Asset, NoticeKind, SettlementExecutor, SettlementNotice};
use counterstake_types::{Address, Amount};

#[derive(Clone, Copy, Debug, Default)]
pub struct LogSettlement;

impl SettlementExecutor for LogSettlement {
    fn release(&self, to: &Address, asset: Asset, amount: Amount) {
        tracing::info!(target: "settlement", to = %to, ?asset, amount, "release");
    }

    fn refund(&self, to: &Address, asset: Asset, amount: Amount) {
        tracing::info!(target: "settlement", to = %to, ?asset, amount, "refund");
    }

    fn notify(&self, notice: &SettlementNotice) {
        match notice.kind {
            NoticeKind::Claimed => tracing::info!(
                target: "settlement",
                claim_num = notice.claim_num,
                sender = %notice.sender_address,
                address = %notice.address,
                amount = notice.amount,
                "claimed"
            ),
            NoticeKind::Finished { outcome } => tracing::info!(
                target: "settlement",
                claim_num = notice.claim_num,
                sender = %notice.sender_address,
                address = %notice.address,
                amount = notice.amount,
                %outcome,
                "finished"
            ),
        }
    }
}
