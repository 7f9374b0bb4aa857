//! Events emitted after an operation has committed.

use counterstake_types::{Address, Amount, ClaimNum, Outcome};

/// Claim lifecycle events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimEvent {
    /// A claim was registered and its value released.
    NewClaim {
        claim_num: ClaimNum,
        claimant: Address,
        amount: Amount,
        stake: Amount,
        is_large: bool,
    },
    /// A counterstake was accepted.
    Challenged {
        claim_num: ClaimNum,
        staker: Address,
        outcome: Outcome,
        accepted: Amount,
        flipped: bool,
        period_number: u32,
    },
    /// The claim was locked with its final outcome.
    Finished {
        claim_num: ClaimNum,
        outcome: Outcome,
    },
    /// A winner (or the recipient) was paid out.
    Withdrawn {
        claim_num: ClaimNum,
        beneficiary: Address,
        payout: Amount,
    },
    /// A forfeited stake was acknowledged by external bookkeeping.
    LossAcknowledged {
        claim_num: ClaimNum,
        staker: Address,
        forfeited: Amount,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread, after the store commit;
/// keep handlers fast to avoid stalling the sequencer.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&ClaimEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ClaimEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &ClaimEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn every_listener_sees_each_event() {
        let mut bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            bus.subscribe(Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }));
        }
        bus.emit(&ClaimEvent::Finished {
            claim_num: 1,
            outcome: Outcome::Yes,
        });
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(bus.listener_count(), 2);
    }
}
