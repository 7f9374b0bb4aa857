//! Nullable price provider — a settable quote.

use counterstake_engine::{AssetPair, Price, PriceError, PriceProvider};
use std::sync::Mutex;

/// A price provider whose quote is set by the test. `None` means unavailable.
pub struct NullPriceProvider {
    quote: Mutex<Option<Price>>,
}

impl NullPriceProvider {
    pub fn new(num: u128, den: u128) -> Self {
        Self {
            quote: Mutex::new(Some(Price::new(num, den))),
        }
    }

    /// One bonding unit per claimed unit.
    pub fn parity() -> Self {
        Self::new(1, 1)
    }

    pub fn unavailable() -> Self {
        Self {
            quote: Mutex::new(None),
        }
    }

    pub fn set(&self, num: u128, den: u128) {
        *self.quote.lock().unwrap() = Some(Price::new(num, den));
    }

    pub fn clear(&self) {
        *self.quote.lock().unwrap() = None;
    }
}

impl PriceProvider for NullPriceProvider {
    fn get_price(&self, pair: &AssetPair) -> Result<Price, PriceError> {
        self.quote
            .lock()
            .unwrap()
            .ok_or_else(|| PriceError::Unavailable {
                claimed: pair.claimed.clone(),
                bonding: pair.bonding.clone(),
            })
    }
}
