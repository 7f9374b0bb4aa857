//! Price Provider seam and minimum-stake computation.
//!
//! The engine never waits on a price: the provider must answer synchronously
//! with an already-resolved quote or an error.

use counterstake_types::{Amount, CounterstakeParams, Ratio};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The claimed asset and the asset stakes are bonded in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPair {
    pub claimed: String,
    pub bonding: String,
}

impl Default for AssetPair {
    fn default() -> Self {
        Self {
            claimed: "claimed".to_string(),
            bonding: "bonding".to_string(),
        }
    }
}

/// Bonding-asset units per claimed-asset unit, as `num / den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub num: u128,
    pub den: u128,
}

impl Price {
    pub fn new(num: u128, den: u128) -> Self {
        Self { num, den }
    }

    fn as_ratio(&self) -> Result<Ratio, PriceError> {
        Ratio::new(self.num, self.den).map_err(|_| PriceError::ZeroDenominator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("no price for {claimed}/{bonding}")]
    Unavailable { claimed: String, bonding: String },

    #[error("price is stale: {0}")]
    Stale(String),

    #[error("price has a zero denominator")]
    ZeroDenominator,

    #[error("price conversion overflowed")]
    Overflow,
}

/// Converts claimed amounts into bonding-asset terms.
pub trait PriceProvider: Send + Sync {
    fn get_price(&self, pair: &AssetPair) -> Result<Price, PriceError>;
}

/// A provider that always quotes the same price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedPrice(pub Price);

impl FixedPrice {
    /// One bonding unit per claimed unit.
    pub fn parity() -> Self {
        Self(Price::new(1, 1))
    }
}

impl PriceProvider for FixedPrice {
    fn get_price(&self, _pair: &AssetPair) -> Result<Price, PriceError> {
        Ok(self.0)
    }
}

/// Value of `amount` claimed units in bonding units, rounded down.
pub fn bonding_value(price: Price, amount: Amount) -> Result<Amount, PriceError> {
    price
        .as_ratio()?
        .floor_mul(amount)
        .ok_or(PriceError::Overflow)
}

/// `max(min_stake, ceil(amount × price × ratio))`, rounded once.
pub fn required_stake(
    params: &CounterstakeParams,
    price: Price,
    amount: Amount,
) -> Result<Amount, PriceError> {
    let factor = price
        .as_ratio()?
        .checked_mul(params.ratio)
        .ok_or(PriceError::Overflow)?;
    let stake = factor.ceil_mul(amount).ok_or(PriceError::Overflow)?;
    Ok(stake.max(params.min_stake))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(ratio: &str, min_stake: Amount) -> CounterstakeParams {
        CounterstakeParams {
            ratio: ratio.parse().unwrap(),
            min_stake,
            ..Default::default()
        }
    }

    #[test]
    fn required_stake_rounds_up_once() {
        // 10 × 1/3 × 1.5 = 5 exactly; rounding each factor separately would give 6.
        let p = params("1.5", 0);
        assert_eq!(required_stake(&p, Price::new(1, 3), 10), Ok(5));
        assert_eq!(required_stake(&p, Price::new(1, 3), 11), Ok(6));
    }

    #[test]
    fn min_stake_is_a_floor() {
        let p = params("1", 100);
        assert_eq!(required_stake(&p, Price::new(1, 1), 10), Ok(100));
        assert_eq!(required_stake(&p, Price::new(1, 1), 1000), Ok(1000));
    }

    #[test]
    fn zero_denominator_is_rejected() {
        let p = params("1", 0);
        assert_eq!(
            required_stake(&p, Price::new(1, 0), 10),
            Err(PriceError::ZeroDenominator)
        );
        assert_eq!(bonding_value(Price::new(1, 0), 10), Err(PriceError::ZeroDenominator));
    }

    #[test]
    fn bonding_value_rounds_down() {
        assert_eq!(bonding_value(Price::new(2, 3), 10), Ok(6));
    }
}
