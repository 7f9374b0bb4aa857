//! Counterstake parameters — the governance-supplied parameter set.
//!
//! The engine reads one immutable snapshot per operation. Governance may swap
//! the snapshot between operations; already-open claims keep the periods
//! schedule they were created with.

use crate::amount::{Amount, Ratio};
use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// All parameters that shape claims, challenges and escalation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterstakeParams {
    /// Required stake per unit of claimed value, in bonding-asset terms.
    pub ratio: Ratio,

    /// Escalation factor applied to the challenging target on every flip.
    /// Must be greater than 1.
    pub counterstake_coef: Ratio,

    /// Absolute floor on the initial stake (bonding-asset raw units).
    #[serde(with = "crate::amount::serde_amount")]
    pub min_stake: Amount,

    /// Challenging periods in seconds, indexed by period number.
    pub challenging_periods: Vec<u64>,

    /// Challenging periods in seconds for large claims.
    pub large_challenging_periods: Vec<u64>,

    /// Claims whose value in bonding-asset units reaches this threshold are
    /// large. Zero disables large claims.
    #[serde(with = "crate::amount::serde_amount")]
    pub large_threshold: Amount,

    /// Minimum age (seconds) of the remote transfer before it can be claimed.
    pub min_tx_age: u64,
}

impl CounterstakeParams {
    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.ratio.is_zero() {
            return Err(ParamsError::ZeroRatio);
        }
        if !self.counterstake_coef.exceeds_one() {
            return Err(ParamsError::CoefTooSmall(self.counterstake_coef.to_string()));
        }
        validate_periods("challenging_periods", &self.challenging_periods)?;
        validate_periods("large_challenging_periods", &self.large_challenging_periods)?;
        for (i, (normal, large)) in self
            .challenging_periods
            .iter()
            .zip(&self.large_challenging_periods)
            .enumerate()
        {
            if large < normal {
                return Err(ParamsError::LargePeriodTooShort(i));
            }
        }
        Ok(())
    }

    /// Periods schedule for a new claim.
    pub fn periods_for(&self, is_large: bool) -> &[u64] {
        if is_large {
            &self.large_challenging_periods
        } else {
            &self.challenging_periods
        }
    }

    /// Whether a claim worth `value` bonding-asset units is large.
    pub fn is_large(&self, value: Amount) -> bool {
        self.large_threshold > 0 && value >= self.large_threshold
    }
}

fn validate_periods(name: &'static str, periods: &[u64]) -> Result<(), ParamsError> {
    if periods.is_empty() {
        return Err(ParamsError::EmptyPeriods { name });
    }
    let mut prev = 0;
    for (index, &p) in periods.iter().enumerate() {
        if p == 0 || p < prev {
            return Err(ParamsError::BadPeriod { name, index });
        }
        prev = p;
    }
    Ok(())
}

impl Default for CounterstakeParams {
    fn default() -> Self {
        Self {
            ratio: Ratio::ONE,
            counterstake_coef: Ratio::reduced(3, 2),
            min_stake: 0,
            challenging_periods: vec![3 * DAY, 7 * DAY, 30 * DAY, 60 * DAY],
            large_challenging_periods: vec![7 * DAY, 30 * DAY, 60 * DAY, 90 * DAY],
            large_threshold: 0,
            min_tx_age: 0,
        }
    }
}
