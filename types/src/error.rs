//! Errors raised while building or validating protocol parameters.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("invalid ratio '{0}'")]
    InvalidRatio(String),

    #[error("ratio denominator must be non-zero")]
    ZeroDenominator,

    #[error("ratio must be positive")]
    ZeroRatio,

    #[error("counterstake_coef must be greater than 1, got {0}")]
    CoefTooSmall(String),

    #[error("{name} must contain at least one period")]
    EmptyPeriods { name: &'static str },

    #[error("{name}[{index}] must be positive and not shorter than the previous period")]
    BadPeriod { name: &'static str, index: usize },

    #[error("large_challenging_periods[{0}] is shorter than challenging_periods[{0}]")]
    LargePeriodTooShort(usize),
}
