//! Amounts and exact fixed-point ratios.
//!
//! Amounts are raw integer units (`u128`) of whichever asset they refer to.
//! Ratios are kept as reduced `num / den` pairs so that every multiplication is
//! exact and rounding happens in exactly one place, chosen by the caller.

use crate::error::ParamsError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Raw units of an asset.
pub type Amount = u128;

/// Largest number of fractional digits accepted when parsing a decimal ratio.
const MAX_DECIMALS: u32 = 18;

/// An exact, non-negative rational number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ratio {
    num: u128,
    den: u128,
}

impl Ratio {
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Build a ratio, reduced to lowest terms.
    pub fn new(num: u128, den: u128) -> Result<Self, ParamsError> {
        if den == 0 {
            return Err(ParamsError::ZeroDenominator);
        }
        let g = gcd(num, den);
        Ok(Self {
            num: num / g,
            den: den / g,
        })
    }

    /// Caller guarantees `den != 0` and that the pair is already reduced.
    pub(crate) const fn reduced(num: u128, den: u128) -> Self {
        Self { num, den }
    }

    pub fn whole(n: u128) -> Self {
        Self { num: n, den: 1 }
    }

    pub fn num(&self) -> u128 {
        self.num
    }

    pub fn den(&self) -> u128 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Strictly greater than one.
    pub fn exceeds_one(&self) -> bool {
        self.num > self.den
    }

    /// `ceil(x * self)`, or `None` on overflow.
    pub fn ceil_mul(&self, x: u128) -> Option<u128> {
        Some(x.checked_mul(self.num)?.div_ceil(self.den))
    }

    /// `floor(x * self)`, or `None` on overflow.
    pub fn floor_mul(&self, x: u128) -> Option<u128> {
        Some(x.checked_mul(self.num)? / self.den)
    }

    /// Exact product of two ratios, or `None` on overflow.
    pub fn checked_mul(&self, other: Ratio) -> Option<Ratio> {
        // Cross-reduce first to keep intermediates small.
        let g1 = gcd(self.num, other.den);
        let g2 = gcd(other.num, self.den);
        let num = (self.num / g1).checked_mul(other.num / g2)?;
        let den = (self.den / g2).checked_mul(other.den / g1)?;
        Ratio::new(num, den).ok()
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    if a == 0 {
        1
    } else {
        a
    }
}

impl FromStr for Ratio {
    type Err = ParamsError;

    /// Accepts `"2"`, `"1.5"`, `"0.025"` and `"3/2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParamsError::InvalidRatio(s.to_string());
        let s = s.trim();

        if let Some((n, d)) = s.split_once('/') {
            let num = n.trim().parse::<u128>().map_err(|_| invalid())?;
            let den = d.trim().parse::<u128>().map_err(|_| invalid())?;
            return Ratio::new(num, den);
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }
        let decimals = frac_part.len() as u32;
        if decimals > MAX_DECIMALS {
            return Err(invalid());
        }

        let scale = 10u128.pow(decimals);
        let int_value = if int_part.is_empty() {
            0
        } else {
            int_part.parse::<u128>().map_err(|_| invalid())?
        };
        let frac_value = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse::<u128>().map_err(|_| invalid())?
        };
        let num = int_value
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(invalid)?;
        Ratio::new(num, scale)
    }
}

impl fmt::Display for Ratio {
    /// Renders as a decimal when the denominator divides a power of ten,
    /// otherwise as `num/den`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            return write!(f, "{}", self.num);
        }
        for decimals in 1..=MAX_DECIMALS {
            let scale = 10u128.pow(decimals);
            if scale % self.den == 0 {
                if let Some(scaled) = self.num.checked_mul(scale / self.den) {
                    return write!(
                        f,
                        "{}.{:0width$}",
                        scaled / scale,
                        scaled % scale,
                        width = decimals as usize
                    );
                }
                break;
            }
        }
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Floats are deliberately not accepted: "1.5" must be written as a string.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Whole(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Whole(n) => Ok(Ratio::whole(n as u128)),
        }
    }
}

/// Serde codec for [`Amount`] fields in human-edited formats.
///
/// TOML has no 128-bit integers, so amounts that fit in a `u64` are written as
/// plain integers and larger ones as decimal strings. Both forms are accepted
/// on input.
pub mod serde_amount {
    use super::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(*amount) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.serialize_str(&amount.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Small(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Small(n) => Ok(n as Amount),
            Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}
