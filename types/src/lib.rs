//! Fundamental types for the counterstake protocol.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, claim identity keys, exact ratios, timestamps, outcomes, the claim
//! record, and the governance-supplied parameter set.

pub mod address;
pub mod amount;
pub mod claim;
pub mod error;
pub mod hash;
pub mod outcome;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::{Amount, Ratio};
pub use claim::{Claim, ClaimNum};
pub use error::ParamsError;
pub use hash::ClaimId;
pub use outcome::Outcome;
pub use params::CounterstakeParams;
pub use time::{Clock, SystemClock, Timestamp};
