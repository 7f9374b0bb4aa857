//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of the engine (clock, storage, price feed,
//! settlement) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod price;
pub mod settlement;
pub mod store;

pub use clock::NullClock;
pub use price::NullPriceProvider;
pub use settlement::{NullSettlement, SettlementCall};
pub use store::NullStore;
