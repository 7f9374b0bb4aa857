//! LMDB storage backend for the counterstake engine.
//!
//! Implements the `counterstake-store` traits using the `heed` LMDB bindings.
//! All tables live in one environment, so a [`WriteBatch`] maps onto a single
//! LMDB write transaction and commits atomically.
//!
//! [`WriteBatch`]: counterstake_store::WriteBatch

pub mod environment;
pub mod error;
pub mod migration;
pub mod store;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use store::LmdbStore;
