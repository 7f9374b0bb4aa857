//! Abstract storage traits for the counterstake engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engine depends only on the traits.
//!
//! Reads go through [`ClaimStore`] and [`StakeStore`]. Writes are never issued
//! one by one: the engine stages every mutation of an operation in a
//! [`WriteBatch`] and hands it to [`CounterstakeStore::commit`], which must
//! apply all of it or none of it.

pub mod batch;
pub mod claim;
pub mod error;
pub mod stake;

pub use batch::{WriteBatch, WriteOp};
pub use claim::ClaimStore;
pub use error::StoreError;
pub use stake::{StakeEntry, StakeStore};

/// A complete backend: readable claims and stakes plus atomic batch commit.
pub trait CounterstakeStore: ClaimStore + StakeStore + Send + Sync {
    /// Apply every operation in `batch` atomically.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
