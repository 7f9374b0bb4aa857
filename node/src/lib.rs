//! Counterstake node — runs the resolution engine as a single-writer service.
//!
//! The node:
//! - Loads its configuration from TOML
//! - Opens the LMDB store and builds the engine
//! - Serializes every operation through one sequencer task
//! - Replays operation journals deterministically

pub mod config;
pub mod error;
pub mod journal;
pub mod node;
pub mod sequencer;
pub mod settlement;

pub use config::{NodeConfig, PriceConfig};
pub use error::NodeError;
pub use journal::{parse_journal, JournalEntry, Operation, OperationResult};
pub use node::CounterstakeNode;
pub use sequencer::{Command, Sequencer, SequencerHandle};
pub use settlement::LogSettlement;
