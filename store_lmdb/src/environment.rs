//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::migration::Migrator;
use crate::store::LmdbStore;
use crate::LmdbError;

/// Number of named databases the environment is opened with.
const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    /// claim_num (u64 BE) -> bincode(Claim)
    pub(crate) claims_db: Database<Bytes, Bytes>,
    /// claim_id (32 bytes) -> claim_num (u64 BE)
    pub(crate) claim_ids_db: Database<Bytes, Bytes>,
    /// claim_num (u64 BE) -> empty, present while the claim is not finished
    pub(crate) ongoing_db: Database<Bytes, Bytes>,
    /// claim_num ++ outcome byte ++ address -> amount (u128 BE)
    pub(crate) stakes_db: Database<Bytes, Bytes>,
    /// claim_num ++ address -> empty
    pub(crate) withdrawn_db: Database<Bytes, Bytes>,
    /// claim_num ++ address -> empty
    pub(crate) acknowledged_db: Database<Bytes, Bytes>,
    /// counters and schema version
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in `path`, creating the directory
    /// if needed, and bring its schema up to date.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and the data
        // directory is not shared with another writer.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let claims_db = env.create_database(&mut wtxn, Some("claims"))?;
        let claim_ids_db = env.create_database(&mut wtxn, Some("claim_ids"))?;
        let ongoing_db = env.create_database(&mut wtxn, Some("ongoing"))?;
        let stakes_db = env.create_database(&mut wtxn, Some("stakes"))?;
        let withdrawn_db = env.create_database(&mut wtxn, Some("withdrawn"))?;
        let acknowledged_db = env.create_database(&mut wtxn, Some("acknowledged"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            claims_db,
            claim_ids_db,
            ongoing_db,
            stakes_db,
            withdrawn_db,
            acknowledged_db,
            meta_db,
        };
        Migrator::run(&environment)?;

        tracing::info!(path = %path.display(), map_size, "LMDB environment opened");
        Ok(environment)
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    /// A store handle sharing this environment.
    pub fn store(&self) -> LmdbStore {
        LmdbStore {
            env: Arc::clone(&self.env),
            claims_db: self.claims_db,
            claim_ids_db: self.claim_ids_db,
            ongoing_db: self.ongoing_db,
            stakes_db: self.stakes_db,
            withdrawn_db: self.withdrawn_db,
            acknowledged_db: self.acknowledged_db,
            meta_db: self.meta_db,
        }
    }
}
