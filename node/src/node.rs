//! The counterstake node: opens storage, builds the engine, starts the
//! sequencer.

use std::sync::Arc;

use tokio::task::JoinHandle;

use counterstake_engine::{ResolutionEngine, SettlementExecutor};
use counterstake_store_lmdb::LmdbEnvironment;
use counterstake_types::Clock;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::sequencer::{Sequencer, SequencerHandle};

pub struct CounterstakeNode {
    handle: SequencerHandle,
    task: JoinHandle<ResolutionEngine>,
    // Keeps the LMDB environment open for as long as the node runs.
    _env: LmdbEnvironment,
}

impl CounterstakeNode {
    /// Open the LMDB environment at `config.data_dir` and start the sequencer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &NodeConfig,
        clock: Arc<dyn Clock>,
        settlement: Arc<dyn SettlementExecutor>,
    ) -> Result<Self, NodeError> {
        config.validate()?;

        let env = LmdbEnvironment::open(&config.data_dir, config.map_size)?;
        let engine = ResolutionEngine::new(
            Arc::new(env.store()),
            Arc::new(config.price.provider()),
            settlement,
            config.params.clone(),
        )?
        .with_asset_pair(config.price.asset_pair());

        let (handle, task) = Sequencer::new(engine, clock).spawn(config.command_buffer);
        tracing::info!(
            data_dir = %config.data_dir.display(),
            claimed = %config.price.claimed_asset,
            bonding = %config.price.bonding_asset,
            "counterstake node started"
        );
        Ok(Self {
            handle,
            task,
            _env: env,
        })
    }

    /// A client of the sequencer.
    pub fn handle(&self) -> SequencerHandle {
        self.handle.clone()
    }

    /// Stop accepting commands and wait for the queue to drain.
    ///
    /// Handles obtained from [`handle`](Self::handle) must be dropped first,
    /// otherwise this waits for them.
    pub async fn shutdown(self) -> Result<(), NodeError> {
        drop(self.handle);
        let engine = self.task.await?;
        tracing::info!(
            last_claim_num = engine.last_claim_num()?,
            "counterstake node stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterstake_engine::CreateClaim;
    use counterstake_nullables::{NullClock, NullSettlement};
    use counterstake_types::{Address, Timestamp};

    fn config(dir: &std::path::Path) -> NodeConfig {
        NodeConfig {
            data_dir: dir.to_path_buf(),
            map_size: 1 << 20,
            ..Default::default()
        }
    }

    fn request() -> CreateClaim {
        CreateClaim {
            sender_address: Address::new("sender"),
            recipient_address: Address::new("recipient"),
            claimant_address: Address::new("recipient"),
            txid: "tx".to_string(),
            txts: Timestamp::new(0),
            amount: 10,
            reward: 0,
            data: String::new(),
            stake: 10,
        }
    }

    #[tokio::test]
    async fn panicked_sequencer_task_is_reported_as_such() {
        let failed = tokio::spawn(async { panic!("sequencer crashed") })
            .await
            .unwrap_err();
        let err = NodeError::from(failed);
        assert!(matches!(err, NodeError::SequencerTask(_)));
        assert!(err.to_string().starts_with("sequencer task failed"));
    }

    #[tokio::test]
    async fn claims_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(NullClock::new(1_000));

        let node = CounterstakeNode::start(
            &config(dir.path()),
            clock.clone(),
            Arc::new(NullSettlement::new()),
        )
        .unwrap();
        node.handle().create(request(), None).await.unwrap();
        node.shutdown().await.unwrap();

        let node =
            CounterstakeNode::start(&config(dir.path()), clock, Arc::new(NullSettlement::new()))
                .unwrap();
        let handle = node.handle();
        let claim = handle.claim(1).await.unwrap();
        assert_eq!(claim.amount, 10);
        // The identity key is still taken.
        assert!(matches!(
            handle.create(request(), None).await,
            Err(NodeError::Engine(
                counterstake_engine::EngineError::DuplicateClaim
            ))
        ));
        drop(handle);
        node.shutdown().await.unwrap();
    }

    #[test]
    fn invalid_config_is_refused_before_opening_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(&dir.path().join("never-created"));
        cfg.price.den = 0;
        let result = CounterstakeNode::start(
            &cfg,
            Arc::new(NullClock::new(0)),
            Arc::new(NullSettlement::new()),
        );
        assert!(matches!(result, Err(NodeError::Config(_))));
        assert!(!dir.path().join("never-created").exists());
    }
}
