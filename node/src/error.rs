use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] counterstake_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] counterstake_store_lmdb::LmdbError),

    #[error(transparent)]
    Engine(#[from] counterstake_engine::EngineError),

    #[error("journal line {line}: {message}")]
    Journal { line: usize, message: String },

    #[error("sequencer has shut down")]
    SequencerClosed,

    #[error("sequencer task failed: {0}")]
    SequencerTask(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
