use tally_config::ConfigError;
use tally_core::CoreError;
use thiserror::Error;

/// Error type surfaced by the [`crate::Tally`] facade.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TallyResult<T> = Result<T, TallyError>;
