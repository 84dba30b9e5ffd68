use crate::config::ConfigError;
use crate::providers::{FetchError, ParseError};
use crate::setup::SetupError;
use crate::storage::StorageError;

/// Anything that ends a run with exit status 1
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Could not write report: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    pub fn needs_setup(&self) -> bool {
        matches!(self, AppError::Fetch(e) if e.needs_setup())
    }
}
