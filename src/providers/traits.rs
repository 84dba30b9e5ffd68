use async_trait::async_trait;

use crate::storage::StorageError;

/// The two documents the usage service serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// Services under the account
    Services,
    /// Traffic for one service
    Usage(&'a str),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Could not load credentials: {0}")]
    Credentials(#[from] StorageError),
    #[error("Could not build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("Connection failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Credentials rejected by {0}")]
    Unauthorized(String),
}

impl FetchError {
    /// Running `--setup` is the likely fix
    pub fn needs_setup(&self) -> bool {
        match self {
            FetchError::Credentials(e) => e.is_missing(),
            FetchError::Unauthorized(_) => true,
            _ => false,
        }
    }
}

#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Fetch the raw XML body for `request`
    async fn fetch(&self, request: Request<'_>) -> Result<String, FetchError>;
}
