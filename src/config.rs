//! Runtime settings, read once at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "isp-usage";
const CONFIG_FILE_NAME: &str = "config.json";
const CREDENTIALS_FILE_NAME: &str = "credentials";

const DEFAULT_BASE_URI: &str = "https://customer-webtools-api.internode.on.net/api/v1.5/";
const DEFAULT_SERVICE_PATH: &str = "api/services/service";
const DEFAULT_USAGE_PATH: &str = "api/traffic";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Endpoint and document layout of the ISP web service.
///
/// `service_path` and `usage_path` are slash separated element names,
/// starting below the document's root element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_uri: String,
    pub service_path: String,
    pub usage_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            service_path: DEFAULT_SERVICE_PATH.to_string(),
            usage_path: DEFAULT_USAGE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub credential_backend: CredentialBackend,
    /// Overrides `<config dir>/isp-usage/credentials`
    pub credentials_path: Option<PathBuf>,
    /// Request timeout; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
}

pub fn app_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

impl AppConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let path = app_config_dir()?.join(CONFIG_FILE_NAME);
                match Self::load_from_file(&path) {
                    Err(ConfigError::Io { source, .. })
                        if source.kind() == std::io::ErrorKind::NotFound =>
                    {
                        log::debug!("Config: {:?} not found, using defaults", path);
                        Ok(Self::default())
                    }
                    other => other,
                }
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Config: loaded {:?}", path);
        Ok(config)
    }

    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials_path {
            Some(path) => Ok(path.clone()),
            None => Ok(app_config_dir()?.join(CREDENTIALS_FILE_NAME)),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
