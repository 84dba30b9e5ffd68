//! Where the ISP login lives between runs.
//!
//! [`FileStore`] is the default: an AES-obfuscated file whose key sits in the
//! same file. [`KeyringStore`] hands the secret to the OS keychain instead.

pub mod encrypted;

use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use encrypted::EncryptedStorageError;

const KEYRING_SERVICE: &str = "isp-usage";
const KEYRING_ACCOUNT: &str = "credentials";

/// ISP login used for HTTP Basic auth
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Credential file error: {0}")]
    Encrypted(#[from] EncryptedStorageError),
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("Stored credentials are malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("No credentials stored in {0}")]
    NotConfigured(String),
}

impl StorageError {
    /// True when nothing has been stored yet, as opposed to a broken store
    pub fn is_missing(&self) -> bool {
        match self {
            StorageError::NotConfigured(_) => true,
            StorageError::Encrypted(EncryptedStorageError::Io(e)) => {
                e.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub trait CredentialStore: Send + Sync {
    /// Human readable location, used in prompts and log lines
    fn location(&self) -> String;

    fn exists(&self) -> Result<bool>;

    fn load(&self) -> Result<Credentials>;

    /// Replace whatever is stored with `credentials`
    fn save(&self, credentials: &Credentials) -> Result<()>;
}

/// Obfuscated credential file
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> Result<bool> {
        Ok(encrypted::exists(&self.path))
    }

    fn load(&self) -> Result<Credentials> {
        let json = encrypted::decrypt_from_file(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let json = serde_json::to_string(credentials)?;
        encrypted::encrypt_to_file(&self.path, &json)?;
        log::debug!("Wrote credentials to {}", self.path.display());
        Ok(())
    }
}

/// OS keychain entry: Keychain on macOS, Credential Manager on Windows,
/// Secret Service on Linux
pub struct KeyringStore {
    entry: Entry,
}

impl KeyringStore {
    pub fn new() -> Result<Self> {
        Ok(Self::from_entry(Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)?))
    }

    pub fn from_entry(entry: Entry) -> Self {
        Self { entry }
    }

    fn stored_json(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(json) => Ok(Some(json)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for KeyringStore {
    fn location(&self) -> String {
        format!("the OS keychain ({KEYRING_SERVICE}/{KEYRING_ACCOUNT})")
    }

    fn exists(&self) -> Result<bool> {
        Ok(self.stored_json()?.is_some())
    }

    fn load(&self) -> Result<Credentials> {
        let json = self
            .stored_json()?
            .ok_or_else(|| StorageError::NotConfigured(self.location()))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        self.entry.set_password(&serde_json::to_string(credentials)?)?;
        log::debug!("Wrote credentials to {}", self.location());
        Ok(())
    }
}
