//! AES-256-CBC obfuscated file storage for the ISP credentials
//!
//! The random key and IV are written into the same file as the ciphertext,
//! so anyone who can read the file can recover the plaintext. This keeps the
//! password out of casual view and nothing more.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const KEY_SIZE: usize = 32;
const IV_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum EncryptedStorageError {
    #[error("Encryption error")]
    Encryption,
    #[error("Decryption error")]
    Decryption,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, EncryptedStorageError>;

#[derive(Serialize, Deserialize)]
struct EncryptedBlob {
    key: String,        // Base64 encoded
    iv: String,         // Base64 encoded
    ciphertext: String, // Base64 encoded
}

/// Encrypt `plaintext` under a fresh key/IV and write the whole blob to `path`
pub fn encrypt_to_file(path: &Path, plaintext: &str) -> Result<()> {
    let mut key = [0u8; KEY_SIZE];
    let mut iv = [0u8; IV_SIZE];
    let mut rng = rand::rng();
    rng.fill_bytes(&mut key);
    rng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|_| EncryptedStorageError::Encryption)?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let blob = EncryptedBlob {
        key: BASE64.encode(key),
        iv: BASE64.encode(iv),
        ciphertext: BASE64.encode(ciphertext),
    };
    let encoded = BASE64.encode(serde_json::to_vec(&blob)?);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    write_private(path, encoded.as_bytes())?;
    Ok(())
}

/// Decrypt the blob at `path` back into the original plaintext
pub fn decrypt_from_file(path: &Path) -> Result<String> {
    let encoded = fs::read_to_string(path)?;
    let blob_json = BASE64.decode(encoded.trim())?;
    let blob: EncryptedBlob = serde_json::from_slice(&blob_json)?;

    let key = BASE64.decode(&blob.key)?;
    let iv = BASE64.decode(&blob.iv)?;
    let ciphertext = BASE64.decode(&blob.ciphertext)?;

    let plaintext = Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| EncryptedStorageError::Decryption)?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| EncryptedStorageError::Decryption)?;

    String::from_utf8(plaintext).map_err(|_| EncryptedStorageError::Decryption)
}

/// Check if encrypted file exists
pub fn exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies when the file is created
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}
