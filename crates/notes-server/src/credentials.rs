//! Password hashing for protected notes
//!
//! Records are stored as `salt$hash`: a 20 character hex salt followed by the
//! hex encoded PBKDF2-HMAC-SHA512 output (10,000 rounds, 512 bytes).

use std::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::Sha512;
use subtle::ConstantTimeEq;

const ITERATIONS: u32 = 10_000;
const KEY_LEN: usize = 512;
const SALT_BYTES: usize = 16;
const SALT_LEN: usize = 20;
const SEPARATOR: char = '$';

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("malformed password hash record")]
    MalformedRecord,

    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A salted password hash as persisted in note metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: String,
    hash: String,
}

impl PasswordHash {
    /// Parse a stored `salt$hash` record.
    pub fn parse(record: &str) -> Result<Self, CredentialError> {
        let (salt, hash) = record
            .split_once(SEPARATOR)
            .ok_or(CredentialError::MalformedRecord)?;
        if salt.is_empty() || hash.is_empty() {
            return Err(CredentialError::MalformedRecord);
        }
        Ok(Self {
            salt: salt.to_string(),
            hash: hash.to_string(),
        })
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.salt, SEPARATOR, self.hash)
    }
}

// Keep hashes out of logs.
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash")
            .field("salt", &self.salt)
            .finish_non_exhaustive()
    }
}

fn derive_key(password: &str, salt: &str) -> String {
    let mut key = vec![0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), ITERATIONS, &mut key);
    hex::encode(key)
}

fn generate_salt() -> Result<String, CredentialError> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CredentialError::Entropy(e.to_string()))?;
    let mut salt = hex::encode(bytes);
    salt.truncate(SALT_LEN);
    Ok(salt)
}

/// Hash a password under a fresh random salt.
pub fn hash_password_blocking(password: &str) -> Result<PasswordHash, CredentialError> {
    let salt = generate_salt()?;
    let hash = derive_key(password, &salt);
    Ok(PasswordHash { salt, hash })
}

/// Check a password against a stored record in constant time.
pub fn verify_password_blocking(password: &str, stored: &PasswordHash) -> bool {
    let computed = derive_key(password, &stored.salt);
    computed.as_bytes().ct_eq(stored.hash.as_bytes()).into()
}

/// Async wrapper around [`hash_password_blocking`] that keeps the key
/// derivation off the runtime's worker threads.
pub async fn hash_password(password: String) -> Result<PasswordHash, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password)).await?
}

/// Async wrapper around [`verify_password_blocking`].
pub async fn verify_password(password: String, stored: PasswordHash) -> Result<bool, CredentialError> {
    let verified =
        tokio::task::spawn_blocking(move || verify_password_blocking(&password, &stored)).await?;
    Ok(verified)
}
