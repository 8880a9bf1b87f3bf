//! Vault error types for `sesame-vault`.

use sesame_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// No session key: the vault has not been unlocked, or was locked.
    #[error("vault is locked")]
    Locked,

    /// The session timed out from inactivity and the key was dropped.
    #[error("session expired")]
    Expired,

    /// `unlock` called on a session that is already unlocked.
    #[error("vault is already unlocked")]
    AlreadyUnlocked,

    /// Master password below the configured minimum length.
    #[error("master password must be at least {min} characters")]
    MasterPasswordTooShort {
        /// Minimum length in characters.
        min: usize,
    },

    /// Draft failed validation.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// No item with this id for this owner.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// The stored envelope could not be opened with the session key.
    ///
    /// Carries the item id. The cause (wrong master password, tampering,
    /// corruption) is deliberately not distinguished.
    #[error("cannot decrypt this item")]
    Undecryptable(String),

    /// `SQLite` error.
    #[error("database error: {0}")]
    Database(String),

    /// Migration error during schema upgrade.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}
