//! Cryptographic error types for `sesame-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
///
/// None of these variants carry secret material. `AuthenticationFailure`
/// deliberately carries nothing at all: callers cannot tell a wrong key
/// from a tampered envelope.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Caller-supplied input rejected (empty password, bad key length,
    /// short salt, out-of-range generator config, invalid KDF params).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Authentication tag verification failed: wrong key, tampered
    /// envelope, or envelope moved to a different entry.
    #[error("authentication failed: envelope could not be verified")]
    AuthenticationFailure,

    /// Stored envelope could not be parsed into its fields.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The OS random source failed. Fatal: there is no weaker fallback.
    #[error("insufficient entropy: {0}")]
    InsufficientEntropy(String),

    /// The AEAD primitive itself refused to operate.
    #[error("encryption error: {0}")]
    Encryption(String),
}

impl CryptoError {
    /// `true` for failures where the stored data cannot be turned back
    /// into plaintext (wrong key, corruption, tampering).
    #[must_use]
    pub const fn is_undecryptable(&self) -> bool {
        matches!(self, Self::AuthenticationFailure | Self::MalformedEnvelope(_))
    }
}
