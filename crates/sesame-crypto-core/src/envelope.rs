//! Authenticated encryption of vault entries.
//!
//! - [`seal`]: encrypt a secret under the session key into a [`CipherEnvelope`]
//! - [`open`]: verify and decrypt an envelope into a [`SecretBuffer`]
//! - [`CipherEnvelope::encode`] / [`CipherEnvelope::decode`]: text form
//!   for storage as an opaque string
//!
//! # Construction
//!
//! Every seal draws a fresh 16-byte salt and 12-byte nonce. The salt feeds
//! HKDF-SHA256 over the session key to get a per-envelope AES-256-GCM
//! sub-key, so the session key itself never touches a ciphertext and a
//! nonce collision across envelopes is harmless. The caller's associated
//! data (owner and item id) is authenticated together with the format
//! version, which pins an envelope to the entry it was written for.
//!
//! Binary layout: `version (1) || salt (16) || nonce (12) || tag (16) || ciphertext`.

use data_encoding::BASE64;
use ring::{aead, hkdf};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::kdf::DerivedKey;
use crate::memory::SecretBuffer;
use crate::random::{random_array, OsRandom, RandomSource};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Per-envelope HKDF salt length in bytes.
pub const SALT_LEN: usize = 16;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Required session key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Header length: version + salt + nonce + tag.
const HEADER_LEN: usize = 1 + SALT_LEN + NONCE_LEN + TAG_LEN;

/// HKDF `info` label binding sub-keys to this construction.
const SUBKEY_INFO: &[u8] = b"sesame/entry-subkey/v1";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Self-describing sealed secret: everything needed to decrypt except the key.
///
/// Not secret on its own; this is the only form of a password that reaches
/// persistence.
#[must_use = "a sealed envelope must be stored"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherEnvelope {
    /// Format version ([`ENVELOPE_VERSION`]).
    pub version: u8,
    /// Random HKDF salt for this envelope's sub-key.
    pub salt: [u8; SALT_LEN],
    /// Random AES-GCM nonce.
    pub nonce: [u8; NONCE_LEN],
    /// AES-GCM authentication tag.
    pub tag: [u8; TAG_LEN],
    /// Encrypted payload, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl CipherEnvelope {
    /// Binary form: `version || salt || nonce || tag || ciphertext`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN.saturating_add(self.ciphertext.len()));
        out.push(self.version);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the binary form.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] if the input is shorter
    /// than the fixed header or carries an unknown version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let Some((&version, rest)) = bytes.split_first() else {
            return Err(CryptoError::MalformedEnvelope("empty envelope".into()));
        };
        if version != ENVELOPE_VERSION {
            return Err(CryptoError::MalformedEnvelope(format!(
                "unsupported envelope version {version}"
            )));
        }
        if bytes.len() < HEADER_LEN {
            return Err(CryptoError::MalformedEnvelope(format!(
                "envelope too short: {} bytes (minimum {HEADER_LEN})",
                bytes.len()
            )));
        }

        let (salt, rest) = rest.split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        Ok(Self {
            version,
            salt: fixed(salt)?,
            nonce: fixed(nonce)?,
            tag: fixed(tag)?,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Text form for opaque string storage (standard padded base64 of
    /// [`to_bytes`](Self::to_bytes)).
    #[must_use]
    pub fn encode(&self) -> String {
        BASE64.encode(&self.to_bytes())
    }

    /// Parse the text form produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] on invalid base64 or an
    /// invalid binary layout.
    pub fn decode(text: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(text.as_bytes())
            .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

fn fixed<const N: usize>(slice: &[u8]) -> Result<[u8; N], CryptoError> {
    <[u8; N]>::try_from(slice).map_err(|_| {
        CryptoError::MalformedEnvelope(format!("expected {N} bytes, got {}", slice.len()))
    })
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` under `key`, binding `aad`, with the OS CSPRNG.
///
/// # Errors
///
/// See [`seal_with`].
pub fn seal(plaintext: &[u8], key: &DerivedKey, aad: &[u8]) -> Result<CipherEnvelope, CryptoError> {
    seal_with(&OsRandom, plaintext, key, aad)
}

/// Encrypt `plaintext` under `key`, binding `aad`, drawing salt and nonce
/// from `rng`.
///
/// # Errors
///
/// - [`CryptoError::InvalidInput`] if `key` is not [`KEY_LEN`] bytes
/// - [`CryptoError::InsufficientEntropy`] if `rng` fails
/// - [`CryptoError::Encryption`] if the AEAD primitive fails
pub fn seal_with<R: RandomSource + ?Sized>(
    rng: &R,
    plaintext: &[u8],
    key: &DerivedKey,
    aad: &[u8],
) -> Result<CipherEnvelope, CryptoError> {
    check_key(key)?;

    let salt: [u8; SALT_LEN] = random_array(rng)?;
    let nonce_bytes: [u8; NONCE_LEN] = random_array(rng)?;

    let sealing_key = subkey(key, &salt)?;
    let full_aad = bound_aad(ENVELOPE_VERSION, aad);

    let mut in_out = plaintext.to_vec();
    let Ok(tag) = sealing_key.seal_in_place_separate_tag(
        aead::Nonce::assume_unique_for_key(nonce_bytes),
        aead::Aad::from(full_aad.as_slice()),
        &mut in_out,
    ) else {
        in_out.zeroize();
        return Err(CryptoError::Encryption("AES-256-GCM seal failed".into()));
    };

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(CipherEnvelope {
        version: ENVELOPE_VERSION,
        salt,
        nonce: nonce_bytes,
        tag: tag_bytes,
        ciphertext: in_out,
    })
}

/// Verify and decrypt `envelope` under `key` with the same `aad` used to seal.
///
/// Fails closed: on any verification failure the working buffer is
/// zeroized and no plaintext is returned.
///
/// # Errors
///
/// - [`CryptoError::InvalidInput`] if `key` is not [`KEY_LEN`] bytes
/// - [`CryptoError::MalformedEnvelope`] if the version is unknown
/// - [`CryptoError::AuthenticationFailure`] on wrong key, wrong `aad`, or
///   any tampering with salt, nonce, tag or ciphertext
pub fn open(
    envelope: &CipherEnvelope,
    key: &DerivedKey,
    aad: &[u8],
) -> Result<SecretBuffer, CryptoError> {
    check_key(key)?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(CryptoError::MalformedEnvelope(format!(
            "unsupported envelope version {}",
            envelope.version
        )));
    }

    let opening_key = subkey(key, &envelope.salt)?;
    let full_aad = bound_aad(envelope.version, aad);

    let mut ct_tag = Vec::with_capacity(envelope.ciphertext.len().saturating_add(TAG_LEN));
    ct_tag.extend_from_slice(&envelope.ciphertext);
    ct_tag.extend_from_slice(&envelope.tag);

    let opened = opening_key.open_in_place(
        aead::Nonce::assume_unique_for_key(envelope.nonce),
        aead::Aad::from(full_aad.as_slice()),
        &mut ct_tag,
    );
    let result = match opened {
        Ok(plaintext) => Ok(SecretBuffer::new(plaintext)),
        Err(_) => Err(CryptoError::AuthenticationFailure),
    };
    ct_tag.zeroize();
    result
}

/// Decode the text form and [`open`] it.
///
/// # Errors
///
/// Same as [`CipherEnvelope::decode`] and [`open`].
pub fn open_encoded(text: &str, key: &DerivedKey, aad: &[u8]) -> Result<SecretBuffer, CryptoError> {
    open(&CipherEnvelope::decode(text)?, key, aad)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn check_key(key: &DerivedKey) -> Result<(), CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidInput(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    Ok(())
}

/// HKDF-SHA256(ikm = session key, salt = envelope salt) -> AES-256-GCM key.
fn subkey(key: &DerivedKey, salt: &[u8; SALT_LEN]) -> Result<aead::LessSafeKey, CryptoError> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, salt).extract(key.expose());
    let okm = prk
        .expand(&[SUBKEY_INFO], &aead::AES_256_GCM)
        .map_err(|_| CryptoError::Encryption("HKDF expand failed".into()))?;
    Ok(aead::LessSafeKey::new(aead::UnboundKey::from(okm)))
}

fn bound_aad(version: u8, aad: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(aad.len().saturating_add(1));
    full.push(version);
    full.extend_from_slice(aad);
    full
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
