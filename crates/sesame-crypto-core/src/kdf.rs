//! Password-based key derivation.
//!
//! - [`derive`]: turn a master password + salt into a [`DerivedKey`]
//! - [`KdfParams`]: serializable algorithm + work factor (stored in the
//!   owner's key profile, never hardcoded at call sites)
//! - [`calibrate_pbkdf2`]: pick a PBKDF2 iteration count for a latency target
//!
//! # Work factor
//!
//! The default is Argon2id (64 MiB, 3 passes). PBKDF2-HMAC-SHA256 is kept
//! for hosts that cannot spare the memory; its iteration count is an
//! explicit input with a floor of [`LEGACY_PBKDF2_ITERATIONS`]. That floor
//! is the historical value this vault started with and is far below current
//! recommendations: use [`RECOMMENDED_PBKDF2_ITERATIONS`] or calibrate.

use std::fmt;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use ring::pbkdf2;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBuffer;

/// Session key length used by the vault (256 bits).
pub const SESSION_KEY_BITS: usize = 256;

/// Minimum salt length in bytes.
pub const MIN_SALT_LEN: usize = 16;

/// Largest key this module will produce, in bits.
pub const MAX_KEY_BITS: usize = 1024;

/// Historical PBKDF2 iteration count. Accepted as the floor, not secure.
pub const LEGACY_PBKDF2_ITERATIONS: u32 = 1_000;

/// PBKDF2-HMAC-SHA256 iteration count recommended for new profiles.
pub const RECOMMENDED_PBKDF2_ITERATIONS: u32 = 600_000;

/// Upper bound for PBKDF2 iteration counts, calibrated or configured.
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// Argon2 memory ceiling in KiB (1 GiB).
pub const MAX_ARGON2_M_COST: u32 = 1_048_576;

/// Argon2 pass ceiling.
pub const MAX_ARGON2_T_COST: u32 = 64;

/// Argon2 lane ceiling.
pub const MAX_ARGON2_P_COST: u32 = 16;

/// 64 MiB in KiB.
const MEMORY_64MB: u32 = 65_536;

/// Iterations used to time the host in [`calibrate_pbkdf2`].
const PROBE_ITERATIONS: u32 = 20_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// KDF algorithm and work factor.
///
/// Argon2 costs follow the `argon2` crate convention: `m_cost` in KiB,
/// `t_cost` passes, `p_cost` lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "camelCase")]
pub enum KdfParams {
    /// PBKDF2 with HMAC-SHA256.
    #[serde(rename_all = "camelCase")]
    Pbkdf2Sha256 {
        /// Iteration count (>= [`LEGACY_PBKDF2_ITERATIONS`]).
        iterations: u32,
    },
    /// Argon2id, version 0x13.
    #[serde(rename_all = "camelCase")]
    Argon2id {
        /// Memory cost in KiB.
        m_cost: u32,
        /// Number of passes.
        t_cost: u32,
        /// Degree of parallelism.
        p_cost: u32,
    },
}

impl KdfParams {
    /// The historical configuration: PBKDF2 with 1 000 iterations.
    ///
    /// Only useful for reading data produced by old deployments.
    pub const LEGACY: Self = Self::Pbkdf2Sha256 {
        iterations: LEGACY_PBKDF2_ITERATIONS,
    };

    /// PBKDF2-HMAC-SHA256 with the given iteration count.
    #[must_use]
    pub const fn pbkdf2(iterations: u32) -> Self {
        Self::Pbkdf2Sha256 { iterations }
    }

    /// Check the work factor without running the KDF.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidInput`] if PBKDF2 iterations fall
    /// outside `LEGACY_PBKDF2_ITERATIONS..=MAX_PBKDF2_ITERATIONS`, if an
    /// Argon2 cost exceeds its `MAX_ARGON2_*` ceiling, or if the `argon2`
    /// crate rejects the costs.
    pub fn validate(&self) -> Result<(), CryptoError> {
        match *self {
            Self::Pbkdf2Sha256 { iterations } => {
                if iterations < LEGACY_PBKDF2_ITERATIONS {
                    return Err(CryptoError::InvalidInput(format!(
                        "pbkdf2 iterations too low: {iterations} (minimum {LEGACY_PBKDF2_ITERATIONS})"
                    )));
                }
                if iterations > MAX_PBKDF2_ITERATIONS {
                    return Err(CryptoError::InvalidInput(format!(
                        "pbkdf2 iterations too high: {iterations} (maximum {MAX_PBKDF2_ITERATIONS})"
                    )));
                }
                Ok(())
            }
            Self::Argon2id {
                m_cost,
                t_cost,
                p_cost,
            } => {
                check_ceiling("argon2 memory cost", m_cost, MAX_ARGON2_M_COST)?;
                check_ceiling("argon2 time cost", t_cost, MAX_ARGON2_T_COST)?;
                check_ceiling("argon2 parallelism", p_cost, MAX_ARGON2_P_COST)?;
                self.argon2_params(SESSION_KEY_BITS / 8).map(|_| ())
            }
        }
    }

    fn argon2_params(&self, out_len: usize) -> Result<argon2::Params, CryptoError> {
        let Self::Argon2id {
            m_cost,
            t_cost,
            p_cost,
        } = *self
        else {
            return Err(CryptoError::InvalidInput("not an argon2id profile".into()));
        };
        argon2::Params::new(m_cost, t_cost, p_cost, Some(out_len))
            .map_err(|e| CryptoError::InvalidInput(format!("invalid argon2 params: {e}")))
    }
}

fn check_ceiling(what: &str, value: u32, max: u32) -> Result<(), CryptoError> {
    if value > max {
        return Err(CryptoError::InvalidInput(format!(
            "{what} too high: {value} (maximum {max})"
        )));
    }
    Ok(())
}

impl Default for KdfParams {
    /// Argon2id, 64 MiB, 3 passes, 1 lane: roughly 100-300 ms on laptops.
    fn default() -> Self {
        Self::Argon2id {
            m_cost: MEMORY_64MB,
            t_cost: 3,
            p_cost: 1,
        }
    }
}

/// Symmetric key produced by [`derive`]. Zeroized on drop.
pub struct DerivedKey(SecretBuffer);

impl DerivedKey {
    /// Wrap existing key bytes (tests, sub-key plumbing).
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(SecretBuffer::new(bytes))
    }

    /// Borrow the raw key bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.0.expose()
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for a zero-length key (never produced by [`derive`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key length in bits.
    #[must_use]
    pub fn len_bits(&self) -> usize {
        self.len().saturating_mul(8)
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(***)")
    }
}

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive a `key_len_bits`-bit key from `password` and `salt`.
///
/// Deterministic: identical inputs always produce identical keys, which is
/// what makes previously sealed envelopes readable again.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidInput`] if:
/// - `password` is empty
/// - `key_len_bits` is 0, not a multiple of 8, or above [`MAX_KEY_BITS`]
/// - `salt` is shorter than [`MIN_SALT_LEN`]
/// - `params` fails [`KdfParams::validate`]
pub fn derive(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
    key_len_bits: usize,
) -> Result<DerivedKey, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidInput("master password is empty".into()));
    }
    if key_len_bits == 0 || key_len_bits % 8 != 0 || key_len_bits > MAX_KEY_BITS {
        return Err(CryptoError::InvalidInput(format!(
            "key length must be a non-zero multiple of 8 bits up to {MAX_KEY_BITS}, got {key_len_bits}"
        )));
    }
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::InvalidInput(format!(
            "salt too short: {} bytes (minimum {MIN_SALT_LEN})",
            salt.len()
        )));
    }
    params.validate()?;

    let out_len = key_len_bits / 8;
    let mut output = vec![0u8; out_len];

    match *params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            let iterations = NonZeroU32::new(iterations)
                .ok_or_else(|| CryptoError::InvalidInput("pbkdf2 iterations are zero".into()))?;
            pbkdf2::derive(
                pbkdf2::PBKDF2_HMAC_SHA256,
                iterations,
                salt,
                password,
                &mut output,
            );
        }
        KdfParams::Argon2id { .. } => {
            let argon2 = argon2::Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                params.argon2_params(out_len)?,
            );
            if let Err(e) = argon2.hash_password_into(password, salt, &mut output) {
                output.zeroize();
                return Err(CryptoError::InvalidInput(format!(
                    "argon2id derivation failed: {e}"
                )));
            }
        }
    }

    Ok(DerivedKey(SecretBuffer::from_vec(output)))
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

/// Choose a PBKDF2 iteration count that takes roughly `target` on this host.
///
/// Times a short probe run and scales linearly. The result is clamped to
/// [`RECOMMENDED_PBKDF2_ITERATIONS`]..=[`MAX_PBKDF2_ITERATIONS`], so a fast
/// target never drops below the recommended strength.
#[must_use]
pub fn calibrate_pbkdf2(target: Duration) -> KdfParams {
    let mut probe = [0u8; 32];
    let start = Instant::now();
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(PROBE_ITERATIONS).unwrap_or(NonZeroU32::MIN),
        b"sesame-calibration-salt",
        b"sesame-calibration-probe",
        &mut probe,
    );
    let elapsed = start.elapsed();
    probe.zeroize();

    KdfParams::pbkdf2(scale_iterations(PROBE_ITERATIONS, elapsed, target))
}

/// `probe_iterations * target / elapsed`, clamped.
fn scale_iterations(probe_iterations: u32, elapsed: Duration, target: Duration) -> u32 {
    let elapsed_ns = elapsed.as_nanos().max(1);
    let scaled = u128::from(probe_iterations)
        .saturating_mul(target.as_nanos())
        .checked_div(elapsed_ns)
        .unwrap_or(u128::MAX);
    let clamped = scaled.clamp(
        u128::from(RECOMMENDED_PBKDF2_ITERATIONS),
        u128::from(MAX_PBKDF2_ITERATIONS),
    );
    u32::try_from(clamped).unwrap_or(MAX_PBKDF2_ITERATIONS)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
