//! Cryptographically secure randomness.
//!
//! Every random byte in this crate (salts, nonces, password characters)
//! flows through a [`RandomSource`]. The production source is [`OsRandom`];
//! tests can substitute a source that fails to prove that entropy
//! exhaustion is surfaced instead of silently degraded.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;

/// Upper bound on rejection-sampling rounds in [`uniform_index`].
///
/// Each round rejects with probability < 1/2, so hitting this limit means
/// the source is returning degenerate output.
const MAX_REJECTION_ROUNDS: usize = 64;

/// A source of cryptographically secure random bytes.
///
/// Implementations must be safe to share between threads: callers may
/// generate passwords or seal envelopes concurrently.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InsufficientEntropy`] if the source is
    /// unavailable. Implementations must never fall back to a weaker
    /// generator.
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system CSPRNG (`getrandom` under the hood).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::InsufficientEntropy(format!("OS random source failed: {e}")))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &R {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        (**self).try_fill(dest)
    }
}

/// Return `N` random bytes.
///
/// # Errors
///
/// Propagates [`CryptoError::InsufficientEntropy`] from the source.
pub fn random_array<const N: usize, R: RandomSource + ?Sized>(
    rng: &R,
) -> Result<[u8; N], CryptoError> {
    let mut out = [0u8; N];
    rng.try_fill(&mut out)?;
    Ok(out)
}

/// Pick a uniformly distributed index in `0..bound`.
///
/// Uses rejection sampling over 32-bit draws so that no index is favoured
/// when `bound` does not divide 2^32.
///
/// # Errors
///
/// - [`CryptoError::InvalidInput`] if `bound` is 0 or exceeds `u32::MAX`.
/// - [`CryptoError::InsufficientEntropy`] if the source fails or keeps
///   producing values in the rejection zone.
#[allow(clippy::arithmetic_side_effects)]
pub fn uniform_index<R: RandomSource + ?Sized>(rng: &R, bound: usize) -> Result<usize, CryptoError> {
    if bound == 0 {
        return Err(CryptoError::InvalidInput(
            "cannot sample from an empty range".into(),
        ));
    }
    let bound = u64::from(
        u32::try_from(bound)
            .map_err(|_| CryptoError::InvalidInput(format!("range too large: {bound}")))?,
    );

    // Largest multiple of `bound` that fits in 2^32; draws at or above it
    // are rejected. `bound` is non-zero and <= 2^32 - 1, so no overflow.
    let space: u64 = 1 << 32;
    let limit = space - space % bound;

    for _ in 0..MAX_REJECTION_ROUNDS {
        let draw = u64::from(u32::from_le_bytes(random_array::<4, R>(rng)?));
        if draw < limit {
            // `draw % bound < bound <= u32::MAX`, always fits in usize on
            // supported targets.
            return usize::try_from(draw % bound).map_err(|_| {
                CryptoError::InvalidInput("sampled index does not fit in usize".into())
            });
        }
    }

    Err(CryptoError::InsufficientEntropy(
        "random source produced degenerate output".into(),
    ))
}
