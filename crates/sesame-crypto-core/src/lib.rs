//! `sesame-crypto-core`: cryptographic core of the Sesame credential vault.
//!
//! Key derivation, entry envelopes, password generation and secure memory.
//! Zero I/O, zero async, no logging: this crate is the audit target.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;
pub mod random;

pub mod kdf;

pub mod envelope;

pub mod password;

pub use envelope::{open, open_encoded, seal, seal_with, CipherEnvelope, ENVELOPE_VERSION};
pub use error::CryptoError;
pub use kdf::{
    calibrate_pbkdf2, derive, DerivedKey, KdfParams, LEGACY_PBKDF2_ITERATIONS,
    MAX_ARGON2_M_COST, MAX_ARGON2_P_COST, MAX_ARGON2_T_COST, MAX_PBKDF2_ITERATIONS,
    RECOMMENDED_PBKDF2_ITERATIONS, SESSION_KEY_BITS,
};
pub use memory::{disable_core_dumps, SecretBuffer};
pub use password::{
    calculate_strength, estimate_entropy_bits, generate, generate_with, GeneratorConfig,
    StrengthColor, StrengthLabel, StrengthReport, DEFAULT_PASSWORD_LENGTH,
};
pub use random::{uniform_index, OsRandom, RandomSource};
