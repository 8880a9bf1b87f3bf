//! Random password generation.
//!
//! [`generate`] builds a password from the union of the enabled character
//! classes, optionally minus confusable glyphs, drawing every character
//! independently from the CSPRNG. [`strength::calculate_strength`] scores
//! any password with a small additive heuristic.
//!
//! Characters are drawn with replacement and no class is forced in, so a
//! short password with many classes enabled may omit one of them.

pub mod strength;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::random::{uniform_index, OsRandom, RandomSource};

pub use strength::{calculate_strength, StrengthColor, StrengthLabel, StrengthReport};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Shortest password [`generate`] will produce.
pub const MIN_PASSWORD_LENGTH: usize = 1;

/// Longest password [`generate`] will produce.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Default generated length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Glyphs that are easy to misread: 0/O/o, 1/l/I, `|` and backtick.
pub const SIMILAR_CHARS: &[char] = &['0', 'O', 'o', '1', 'l', 'I', '|', '`'];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Generator options. Every flag is independent.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Number of characters to draw.
    pub length: usize,
    /// Include `A-Z`.
    pub include_uppercase: bool,
    /// Include `a-z`.
    pub include_lowercase: bool,
    /// Include `0-9`.
    pub include_numbers: bool,
    /// Include the symbol set.
    pub include_symbols: bool,
    /// Drop [`SIMILAR_CHARS`] from the candidate set.
    pub exclude_similar: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            exclude_similar: false,
        }
    }
}

impl GeneratorConfig {
    /// The characters [`generate`] will draw from.
    ///
    /// Union of the enabled classes, then similar-glyph removal. If nothing
    /// is left, falls back to lowercase + digits with no removal.
    #[must_use]
    pub fn effective_charset(&self) -> Vec<char> {
        let classes = [
            (self.include_uppercase, UPPERCASE),
            (self.include_lowercase, LOWERCASE),
            (self.include_numbers, DIGITS),
            (self.include_symbols, SYMBOLS),
        ];

        let mut charset: Vec<char> = classes
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, chars)| chars.chars())
            .collect();

        if self.exclude_similar {
            charset.retain(|c| !SIMILAR_CHARS.contains(c));
        }

        if charset.is_empty() {
            charset = LOWERCASE.chars().chain(DIGITS.chars()).collect();
        }
        charset
    }

    fn validate(&self) -> Result<(), CryptoError> {
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&self.length) {
            return Err(CryptoError::InvalidInput(format!(
                "length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {}",
                self.length
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate a password from `config` using the OS CSPRNG.
///
/// # Errors
///
/// See [`generate_with`].
pub fn generate(config: &GeneratorConfig) -> Result<String, CryptoError> {
    generate_with(&OsRandom, config)
}

/// Generate a password from `config` using `rng`.
///
/// # Errors
///
/// - [`CryptoError::InvalidInput`] if `config.length` is outside
///   [`MIN_PASSWORD_LENGTH`]..=[`MAX_PASSWORD_LENGTH`]
/// - [`CryptoError::InsufficientEntropy`] if `rng` fails
pub fn generate_with<R: RandomSource + ?Sized>(
    rng: &R,
    config: &GeneratorConfig,
) -> Result<String, CryptoError> {
    config.validate()?;
    let charset = config.effective_charset();

    let mut password = String::with_capacity(config.length);
    for _ in 0..config.length {
        let idx = uniform_index(rng, charset.len())?;
        if let Some(&c) = charset.get(idx) {
            password.push(c);
        }
    }
    Ok(password)
}

/// Entropy of a password generated from `config`, in bits:
/// `length * log2(|charset|)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_entropy_bits(config: &GeneratorConfig) -> f64 {
    let charset_len = config.effective_charset().len() as f64;
    config.length as f64 * charset_len.log2()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
