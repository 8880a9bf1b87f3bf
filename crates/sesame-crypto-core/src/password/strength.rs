//! Heuristic password strength score.

use serde::{Deserialize, Serialize};

/// Strength tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLabel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLabel {
    /// Display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }

    /// Colour hint for the UI.
    #[must_use]
    pub const fn color(self) -> StrengthColor {
        match self {
            Self::Weak => StrengthColor::Red,
            Self::Fair => StrengthColor::Orange,
            Self::Good => StrengthColor::Yellow,
            Self::Strong => StrengthColor::Green,
        }
    }
}

/// UI colour tag paired with a [`StrengthLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthColor {
    Red,
    Orange,
    Yellow,
    Green,
}

/// Result of [`calculate_strength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthReport {
    /// Additive score, 0..=7.
    pub score: u8,
    /// Tier derived from `score`.
    pub label: StrengthLabel,
    /// Colour hint derived from `label`.
    pub color_tag: StrengthColor,
}

/// Score a password.
///
/// One point each for: at least 8, 12 and 16 characters; an ASCII
/// lowercase letter; an ASCII uppercase letter; an ASCII digit; any other
/// character. 0-2 is Weak, 3-4 Fair, 5-6 Good, 7 Strong.
#[must_use]
pub fn calculate_strength(password: &str) -> StrengthReport {
    let length = password.chars().count();

    let checks = [
        length >= 8,
        length >= 12,
        length >= 16,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().fold(0u8, |acc, &hit| acc.saturating_add(u8::from(hit)));

    let label = match score {
        0..=2 => StrengthLabel::Weak,
        3..=4 => StrengthLabel::Fair,
        5..=6 => StrengthLabel::Good,
        _ => StrengthLabel::Strong,
    };

    StrengthReport {
        score,
        label,
        color_tag: label.color(),
    }
}
