#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the password generator and strength score.

use proptest::prelude::*;
use sesame_crypto_core::password::{
    calculate_strength, generate, GeneratorConfig, StrengthLabel, MAX_PASSWORD_LENGTH,
    SIMILAR_CHARS,
};

fn config_strategy() -> impl Strategy<Value = GeneratorConfig> {
    (
        1usize..=MAX_PASSWORD_LENGTH,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(length, upper, lower, numbers, symbols, exclude)| GeneratorConfig {
            length,
            include_uppercase: upper,
            include_lowercase: lower,
            include_numbers: numbers,
            include_symbols: symbols,
            exclude_similar: exclude,
        })
}

proptest! {
    /// Output has exactly `length` characters, all from the effective set.
    #[test]
    fn length_and_charset_hold(config in config_strategy()) {
        let password = generate(&config).unwrap();
        let charset = config.effective_charset();
        prop_assert_eq!(password.chars().count(), config.length);
        prop_assert!(password.chars().all(|c| charset.contains(&c)));
    }

    /// Similar characters never appear when excluded and a class is enabled.
    #[test]
    fn exclusion_is_honoured(config in config_strategy()) {
        let any_class = config.include_uppercase
            || config.include_lowercase
            || config.include_numbers
            || config.include_symbols;
        prop_assume!(config.exclude_similar && any_class);
        let password = generate(&config).unwrap();
        prop_assert!(!password.chars().any(|c| SIMILAR_CHARS.contains(&c)));
    }

    /// Lengths outside 1..=128 are rejected.
    #[test]
    fn out_of_range_length_rejected(length in 129usize..10_000) {
        let config = GeneratorConfig { length, ..GeneratorConfig::default() };
        prop_assert!(generate(&config).is_err());
    }

    /// Score stays in 0..=7 and the label agrees with it.
    #[test]
    fn strength_score_bounded(password in ".{0,40}") {
        let report = calculate_strength(&password);
        prop_assert!(report.score <= 7);
        let expected = match report.score {
            0..=2 => StrengthLabel::Weak,
            3..=4 => StrengthLabel::Fair,
            5..=6 => StrengthLabel::Good,
            _ => StrengthLabel::Strong,
        };
        prop_assert_eq!(report.label, expected);
        prop_assert_eq!(report.color_tag, expected.color());
    }
}
