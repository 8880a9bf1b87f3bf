//! PBKDF2 calibration against the host.

use sesame_crypto_core::kdf::{
    calibrate_pbkdf2, derive, KdfParams, MAX_PBKDF2_ITERATIONS, RECOMMENDED_PBKDF2_ITERATIONS,
    SESSION_KEY_BITS,
};
use std::time::Duration;

#[test]
fn calibrated_params_are_within_bounds_and_valid() {
    let params = calibrate_pbkdf2(Duration::from_millis(50));
    let KdfParams::Pbkdf2Sha256 { iterations } = params else {
        panic!("calibration must yield PBKDF2 params");
    };
    assert!(iterations >= RECOMMENDED_PBKDF2_ITERATIONS);
    assert!(iterations <= MAX_PBKDF2_ITERATIONS);
    params.validate().unwrap();
}

#[test]
fn zero_target_still_recommended_strength() {
    let params = calibrate_pbkdf2(Duration::ZERO);
    assert_eq!(params, KdfParams::pbkdf2(RECOMMENDED_PBKDF2_ITERATIONS));
}

#[test]
fn calibrated_params_derive_a_session_key() {
    let params = calibrate_pbkdf2(Duration::from_millis(1));
    let key = derive(b"master", b"calibration-salt", &params, SESSION_KEY_BITS).unwrap();
    assert_eq!(key.len(), 32);
}
