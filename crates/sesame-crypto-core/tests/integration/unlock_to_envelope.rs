//! Master password → session key → entry envelope, as the vault uses it.

use sesame_crypto_core::envelope::{open_encoded, seal};
use sesame_crypto_core::kdf::{derive, KdfParams, SESSION_KEY_BITS};
use sesame_crypto_core::CryptoError;

const SALT: &[u8; 16] = b"per-owner-salt!!";
const FAST_ARGON2: KdfParams = KdfParams::Argon2id {
    m_cost: 32,
    t_cost: 1,
    p_cost: 1,
};

#[test]
fn rederived_key_opens_stored_entry() {
    let key = derive(b"correct horse", SALT, &FAST_ARGON2, SESSION_KEY_BITS).unwrap();
    let stored = seal(b"s3cr3t", &key, b"alice/item-1").unwrap().encode();
    drop(key);

    let again = derive(b"correct horse", SALT, &FAST_ARGON2, SESSION_KEY_BITS).unwrap();
    let plain = open_encoded(&stored, &again, b"alice/item-1").unwrap();
    assert_eq!(plain.expose(), b"s3cr3t");
}

#[test]
fn wrong_master_password_fails_authentication() {
    let key = derive(b"correct horse", SALT, &FAST_ARGON2, SESSION_KEY_BITS).unwrap();
    let stored = seal(b"s3cr3t", &key, b"alice/item-1").unwrap().encode();

    let wrong = derive(b"correct h0rse", SALT, &FAST_ARGON2, SESSION_KEY_BITS).unwrap();
    let err = open_encoded(&stored, &wrong, b"alice/item-1").unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailure));
}

#[test]
fn legacy_profile_still_opens_its_entries() {
    let key = derive(b"pw", SALT, &KdfParams::LEGACY, SESSION_KEY_BITS).unwrap();
    let stored = seal(b"old", &key, b"bob/7").unwrap().encode();
    let again = derive(b"pw", SALT, &KdfParams::LEGACY, SESSION_KEY_BITS).unwrap();
    assert_eq!(open_encoded(&stored, &again, b"bob/7").unwrap().expose(), b"old");
}
