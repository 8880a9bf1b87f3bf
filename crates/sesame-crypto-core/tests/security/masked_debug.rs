//! Secrets never reach `Debug`/`Display` output.

use sesame_crypto_core::envelope::{open, seal, KEY_LEN};
use sesame_crypto_core::kdf::{derive, KdfParams, SESSION_KEY_BITS};
use sesame_crypto_core::memory::SecretBuffer;
use sesame_crypto_core::DerivedKey;

#[test]
fn derived_key_debug_is_masked() {
    let key = derive(b"hunter2hunter2", b"0123456789abcdef", &KdfParams::LEGACY, SESSION_KEY_BITS)
        .unwrap();
    let debug = format!("{key:?}");
    assert_eq!(debug, "DerivedKey(***)");
}

#[test]
fn opened_plaintext_debug_is_masked() {
    let key = DerivedKey::from_bytes(&[0x01; KEY_LEN]);
    let env = seal(b"my bank password", &key, b"").unwrap();
    let plain = open(&env, &key, b"").unwrap();
    let rendered = format!("{plain:?} {plain}");
    assert!(!rendered.contains("bank"));
    assert_eq!(rendered, "SecretBuffer(***) SecretBuffer(***)");
}

#[test]
fn envelope_debug_contains_no_plaintext() {
    let key = DerivedKey::from_bytes(&[0x02; KEY_LEN]);
    let env = seal(b"plaintext-marker", &key, b"").unwrap();
    assert!(!format!("{env:?}").contains("plaintext-marker"));
}

#[test]
fn secret_buffer_with_text_is_masked() {
    let buf = SecretBuffer::new(b"correct horse battery staple");
    assert!(!format!("{buf:?}").contains("horse"));
}
