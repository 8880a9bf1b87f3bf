//! seal → text/binary/JSON form → open, at realistic payload sizes.

use sesame_crypto_core::envelope::{open, open_encoded, seal, CipherEnvelope, KEY_LEN};
use sesame_crypto_core::DerivedKey;

fn int_key() -> DerivedKey {
    DerivedKey::from_bytes(&[0xDD; KEY_LEN])
}

#[test]
fn roundtrip_1kb_through_binary_form() {
    let plaintext = vec![0x42u8; 1024];
    let key = int_key();
    let wire = seal(&plaintext, &key, b"o/i").unwrap().to_bytes();
    let restored = CipherEnvelope::from_bytes(&wire).unwrap();
    assert_eq!(open(&restored, &key, b"o/i").unwrap().expose(), plaintext.as_slice());
}

#[test]
fn roundtrip_64kb_through_json() {
    let plaintext = vec![0x55u8; 65_536];
    let key = int_key();
    let env = seal(&plaintext, &key, &[]).unwrap();
    let json = serde_json::to_string(&env).unwrap();
    let back: CipherEnvelope = serde_json::from_str(&json).unwrap();
    assert_eq!(back, env);
    assert_eq!(open(&back, &key, &[]).unwrap().expose(), plaintext.as_slice());
}

#[test]
fn roundtrip_unicode_password_through_text_form() {
    let key = int_key();
    let text = seal("pässwörd ✓ 密码".as_bytes(), &key, b"alice/1").unwrap().encode();
    assert!(text.is_ascii());
    let plain = open_encoded(&text, &key, b"alice/1").unwrap();
    assert_eq!(plain.expose_str(), Some("pässwörd ✓ 密码"));
}

#[test]
fn same_plaintext_twice_gives_distinct_envelopes() {
    let key = int_key();
    let a = seal(b"same", &key, b"x").unwrap().encode();
    let b = seal(b"same", &key, b"x").unwrap().encode();
    assert_ne!(a, b);
}
