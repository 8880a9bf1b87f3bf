//! PBKDF2-HMAC-SHA256 through `derive`.

use sesame_crypto_core::kdf::{derive, KdfParams};

/// P = "passwordPASSWORDpassword", S = "saltSALTsaltSALTsaltSALTsaltSALTsalt",
/// c = 4096, dkLen = 40. The salt is long enough for `derive`'s floor.
#[test]
fn pbkdf2_sha256_4096_iterations_40_bytes() {
    let key = derive(
        b"passwordPASSWORDpassword",
        b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
        &KdfParams::pbkdf2(4096),
        320,
    )
    .unwrap();

    let expected: [u8; 40] = [
        0x34, 0x8c, 0x89, 0xdb, 0xcb, 0xd3, 0x2b, 0x2f, 0x32, 0xd8, 0x14, 0xb8, 0x11, 0x6e, 0x84,
        0xcf, 0x2b, 0x17, 0x34, 0x7e, 0xbc, 0x18, 0x00, 0x18, 0x1c, 0x4e, 0x2a, 0x1f, 0xb8, 0xdd,
        0x53, 0xe1, 0xc6, 0x35, 0x51, 0x8c, 0x7d, 0xac, 0x47, 0xe9,
    ];
    assert_eq!(key.expose(), &expected);
}
