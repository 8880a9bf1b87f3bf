//! RFC 9106 §5.4 Argon2id vector.
//!
//! The RFC vector uses a secret and associated data, which `derive` does
//! not take, so the vector is checked against the `argon2` crate and
//! `derive` is then checked against the same crate without them.

use sesame_crypto_core::kdf::{derive, KdfParams, SESSION_KEY_BITS};

#[test]
fn rfc9106_section_5_4_argon2id() {
    let password = [0x01u8; 32];
    let salt = [0x02u8; 16];
    let secret = [0x03u8; 8];
    let ad_bytes = [0x04u8; 12];

    let mut builder = argon2::ParamsBuilder::new();
    builder.m_cost(32);
    builder.t_cost(3);
    builder.p_cost(4);
    builder.output_len(32);
    builder.data(argon2::AssociatedData::new(&ad_bytes).unwrap());
    let params = builder.build().unwrap();

    let argon2 = argon2::Argon2::new_with_secret(
        &secret,
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    )
    .unwrap();

    let mut output = [0u8; 32];
    argon2.hash_password_into(&password, &salt, &mut output).unwrap();

    let expected: [u8; 32] = [
        0x0d, 0x64, 0x0d, 0xf5, 0x8d, 0x78, 0x76, 0x6c, 0x08, 0xc0, 0x37, 0xa3, 0x4a, 0x8b, 0x53,
        0xc9, 0xd0, 0x1e, 0xf0, 0x45, 0x2d, 0x75, 0xb6, 0x5e, 0xb5, 0x25, 0x20, 0xe9, 0x6b, 0x01,
        0xe6, 0x59,
    ];
    assert_eq!(output, expected);
}

#[test]
fn derive_matches_plain_argon2id() {
    let password = [0x01u8; 32];
    let salt = [0x02u8; 16];

    let params = argon2::Params::new(32, 3, 4, Some(32)).unwrap();
    let reference = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    let mut expected = [0u8; 32];
    reference.hash_password_into(&password, &salt, &mut expected).unwrap();

    let ours = derive(
        &password,
        &salt,
        &KdfParams::Argon2id {
            m_cost: 32,
            t_cost: 3,
            p_cost: 4,
        },
        SESSION_KEY_BITS,
    )
    .unwrap();
    assert_eq!(ours.expose(), &expected);
}
