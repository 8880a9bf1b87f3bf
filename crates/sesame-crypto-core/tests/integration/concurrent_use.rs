//! Shared key and OS CSPRNG used from many threads at once.

use std::collections::HashSet;
use std::thread;

use sesame_crypto_core::envelope::{open, seal, CipherEnvelope, KEY_LEN, NONCE_LEN, SALT_LEN};
use sesame_crypto_core::kdf::{derive, KdfParams};
use sesame_crypto_core::password::{generate, GeneratorConfig};
use sesame_crypto_core::DerivedKey;

const THREADS: usize = 8;
const ROUNDS: usize = 50;

#[test]
fn seal_open_and_generate_across_threads() {
    let key = DerivedKey::from_bytes(&[0x5A; KEY_LEN]);
    let config = GeneratorConfig::default();

    let results: Vec<Vec<([u8; SALT_LEN], [u8; NONCE_LEN])>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let key = &key;
                let config = &config;
                scope.spawn(move || {
                    let mut seen = Vec::with_capacity(ROUNDS);
                    for round in 0..ROUNDS {
                        let password = generate(config).unwrap();
                        assert_eq!(password.chars().count(), config.length);

                        let aad = format!("owner-{t}/item-{round}");
                        let env = seal(password.as_bytes(), key, aad.as_bytes()).unwrap();
                        let text = env.encode();
                        let back = CipherEnvelope::decode(&text).unwrap();
                        let plain = open(&back, key, aad.as_bytes()).unwrap();
                        assert_eq!(plain.expose(), password.as_bytes());

                        seen.push((env.salt, env.nonce));
                    }
                    seen
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut salts = HashSet::new();
    let mut nonces = HashSet::new();
    for (salt, nonce) in results.into_iter().flatten() {
        assert!(salts.insert(salt), "salt repeated across threads");
        assert!(nonces.insert(nonce), "nonce repeated across threads");
    }
    assert_eq!(salts.len(), THREADS * ROUNDS);
}

#[test]
fn derive_is_deterministic_across_threads() {
    let params = KdfParams::Argon2id {
        m_cost: 32,
        t_cost: 1,
        p_cost: 1,
    };
    let salt = [0x11u8; 16];

    let keys: Vec<Vec<u8>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    derive(b"correct horse", &salt, &params, 256)
                        .unwrap()
                        .expose()
                        .to_vec()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(keys.windows(2).all(|w| w[0] == w[1]));
}
