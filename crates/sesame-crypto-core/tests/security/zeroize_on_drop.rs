//! Verify that secret buffers do not leave recognizable bytes behind.
//!
//! After the buffer is zeroized and freed, the allocator may write its own
//! metadata into the block, so these tests scan for a sentinel pattern
//! rather than asserting all-zeros.
//!
//! Reading freed memory is undefined behavior. These are best-effort smoke
//! tests for the debug profile (default `cargo test`).

use sesame_crypto_core::envelope::{open, seal, KEY_LEN};
use sesame_crypto_core::memory::SecretBuffer;
use sesame_crypto_core::DerivedKey;

const SENTINEL: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

fn sentinel_bytes(len: usize) -> Vec<u8> {
    SENTINEL.iter().copied().cycle().take(len).collect()
}

fn sentinel_present(ptr: *const u8, len: usize) -> bool {
    // SAFETY: see module docs.
    unsafe {
        let slice = std::slice::from_raw_parts(ptr, len);
        slice.windows(4).any(|w| w == SENTINEL)
    }
}

#[test]
fn secret_buffer_sentinel_not_found_after_drop() {
    let data = sentinel_bytes(512);
    let (ptr, len) = {
        let buf = SecretBuffer::new(&data);
        let exposed = buf.expose();
        assert_eq!(&exposed[..4], &SENTINEL);
        (exposed.as_ptr(), exposed.len())
    };
    assert!(
        !sentinel_present(ptr, len),
        "sentinel found in memory after SecretBuffer drop"
    );
}

#[test]
fn large_secret_buffer_sentinel_cleared() {
    let data = sentinel_bytes(65_536);
    let (ptr, len) = {
        let buf = SecretBuffer::from_vec(data);
        let exposed = buf.expose();
        (exposed.as_ptr(), exposed.len())
    };
    assert!(!sentinel_present(ptr, len));
}

#[test]
fn derived_key_sentinel_cleared() {
    let material = sentinel_bytes(KEY_LEN);
    let (ptr, len) = {
        let key = DerivedKey::from_bytes(&material);
        (key.expose().as_ptr(), key.len())
    };
    assert!(!sentinel_present(ptr, len));
}

#[test]
fn opened_plaintext_sentinel_cleared() {
    let key = DerivedKey::from_bytes(&[0x11; KEY_LEN]);
    let env = seal(&sentinel_bytes(1024), &key, b"aad").unwrap();
    let (ptr, len) = {
        let plain = open(&env, &key, b"aad").unwrap();
        (plain.expose().as_ptr(), plain.len())
    };
    assert!(!sentinel_present(ptr, len));
}
