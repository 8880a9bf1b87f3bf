//! Secure memory types for keys and decrypted secrets.
//!
//! - Zero memory on drop via [`zeroize`]
//! - Best-effort `mlock` so secrets are not swapped to disk
//! - Masked `Debug`/`Display` so secrets never end up in logs
//! - [`disable_core_dumps`] for hosts that want it

use crate::error::CryptoError;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;

// ---------------------------------------------------------------------------
// Memory locking
// ---------------------------------------------------------------------------

/// RAII guard that `munlock`s a region on drop.
pub struct LockedRegion {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

// SAFETY: the pointer is only handed to mlock/munlock, which are
// thread-safe. The bytes themselves are owned and accessed through the
// enclosing SecretBuffer.
unsafe impl Send for LockedRegion {}
unsafe impl Sync for LockedRegion {}

impl LockedRegion {
    /// Try to lock `len` bytes at `ptr`.
    ///
    /// A failed `mlock` (e.g. `RLIMIT_MEMLOCK` exhausted) is not an error:
    /// the region simply stays unlocked and a warning is printed once.
    #[must_use]
    pub(crate) fn try_lock(ptr: *const u8, len: usize) -> Self {
        let locked = platform::try_mlock(ptr, len);
        if !locked && len > 0 {
            static WARNED: std::sync::Once = std::sync::Once::new();
            WARNED.call_once(|| {
                eprintln!(
                    "[sesame-crypto-core] WARNING: mlock failed, \
                     secrets may be swapped to disk. \
                     Consider raising RLIMIT_MEMLOCK."
                );
            });
        }
        Self { ptr, len, locked }
    }

    /// Returns `true` if the region is currently locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for LockedRegion {
    fn drop(&mut self) {
        if self.locked {
            platform::try_munlock(self.ptr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// SecretBuffer
// ---------------------------------------------------------------------------

/// Variable-length secret: decrypted passwords, derived keys.
///
/// Backed by [`SecretSlice<u8>`], which zeroizes its heap allocation on drop.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
    lock: LockedRegion,
}

impl SecretBuffer {
    /// Copy `data` into a new locked buffer.
    ///
    /// The caller remains responsible for zeroizing `data`.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Take ownership of `data` without copying it.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        let inner: SecretSlice<u8> = data.into();
        let exposed = inner.expose_secret();
        let lock = LockedRegion::try_lock(exposed.as_ptr(), exposed.len());
        Self { inner, lock }
    }

    /// Borrow the secret bytes. Keep the borrow short.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Borrow the secret as UTF-8, if it is.
    #[must_use]
    pub fn expose_str(&self) -> Option<&str> {
        std::str::from_utf8(self.expose()).ok()
    }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// `true` if no bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if the backing pages are `mlock`'d.
    #[must_use]
    pub const fn is_mlocked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// Core dumps
// ---------------------------------------------------------------------------

/// Disable core dumps for the current process (`RLIMIT_CORE = 0`).
///
/// No-op on non-Unix targets.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidInput`] if `setrlimit` is refused.
pub fn disable_core_dumps() -> Result<(), CryptoError> {
    platform::disable_core_dumps_impl()
}

#[cfg(unix)]
mod platform {
    use crate::error::CryptoError;

    pub(super) fn try_mlock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock accepts any pointer/length; an invalid range is
        // reported through the return value.
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn try_munlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: see try_mlock. Failure is ignored.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }

    pub(super) fn disable_core_dumps_impl() -> Result<(), CryptoError> {
        let limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: plain POSIX call with a valid rlimit pointer.
        let ret = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) };
        if ret != 0 {
            return Err(CryptoError::InvalidInput(
                "setrlimit(RLIMIT_CORE) was refused".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod platform {
    use crate::error::CryptoError;

    pub(super) fn try_mlock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) fn try_munlock(_ptr: *const u8, _len: usize) {}

    pub(super) fn disable_core_dumps_impl() -> Result<(), CryptoError> {
        Ok(())
    }
}
