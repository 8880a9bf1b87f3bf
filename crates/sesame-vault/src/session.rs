//! Unlock session: master password in, session key held, inactivity expiry.
//!
//! ```text
//! Locked ──unlock──► Unlocking ──ok──► Unlocked ──lock──► Locked
//!    ▲                   │                 │
//!    └──────error────────┘                 └──timeout──► Expired
//! ```
//!
//! The master password is consumed by [`VaultSession::unlock`] and dropped
//! (zeroized) as soon as the key is derived. The key lives only inside the
//! session and is dropped on lock or expiry.

use std::fmt;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sesame_crypto_core::kdf::{derive, DerivedKey, KdfParams, SESSION_KEY_BITS};
use sesame_crypto_core::random::{random_array, OsRandom, RandomSource};

use crate::clipboard::CopiedIndicator;
use crate::config::VaultConfig;
use crate::error::VaultError;

/// Length of the per-owner KDF salt.
pub const PROFILE_SALT_LEN: usize = 16;

// ---------------------------------------------------------------------------
// MasterPassword
// ---------------------------------------------------------------------------

/// The user's master password. Zeroized on drop, never serialized.
pub struct MasterPassword(SecretString);

impl MasterPassword {
    /// Wrap a password typed by the user.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::from(password.into()))
    }

    /// Length in Unicode scalar values.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.expose_secret().chars().count()
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

impl From<String> for MasterPassword {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for MasterPassword {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

impl fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterPassword(***)")
    }
}

// ---------------------------------------------------------------------------
// KeyProfile
// ---------------------------------------------------------------------------

/// Non-secret inputs needed to re-derive an owner's session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyProfile {
    /// Owner this profile belongs to.
    pub owner_id: String,
    /// Random KDF salt, fixed for the owner's lifetime.
    pub salt: [u8; PROFILE_SALT_LEN],
    /// KDF algorithm and cost.
    pub kdf: KdfParams,
}

impl KeyProfile {
    /// New profile with a fresh salt from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Crypto`] if the CSPRNG fails or `kdf` is invalid.
    pub fn generate(owner_id: &str, kdf: KdfParams) -> Result<Self, VaultError> {
        Self::generate_with(&OsRandom, owner_id, kdf)
    }

    /// New profile with a salt drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    pub fn generate_with<R: RandomSource + ?Sized>(
        rng: &R,
        owner_id: &str,
        kdf: KdfParams,
    ) -> Result<Self, VaultError> {
        kdf.validate()?;
        Ok(Self {
            owner_id: owner_id.to_owned(),
            salt: random_array(rng)?,
            kdf,
        })
    }
}

// ---------------------------------------------------------------------------
// VaultSession
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No key held.
    Locked,
    /// Key derivation in progress.
    Unlocking,
    /// Key held; item operations allowed.
    Unlocked,
    /// Key dropped after the inactivity timeout.
    Expired,
}

/// One user's unlocked vault.
///
/// Passed explicitly to every item operation; there is no global session.
pub struct VaultSession {
    state: SessionState,
    key: Option<DerivedKey>,
    owner_id: Option<String>,
    last_activity: Option<Instant>,
    timeout: Duration,
    min_password_len: usize,
    copied: CopiedIndicator,
}

impl fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSession")
            .field("state", &self.state)
            .field("owner_id", &self.owner_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl VaultSession {
    /// A locked session with the given policy.
    #[must_use]
    pub fn new(timeout: Duration, min_password_len: usize, copied_lifetime: Duration) -> Self {
        Self {
            state: SessionState::Locked,
            key: None,
            owner_id: None,
            last_activity: None,
            timeout,
            min_password_len,
            copied: CopiedIndicator::new(copied_lifetime),
        }
    }

    /// A locked session using the policy in `config`.
    #[must_use]
    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(
            config.auto_lock_timeout(),
            config.min_master_password_length,
            config.copied_indicator(),
        )
    }

    /// Current state. Does not check expiry; see
    /// [`check_expiry`](Self::check_expiry).
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Owner the session was unlocked for.
    #[must_use]
    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    /// Derive the session key for `profile` from `password`.
    ///
    /// Allowed from `Locked` or `Expired`. A wrong password is not detected
    /// here; it shows up later as items that cannot be decrypted.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AlreadyUnlocked`] if the session is unlocked
    /// - [`VaultError::MasterPasswordTooShort`] below the minimum length
    /// - [`VaultError::Crypto`] if derivation fails
    ///
    /// On error the session is `Locked`.
    pub fn unlock(&mut self, password: MasterPassword, profile: &KeyProfile) -> Result<(), VaultError> {
        match self.state {
            SessionState::Locked | SessionState::Expired => {}
            SessionState::Unlocking | SessionState::Unlocked => {
                return Err(VaultError::AlreadyUnlocked);
            }
        }
        self.state = SessionState::Unlocking;

        if password.char_count() < self.min_password_len {
            self.state = SessionState::Locked;
            return Err(VaultError::MasterPasswordTooShort {
                min: self.min_password_len,
            });
        }

        let derived = derive(
            password.as_bytes(),
            &profile.salt,
            &profile.kdf,
            SESSION_KEY_BITS,
        );
        drop(password);

        let key = match derived {
            Ok(key) => key,
            Err(e) => {
                self.state = SessionState::Locked;
                return Err(e.into());
            }
        };

        self.key = Some(key);
        self.owner_id = Some(profile.owner_id.clone());
        self.last_activity = Some(Instant::now());
        self.state = SessionState::Unlocked;
        tracing::info!(owner_id = %profile.owner_id, "vault unlocked");
        Ok(())
    }

    /// Drop the key and the copied indicator. Always ends `Locked`.
    pub fn lock(&mut self) {
        let was_unlocked = self.key.is_some();
        self.clear();
        self.state = SessionState::Locked;
        if was_unlocked {
            tracing::info!("vault locked");
        }
    }

    /// Record user activity, restarting the inactivity clock.
    pub fn touch(&mut self) {
        self.touch_at(Instant::now());
    }

    /// Record user activity at `now`.
    pub fn touch_at(&mut self, now: Instant) {
        if self.state == SessionState::Unlocked {
            self.last_activity = Some(now);
        }
    }

    /// Expire the session if the inactivity timeout has elapsed.
    pub fn check_expiry(&mut self) -> SessionState {
        self.check_expiry_at(Instant::now())
    }

    /// Same as [`check_expiry`](Self::check_expiry) against an explicit clock.
    pub fn check_expiry_at(&mut self, now: Instant) -> SessionState {
        if self.state == SessionState::Unlocked {
            let idle = self
                .last_activity
                .map_or(Duration::MAX, |at| now.saturating_duration_since(at));
            if idle >= self.timeout {
                self.clear();
                self.state = SessionState::Expired;
                tracing::info!(idle_secs = idle.as_secs(), "session expired");
            }
        }
        self.state
    }

    /// The session key, if the session is unlocked and not idle too long.
    /// Counts as activity.
    ///
    /// # Errors
    ///
    /// [`VaultError::Locked`] or [`VaultError::Expired`].
    pub fn key(&mut self) -> Result<&DerivedKey, VaultError> {
        self.key_at(Instant::now())
    }

    /// Same as [`key`](Self::key) against an explicit clock.
    ///
    /// # Errors
    ///
    /// [`VaultError::Locked`] or [`VaultError::Expired`].
    pub fn key_at(&mut self, now: Instant) -> Result<&DerivedKey, VaultError> {
        match self.check_expiry_at(now) {
            SessionState::Unlocked => {}
            SessionState::Expired => return Err(VaultError::Expired),
            SessionState::Locked | SessionState::Unlocking => return Err(VaultError::Locked),
        }
        self.last_activity = Some(now);
        self.key.as_ref().ok_or(VaultError::Locked)
    }

    /// The session key for `owner_id`. A session unlocked for another owner
    /// is treated as locked.
    ///
    /// # Errors
    ///
    /// Same as [`key`](Self::key).
    pub fn key_for(&mut self, owner_id: &str) -> Result<&DerivedKey, VaultError> {
        if self.state == SessionState::Unlocked && self.owner_id.as_deref() != Some(owner_id) {
            return Err(VaultError::Locked);
        }
        self.key()
    }

    /// The copied indicator for this session.
    #[must_use]
    pub const fn copied(&self) -> &CopiedIndicator {
        &self.copied
    }

    /// Mutable access to the copied indicator.
    pub fn copied_mut(&mut self) -> &mut CopiedIndicator {
        &mut self.copied
    }

    fn clear(&mut self) {
        self.key = None;
        self.owner_id = None;
        self.last_activity = None;
        self.copied.clear();
    }
}

impl Drop for VaultSession {
    fn drop(&mut self) {
        self.clear();
    }
}
