//! Non-secret vault settings, stored as plain JSON next to the database.
//!
//! Readable before unlock: the KDF parameters for new owners, the unlock
//! policy and the generator defaults all live here.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sesame_crypto_core::{GeneratorConfig, KdfParams};

/// Vault settings.
///
/// Persisted to `{dir}/sesame.json`. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VaultConfig {
    /// KDF used when a new owner's key profile is created. Existing
    /// profiles keep the parameters they were created with.
    #[serde(default)]
    pub kdf: KdfParams,

    /// Minimum master password length, in characters.
    #[serde(default = "default_min_master_password_length")]
    pub min_master_password_length: usize,

    /// Minutes of inactivity before the session expires.
    #[serde(default = "default_auto_lock_timeout")]
    pub auto_lock_timeout_minutes: u32,

    /// How long the "copied" indicator stays visible.
    #[serde(default = "default_copied_indicator_ms")]
    pub copied_indicator_ms: u64,

    /// Defaults for the password generator.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            min_master_password_length: default_min_master_password_length(),
            auto_lock_timeout_minutes: default_auto_lock_timeout(),
            copied_indicator_ms: default_copied_indicator_ms(),
            generator: GeneratorConfig::default(),
        }
    }
}

const fn default_min_master_password_length() -> usize {
    8
}
const fn default_auto_lock_timeout() -> u32 {
    15
}
const fn default_copied_indicator_ms() -> u64 {
    15_000
}

const CONFIG_FILE: &str = "sesame.json";

impl VaultConfig {
    /// Inactivity timeout as a [`Duration`].
    #[must_use]
    pub fn auto_lock_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.auto_lock_timeout_minutes).saturating_mul(60))
    }

    /// Copied-indicator lifetime as a [`Duration`].
    #[must_use]
    pub const fn copied_indicator(&self) -> Duration {
        Duration::from_millis(self.copied_indicator_ms)
    }

    /// Load settings from `{dir}/sesame.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing or
    /// contains invalid JSON. A `kdf` outside the accepted work-factor
    /// range is replaced by the default one.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let mut config: Self = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "corrupt config, using defaults: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        if let Err(e) = config.kdf.validate() {
            tracing::warn!(path = %path.display(), "rejected kdf settings, using default: {e}");
            config.kdf = KdfParams::default();
        }
        config
    }

    /// Persist settings to `{dir}/sesame.json`.
    ///
    /// Writes to a `.tmp` file first, then renames over the target.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the
    /// file system rejects the write/rename.
    pub fn save(&self, dir: &Path) -> std::io::Result<()> {
        let path = dir.join(CONFIG_FILE);
        let tmp = dir.join(".sesame.json.tmp");

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
