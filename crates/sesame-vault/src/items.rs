//! Vault items: create, update, delete, list, reveal, copy, search.
//!
//! Only the password is encrypted. Each password is sealed into its own
//! envelope under the session key with AAD `"{owner_id}/{item_id}"`, so an
//! envelope pasted into another item or another owner's vault does not
//! open.

use std::fmt;

use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use sesame_crypto_core::envelope::{open_encoded, seal};
use sesame_crypto_core::random::{random_array, OsRandom};
use sesame_crypto_core::SecretBuffer;
use zeroize::Zeroize;

use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::session::{KeyProfile, MasterPassword, VaultSession};
use crate::store::ItemStore;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A stored credential. Safe to hand to the UI: the password is an
/// encoded envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    /// UUID v4.
    pub id: String,
    /// Owner this item belongs to.
    pub owner_id: String,
    /// Display title.
    pub title: String,
    /// Login name, if any.
    pub username: Option<String>,
    /// Base64 envelope holding the password.
    pub encrypted_password: String,
    /// Site URL, if any.
    pub url: Option<String>,
    /// Free-form notes, if any.
    pub notes: Option<String>,
    /// ISO 8601 UTC creation time.
    pub created_at: String,
    /// ISO 8601 UTC time of the last update.
    pub updated_at: String,
}

/// Plaintext form of an item as collected by the UI.
///
/// The password is zeroized when the draft is dropped.
#[derive(Clone)]
pub struct ItemDraft {
    /// Required, must not be blank.
    pub title: String,
    pub username: Option<String>,
    /// Required, must not be blank.
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl ItemDraft {
    /// Draft with the two required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            username: None,
            password: password.into(),
            url: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn validate(&self) -> Result<(), VaultError> {
        if self.title.trim().is_empty() {
            return Err(VaultError::InvalidItem("title is required".into()));
        }
        if self.password.trim().is_empty() {
            return Err(VaultError::InvalidItem("password is required".into()));
        }
        Ok(())
    }
}

impl Drop for ItemDraft {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl fmt::Debug for ItemDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemDraft")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"***")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

fn item_aad(owner_id: &str, item_id: &str) -> Vec<u8> {
    format!("{owner_id}/{item_id}").into_bytes()
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

/// Encrypt and store a new item.
///
/// # Errors
///
/// - [`VaultError::InvalidItem`] if the draft or owner id is invalid
/// - [`VaultError::Locked`] / [`VaultError::Expired`] without a usable key
/// - [`VaultError::Crypto`] or [`VaultError::Database`] on failure
pub fn create_item<S: ItemStore + ?Sized>(
    store: &mut S,
    session: &mut VaultSession,
    owner_id: &str,
    draft: &ItemDraft,
) -> Result<VaultItem, VaultError> {
    if owner_id.is_empty() {
        return Err(VaultError::InvalidItem("owner id is required".into()));
    }
    draft.validate()?;
    let key = session.key_for(owner_id)?;

    let id = generate_uuid()?;
    let now = now_iso8601();
    let envelope = seal(draft.password.as_bytes(), key, &item_aad(owner_id, &id))?;

    let item = VaultItem {
        id,
        owner_id: owner_id.to_owned(),
        title: draft.title.trim().to_owned(),
        username: non_blank(draft.username.as_ref()),
        encrypted_password: envelope.encode(),
        url: non_blank(draft.url.as_ref()),
        notes: non_blank(draft.notes.as_ref()),
        created_at: now.clone(),
        updated_at: now,
    };
    store.put_item(&item)?;

    tracing::info!(owner_id, item_id = %item.id, "item created");
    Ok(item)
}

/// Replace an item's fields and re-seal its password.
///
/// `created_at` is kept; `updated_at` is bumped. Concurrent updates are
/// last-write-wins.
///
/// # Errors
///
/// - [`VaultError::ItemNotFound`] if the owner has no such item
/// - otherwise as [`create_item`]
pub fn update_item<S: ItemStore + ?Sized>(
    store: &mut S,
    session: &mut VaultSession,
    owner_id: &str,
    item_id: &str,
    draft: &ItemDraft,
) -> Result<VaultItem, VaultError> {
    draft.validate()?;
    let key = session.key_for(owner_id)?;

    let existing = store
        .get_item(owner_id, item_id)?
        .ok_or_else(|| VaultError::ItemNotFound(item_id.to_owned()))?;

    let envelope = seal(draft.password.as_bytes(), key, &item_aad(owner_id, item_id))?;

    let item = VaultItem {
        id: existing.id,
        owner_id: existing.owner_id,
        title: draft.title.trim().to_owned(),
        username: non_blank(draft.username.as_ref()),
        encrypted_password: envelope.encode(),
        url: non_blank(draft.url.as_ref()),
        notes: non_blank(draft.notes.as_ref()),
        created_at: existing.created_at,
        updated_at: now_iso8601(),
    };
    store.put_item(&item)?;

    tracing::info!(owner_id, item_id, "item updated");
    Ok(item)
}

/// Permanently remove an item. Does not need an unlocked session.
///
/// # Errors
///
/// - [`VaultError::ItemNotFound`] if the owner has no such item
/// - [`VaultError::Database`] on store failure
pub fn delete_item<S: ItemStore + ?Sized>(
    store: &mut S,
    owner_id: &str,
    item_id: &str,
) -> Result<(), VaultError> {
    if !store.delete_item(owner_id, item_id)? {
        return Err(VaultError::ItemNotFound(item_id.to_owned()));
    }
    tracing::info!(owner_id, item_id, "item deleted");
    Ok(())
}

/// The owner's items, newest first. Nothing is decrypted.
///
/// # Errors
///
/// [`VaultError::Database`] on store failure.
pub fn list_items<S: ItemStore + ?Sized>(
    store: &S,
    owner_id: &str,
) -> Result<Vec<VaultItem>, VaultError> {
    let mut items = store.list_items(owner_id)?;
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(items)
}

/// Decrypt an item's password.
///
/// # Errors
///
/// - [`VaultError::ItemNotFound`] if the owner has no such item
/// - [`VaultError::Undecryptable`] if the envelope does not open, whatever
///   the reason (wrong master password, tampering, corruption)
/// - [`VaultError::Locked`] / [`VaultError::Expired`] without a usable key
pub fn reveal_password<S: ItemStore + ?Sized>(
    store: &S,
    session: &mut VaultSession,
    owner_id: &str,
    item_id: &str,
) -> Result<SecretBuffer, VaultError> {
    let key = session.key_for(owner_id)?;
    let item = store
        .get_item(owner_id, item_id)?
        .ok_or_else(|| VaultError::ItemNotFound(item_id.to_owned()))?;

    open_encoded(&item.encrypted_password, key, &item_aad(owner_id, item_id)).map_err(|e| {
        if e.is_undecryptable() {
            tracing::warn!(owner_id, item_id, "item could not be decrypted");
            VaultError::Undecryptable(item_id.to_owned())
        } else {
            VaultError::Crypto(e)
        }
    })
}

/// [`reveal_password`] and mark the item as copied on the session's
/// indicator. The caller puts the returned secret on the clipboard.
///
/// # Errors
///
/// Same as [`reveal_password`]. The indicator is untouched on error.
pub fn copy_password<S: ItemStore + ?Sized>(
    store: &S,
    session: &mut VaultSession,
    owner_id: &str,
    item_id: &str,
) -> Result<SecretBuffer, VaultError> {
    let secret = reveal_password(store, session, owner_id, item_id)?;
    session.copied_mut().mark_copied(item_id);
    tracing::debug!(owner_id, item_id, "password copied");
    Ok(secret)
}

/// Case-insensitive substring filter on title or username. An empty query
/// matches everything; whitespace is matched literally.
#[must_use]
pub fn search_items<'a>(items: &'a [VaultItem], query: &str) -> Vec<&'a VaultItem> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            item.title.to_lowercase().contains(&needle)
                || item
                    .username
                    .as_ref()
                    .is_some_and(|u| u.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Unlock `session` for `owner_id`, creating the owner's key profile with
/// `config.kdf` and a fresh salt on first use.
///
/// A new profile is only saved once the unlock succeeded.
///
/// # Errors
///
/// Same as [`VaultSession::unlock`], plus store failures.
pub fn unlock_owner<S: ItemStore + ?Sized>(
    store: &mut S,
    session: &mut VaultSession,
    owner_id: &str,
    password: MasterPassword,
    config: &VaultConfig,
) -> Result<(), VaultError> {
    if owner_id.is_empty() {
        return Err(VaultError::InvalidItem("owner id is required".into()));
    }
    let (profile, is_new) = match store.load_profile(owner_id)? {
        Some(profile) => (profile, false),
        None => (KeyProfile::generate(owner_id, config.kdf)?, true),
    };

    session.unlock(password, &profile)?;

    if is_new {
        if let Err(e) = store.save_profile(&profile) {
            session.lock();
            return Err(e);
        }
        tracing::warn!(owner_id, "created key profile for new owner");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Random UUID v4, lowercase hyphenated.
pub(crate) fn generate_uuid() -> Result<String, VaultError> {
    let mut bytes: [u8; 16] = random_array(&OsRandom)?;
    bytes[6] = (bytes[6] & 0x0F) | 0x40; // version 4
    bytes[8] = (bytes[8] & 0x3F) | 0x80; // variant 1

    let hex = HEXLOWER.encode(&bytes);
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    ))
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub(crate) fn now_iso8601() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_utc(secs)
}

/// Format epoch seconds as `YYYY-MM-DDTHH:MM:SSZ`.
#[allow(clippy::arithmetic_side_effects)]
fn format_utc(epoch_secs: u64) -> String {
    let (year, month, day) = civil_date(epoch_secs / 86_400);
    let time_of_day = epoch_secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        time_of_day / 3600,
        time_of_day % 3600 / 60,
        time_of_day % 60
    )
}

const fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days since 1970-01-01 to (year, month, day).
#[allow(clippy::arithmetic_side_effects)]
fn civil_date(mut days: u64) -> (u64, u64, u64) {
    let mut year = 1970;
    loop {
        let in_year = if is_leap_year(year) { 366 } else { 365 };
        if days < in_year {
            break;
        }
        days -= in_year;
        year += 1;
    }

    let february = if is_leap_year(year) { 29 } else { 28 };
    let month_lengths = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 1;
    for len in month_lengths {
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }
    (year, month, days + 1)
}
