//! `sesame-vault`: vault logic for Sesame.
//!
//! Unlock sessions, item CRUD over encrypted passwords, the "copied"
//! indicator, settings, and a `SQLite` reference store.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod clipboard;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub mod items;

pub use clipboard::{CopiedIndicator, DEFAULT_COPIED_INDICATOR};
pub use config::VaultConfig;
pub use error::VaultError;
pub use items::{
    copy_password, create_item, delete_item, list_items, reveal_password, search_items,
    unlock_owner, update_item, ItemDraft, VaultItem,
};
pub use session::{KeyProfile, MasterPassword, SessionState, VaultSession, PROFILE_SALT_LEN};
pub use store::{ItemStore, SqliteStore};
