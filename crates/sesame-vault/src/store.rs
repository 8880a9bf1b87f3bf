//! Persistence interface and the `SQLite` reference store.
//!
//! The store only ever sees opaque envelope text and non-secret key
//! profiles, so the database itself is not encrypted.

use std::fmt;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use sesame_crypto_core::KdfParams;

use crate::error::VaultError;
use crate::items::{now_iso8601, VaultItem};
use crate::session::{KeyProfile, PROFILE_SALT_LEN};

// ---------------------------------------------------------------------------
// ItemStore
// ---------------------------------------------------------------------------

/// Key-value persistence keyed by owner id and item id.
///
/// Every lookup is scoped to an owner: an item belonging to someone else
/// is indistinguishable from a missing one.
pub trait ItemStore {
    /// Insert or replace an item (last write wins).
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn put_item(&mut self, item: &VaultItem) -> Result<(), VaultError>;

    /// Fetch one item.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn get_item(&self, owner_id: &str, item_id: &str) -> Result<Option<VaultItem>, VaultError>;

    /// All of an owner's items, newest first.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn list_items(&self, owner_id: &str) -> Result<Vec<VaultItem>, VaultError>;

    /// Remove an item. Returns `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn delete_item(&mut self, owner_id: &str, item_id: &str) -> Result<bool, VaultError>;

    /// The owner's key profile, if one was saved.
    ///
    /// # Errors
    ///
    /// Backend failure or a corrupt profile row.
    fn load_profile(&self, owner_id: &str) -> Result<Option<KeyProfile>, VaultError>;

    /// Save (or replace) a key profile.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn save_profile(&mut self, profile: &KeyProfile) -> Result<(), VaultError>;
}

// ---------------------------------------------------------------------------
// Embedded migrations
// ---------------------------------------------------------------------------

/// Forward-only SQL migrations, embedded at compile time.
/// Index 0 → version 1.
const MIGRATIONS: &[&str] = &[include_str!("../migrations/001_initial_schema.sql")];

const ITEM_COLUMNS: &str =
    "id, owner_id, title, username, encrypted_password, url, notes, created_at, updated_at";

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// [`ItemStore`] backed by a `SQLite` database.
pub struct SqliteStore {
    conn: Connection,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SqliteStore(..)")
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run pending migrations.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Database`] if the file cannot be opened
    /// - [`VaultError::Migration`] if a migration fails
    pub fn open(path: &Path) -> Result<Self, VaultError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(conn)
    }

    /// A fresh in-memory database, for tests and throwaway sessions.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_in_memory() -> Result<Self, VaultError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, VaultError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut store = Self { conn };
        store.run_migrations()?;
        tracing::debug!(version = store.schema_version()?, "store ready");
        Ok(store)
    }

    /// Current schema version (`PRAGMA user_version`).
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Database`] if the pragma query fails.
    pub fn schema_version(&self) -> Result<i32, VaultError> {
        let v: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(v)
    }

    /// Apply pending migrations, each in its own transaction.
    fn run_migrations(&mut self) -> Result<(), VaultError> {
        let current = self.schema_version()?;

        for (idx, sql) in MIGRATIONS.iter().enumerate() {
            let version = idx
                .checked_add(1)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| VaultError::Migration("migration index overflow".into()))?;

            if version <= current {
                continue;
            }

            let tx = self.conn.transaction().map_err(|e| {
                VaultError::Migration(format!(
                    "failed to start transaction for migration {version}: {e}"
                ))
            })?;
            tx.execute_batch(sql)
                .map_err(|e| VaultError::Migration(format!("migration {version} failed: {e}")))?;
            tx.pragma_update(None, "user_version", version)
                .map_err(|e| {
                    VaultError::Migration(format!(
                        "failed to update user_version to {version}: {e}"
                    ))
                })?;
            tx.commit().map_err(|e| {
                VaultError::Migration(format!("failed to commit migration {version}: {e}"))
            })?;
        }

        Ok(())
    }
}

fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VaultItem> {
    Ok(VaultItem {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        username: row.get(3)?,
        encrypted_password: row.get(4)?,
        url: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl ItemStore for SqliteStore {
    fn put_item(&mut self, item: &VaultItem) -> Result<(), VaultError> {
        self.conn
            .execute(
                "INSERT INTO items (id, owner_id, title, username, encrypted_password, \
                 url, notes, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                 ON CONFLICT (owner_id, id) DO UPDATE SET \
                 title = excluded.title, username = excluded.username, \
                 encrypted_password = excluded.encrypted_password, url = excluded.url, \
                 notes = excluded.notes, created_at = excluded.created_at, \
                 updated_at = excluded.updated_at",
                params![
                    item.id,
                    item.owner_id,
                    item.title,
                    item.username,
                    item.encrypted_password,
                    item.url,
                    item.notes,
                    item.created_at,
                    item.updated_at,
                ],
            )
            .map_err(|e| VaultError::Database(format!("failed to write item: {e}")))?;
        tracing::debug!(owner_id = %item.owner_id, item_id = %item.id, "item written");
        Ok(())
    }

    fn get_item(&self, owner_id: &str, item_id: &str) -> Result<Option<VaultItem>, VaultError> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ?1 AND id = ?2"),
                params![owner_id, item_id],
                item_from_row,
            )
            .optional()
            .map_err(|e| VaultError::Database(format!("failed to query item: {e}")))
    }

    fn list_items(&self, owner_id: &str) -> Result<Vec<VaultItem>, VaultError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ?1 \
                 ORDER BY created_at DESC, rowid DESC"
            ))
            .map_err(|e| VaultError::Database(format!("failed to prepare list query: {e}")))?;

        let items = stmt
            .query_map(params![owner_id], item_from_row)
            .map_err(|e| VaultError::Database(format!("failed to execute list query: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| VaultError::Database(format!("failed to read item row: {e}")))?;

        tracing::debug!(owner_id, count = items.len(), "items listed");
        Ok(items)
    }

    fn delete_item(&mut self, owner_id: &str, item_id: &str) -> Result<bool, VaultError> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM items WHERE owner_id = ?1 AND id = ?2",
                params![owner_id, item_id],
            )
            .map_err(|e| VaultError::Database(format!("failed to delete item: {e}")))?;
        Ok(rows > 0)
    }

    fn load_profile(&self, owner_id: &str) -> Result<Option<KeyProfile>, VaultError> {
        let row = self
            .conn
            .query_row(
                "SELECT salt, kdf FROM key_profiles WHERE owner_id = ?1",
                params![owner_id],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|e| VaultError::Database(format!("failed to query key profile: {e}")))?;

        let Some((salt, kdf)) = row else {
            return Ok(None);
        };

        let salt: [u8; PROFILE_SALT_LEN] = salt.try_into().map_err(|bad: Vec<u8>| {
            VaultError::Database(format!(
                "key profile salt has {} bytes, expected {PROFILE_SALT_LEN}",
                bad.len()
            ))
        })?;
        let kdf: KdfParams = serde_json::from_str(&kdf)
            .map_err(|e| VaultError::Database(format!("corrupt key profile kdf: {e}")))?;
        kdf.validate()
            .map_err(|e| VaultError::Database(format!("key profile kdf rejected: {e}")))?;

        Ok(Some(KeyProfile {
            owner_id: owner_id.to_owned(),
            salt,
            kdf,
        }))
    }

    fn save_profile(&mut self, profile: &KeyProfile) -> Result<(), VaultError> {
        let kdf = serde_json::to_string(&profile.kdf)
            .map_err(|e| VaultError::Database(format!("failed to encode kdf params: {e}")))?;
        self.conn
            .execute(
                "INSERT INTO key_profiles (owner_id, salt, kdf, created_at) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT (owner_id) DO UPDATE SET salt = excluded.salt, kdf = excluded.kdf",
                params![profile.owner_id, profile.salt.as_slice(), kdf, now_iso8601()],
            )
            .map_err(|e| VaultError::Database(format!("failed to write key profile: {e}")))?;
        tracing::debug!(owner_id = %profile.owner_id, "key profile written");
        Ok(())
    }
}
