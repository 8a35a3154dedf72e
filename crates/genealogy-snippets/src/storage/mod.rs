//! Key-value storage for the snippet catalog.
//!
//! The catalog lives in a single named slot and is always read and written
//! as a whole value. [`KeyValueStore`] is the seam the rest of the crate
//! talks to; [`SqliteStore`] persists slots on disk and [`MemoryStore`]
//! keeps them in process.

mod memory;
pub mod migrations;
pub mod schema;
pub mod watch;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use memory::MemoryStore;
pub use watch::{Change, ChangeFeed, StoreWatcher, Subscription, WatchHandle};

/// A store of whole string values under string keys.
pub trait KeyValueStore {
    /// Read the value of a slot, `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value of a slot.
    ///
    /// Returns `true` if the stored value changed. Writing the value a slot
    /// already holds is not a change.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<bool>;

    /// Digest of a slot's current value, `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn fingerprint(&self, key: &str) -> Result<Option<String>>;
}

/// BLAKE3 hex digest of a slot value.
#[must_use]
pub fn fingerprint(value: &str) -> String {
    blake3::hash(value.as_bytes()).to_hex().to_string()
}

/// `SQLite`-backed slot store.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening snippet store at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL lets a watcher read while another process writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&mut conn)?;

        info!("Snippet store opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size, digest and last update time of a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn slot_info(&self, key: &str) -> Result<Option<SlotInfo>> {
        let row = self
            .conn
            .query_row(
                "SELECT LENGTH(CAST(value AS BLOB)), digest, updated_at FROM slots WHERE key = ?1",
                [key],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(size, digest, updated_at)| SlotInfo {
            key: key.to_string(),
            size_bytes: u64::try_from(size).unwrap_or(0),
            digest,
            updated_at: DateTime::parse_from_rfc3339(&updated_at)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        let digest = fingerprint(value);
        let affected = self.conn.execute(
            r"
            INSERT INTO slots (key, value, digest, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                digest = excluded.digest,
                updated_at = excluded.updated_at
            WHERE slots.digest != excluded.digest
            ",
            params![key, value, digest, Utc::now().to_rfc3339()],
        )?;

        let changed = affected > 0;
        debug!(
            "Wrote slot {key:?} ({} bytes, {})",
            value.len(),
            if changed { "changed" } else { "unchanged" }
        );
        Ok(changed)
    }

    fn fingerprint(&self, key: &str) -> Result<Option<String>> {
        let digest = self
            .conn
            .query_row("SELECT digest FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(digest)
    }
}

/// Facts about a stored slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    /// Slot name.
    pub key: String,
    /// Size of the stored value in bytes.
    pub size_bytes: u64,
    /// Digest of the stored value.
    pub digest: String,
    /// When the value last changed.
    pub updated_at: Option<DateTime<Utc>>,
}
