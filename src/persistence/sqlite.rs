// SPDX-License-Identifier: GPL-3.0-only

//! SQLite catalog
//!
//! A single connection behind a mutex. Every multi-statement operation runs
//! in a transaction while the lock is held, which is what makes id
//! allocation safe under concurrent captures.

use super::{ImageRecord, PersistedFilterRecord, PersistenceGateway};
use crate::errors::PersistenceError;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS images (
        id          INTEGER PRIMARY KEY,
        timestamp   TEXT NOT NULL,
        path        TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS filters (
        seq         INTEGER PRIMARY KEY AUTOINCREMENT,
        image_id    INTEGER NOT NULL,
        type_tag    TEXT NOT NULL,
        name        TEXT NOT NULL,
        params      TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_filters_image_id ON filters(image_id);

    CREATE TABLE IF NOT EXISTS id_counter (
        name        TEXT PRIMARY KEY,
        value       INTEGER NOT NULL
    );
";

const IMAGE_COUNTER: &str = "images";

/// Embedded store backed by a SQLite file
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file and initialize the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PersistenceError::Unavailable(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Self::init(conn, Some(path.to_path_buf()))?;
        info!(path = %path.display(), "Catalog opened");
        Ok(store)
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> Result<Self, PersistenceError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Number of images in the catalog
    pub fn image_count(&self) -> Result<i64, PersistenceError> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::Unavailable("catalog lock poisoned".to_string()))
    }
}

/// Highest id ever issued, including deleted images
fn last_issued_id(tx: &Transaction<'_>) -> Result<i64, PersistenceError> {
    let counter: Option<i64> = tx
        .query_row(
            "SELECT value FROM id_counter WHERE name = ?1",
            [IMAGE_COUNTER],
            |row| row.get(0),
        )
        .optional()?;
    let max_id: i64 = tx.query_row("SELECT COALESCE(MAX(id), 0) FROM images", [], |row| {
        row.get(0)
    })?;
    Ok(counter.unwrap_or(0).max(max_id))
}

fn bump_counter(tx: &Transaction<'_>, id: i64) -> Result<(), PersistenceError> {
    tx.execute(
        "INSERT INTO id_counter (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = MAX(value, excluded.value)",
        params![IMAGE_COUNTER, id],
    )?;
    Ok(())
}

fn image_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageRecord> {
    Ok(ImageRecord {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        storage_path: row.get(2)?,
    })
}

fn insert_filter(tx: &Transaction<'_>, record: &PersistedFilterRecord) -> Result<(), PersistenceError> {
    tx.execute(
        "INSERT INTO filters (image_id, type_tag, name, params) VALUES (?1, ?2, ?3, ?4)",
        params![
            record.owner_image_id,
            record.type_tag,
            record.name,
            record.parameter_blob
        ],
    )?;
    Ok(())
}

impl PersistenceGateway for SqliteStore {
    fn next_image_id(&self) -> Result<i64, PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let next = last_issued_id(&tx)? + 1;
        tx.commit()?;
        Ok(next)
    }

    fn insert_image(
        &self,
        timestamp: &str,
        storage_path: &str,
    ) -> Result<ImageRecord, PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let id = last_issued_id(&tx)? + 1;
        tx.execute(
            "INSERT INTO images (id, timestamp, path) VALUES (?1, ?2, ?3)",
            params![id, timestamp, storage_path],
        )?;
        bump_counter(&tx, id)?;
        tx.commit()?;

        debug!(id, path = storage_path, "Image row inserted");
        Ok(ImageRecord {
            id,
            timestamp: timestamp.to_string(),
            storage_path: storage_path.to_string(),
        })
    }

    fn upsert_image(&self, record: &ImageRecord) -> Result<(), PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO images (id, timestamp, path) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET timestamp = excluded.timestamp, path = excluded.path",
            params![record.id, record.timestamp, record.storage_path],
        )?;
        bump_counter(&tx, record.id)?;
        tx.commit()?;
        Ok(())
    }

    fn get_image(&self, id: i64) -> Result<Option<ImageRecord>, PersistenceError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT id, timestamp, path FROM images WHERE id = ?1",
                [id],
                image_from_row,
            )
            .optional()?)
    }

    fn list_images(&self) -> Result<Vec<ImageRecord>, PersistenceError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, timestamp, path FROM images ORDER BY id DESC")?;
        let images = stmt
            .query_map([], image_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(images)
    }

    fn delete_image(&self, id: i64) -> Result<bool, PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM filters WHERE image_id = ?1", [id])?;
        let removed = tx.execute("DELETE FROM images WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn delete_filter_records(&self, owner_image_id: i64) -> Result<usize, PersistenceError> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM filters WHERE image_id = ?1", [owner_image_id])?)
    }

    fn insert_filter_record(&self, record: &PersistedFilterRecord) -> Result<(), PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        insert_filter(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn get_filter_records(
        &self,
        owner_image_id: i64,
    ) -> Result<Vec<PersistedFilterRecord>, PersistenceError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT image_id, type_tag, name, params FROM filters WHERE image_id = ?1 ORDER BY seq",
        )?;
        let records = stmt
            .query_map([owner_image_id], |row| {
                Ok(PersistedFilterRecord {
                    owner_image_id: row.get(0)?,
                    type_tag: row.get(1)?,
                    name: row.get(2)?,
                    parameter_blob: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn replace_filter_records(
        &self,
        owner_image_id: i64,
        records: &[PersistedFilterRecord],
    ) -> Result<(), PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM filters WHERE image_id = ?1", [owner_image_id])?;
        for record in records {
            insert_filter(&tx, record)?;
        }
        tx.commit()?;
        debug!(owner_image_id, count = records.len(), "Filter rows replaced");
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}
