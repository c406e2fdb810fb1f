// SPDX-License-Identifier: GPL-3.0-only

//! Metadata store for captured images and their filter stacks
//!
//! The core only talks to [`PersistenceGateway`]. All calls are blocking and
//! must be made off the UI thread (the pipelines wrap them in
//! `spawn_blocking`). [`SqliteStore`] is the embedded implementation.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::errors::PersistenceError;

/// One captured image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Unique id, never reused after deletion
    pub id: i64,
    /// Capture time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    /// Full path of the stored image file
    pub storage_path: String,
}

/// One filter of an image's stack, as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFilterRecord {
    pub owner_image_id: i64,
    /// Stable variant tag (see `FilterTag::as_str`)
    pub type_tag: String,
    /// Display name of the filter
    pub name: String,
    /// Variant parameters as JSON
    pub parameter_blob: String,
}

/// Store that owns image rows and filter rows
pub trait PersistenceGateway: Send + Sync {
    /// Id the next [`insert_image`](Self::insert_image) would assign
    ///
    /// Informational only; use `insert_image` to actually allocate.
    fn next_image_id(&self) -> Result<i64, PersistenceError>;

    /// Allocate an id and insert the record in one atomic step
    fn insert_image(
        &self,
        timestamp: &str,
        storage_path: &str,
    ) -> Result<ImageRecord, PersistenceError>;

    /// Insert or replace a record with a caller-chosen id
    fn upsert_image(&self, record: &ImageRecord) -> Result<(), PersistenceError>;

    fn get_image(&self, id: i64) -> Result<Option<ImageRecord>, PersistenceError>;

    /// All images, newest first
    fn list_images(&self) -> Result<Vec<ImageRecord>, PersistenceError>;

    /// Delete an image and its filter rows; returns whether it existed
    fn delete_image(&self, id: i64) -> Result<bool, PersistenceError>;

    /// Delete every filter row owned by an image; returns the count removed
    fn delete_filter_records(&self, owner_image_id: i64) -> Result<usize, PersistenceError>;

    fn insert_filter_record(&self, record: &PersistedFilterRecord) -> Result<(), PersistenceError>;

    /// Filter rows of an image in the order they were inserted
    fn get_filter_records(
        &self,
        owner_image_id: i64,
    ) -> Result<Vec<PersistedFilterRecord>, PersistenceError>;

    /// Replace an image's filter rows
    ///
    /// The default is delete-then-insert; stores with transactions should
    /// override this so readers never observe a half-written stack.
    fn replace_filter_records(
        &self,
        owner_image_id: i64,
        records: &[PersistedFilterRecord],
    ) -> Result<(), PersistenceError> {
        self.delete_filter_records(owner_image_id)?;
        for record in records {
            self.insert_filter_record(record)?;
        }
        Ok(())
    }
}
