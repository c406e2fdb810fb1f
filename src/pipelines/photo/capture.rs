// SPDX-License-Identifier: GPL-3.0-only

//! Capture stages and the per-capture task object

use crate::backends::camera::{FrameHandle, Rotation};
use crate::errors::{AppError, AppResult, PersistenceError, StorageError};
use crate::persistence::{ImageRecord, PersistenceGateway};
use crate::storage::FrameStorage;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Progress of one capture
///
/// `Idle → Capturing → Saving → Indexing → Done`, or `Failed` from any
/// stage after `Capturing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    /// Waiting for a capture slot
    Capturing,
    /// Encoding and writing the file
    Saving,
    /// Allocating an id and writing the record
    Indexing,
    Done(ImageRecord),
    Failed(String),
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "idle"),
            CaptureState::Capturing => write!(f, "capturing"),
            CaptureState::Saving => write!(f, "saving"),
            CaptureState::Indexing => write!(f, "indexing"),
            CaptureState::Done(record) => write!(f, "done (#{})", record.id),
            CaptureState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Handle to a running capture
///
/// Dropping it does not cancel the capture.
pub struct CaptureTask {
    state: watch::Receiver<CaptureState>,
    handle: JoinHandle<AppResult<ImageRecord>>,
}

impl CaptureTask {
    pub(super) fn new(
        state: watch::Receiver<CaptureState>,
        handle: JoinHandle<AppResult<ImageRecord>>,
    ) -> Self {
        Self { state, handle }
    }

    /// Current stage
    pub fn state(&self) -> CaptureState {
        self.state.borrow().clone()
    }

    /// Follow stage changes
    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the capture to finish
    pub async fn wait(self) -> AppResult<ImageRecord> {
        self.handle
            .await
            .map_err(|e| AppError::Storage(StorageError::WorkerFailed(e.to_string())))?
    }
}

/// Everything one capture needs, moved into its task
pub(super) struct CaptureJob {
    pub frame: FrameHandle,
    pub rotation: Rotation,
    pub timestamp: String,
    pub storage: Arc<dyn FrameStorage>,
    pub gateway: Arc<dyn PersistenceGateway>,
    pub permits: Arc<Semaphore>,
}

impl CaptureJob {
    /// Save then index, reporting each stage on `state`
    ///
    /// The frame is released as soon as the file is written (or the write
    /// fails); every early return drops it exactly once.
    pub async fn run(self, state: &watch::Sender<CaptureState>) -> AppResult<ImageRecord> {
        let CaptureJob {
            frame,
            rotation,
            timestamp,
            storage,
            gateway,
            permits,
        } = self;

        let _permit = permits
            .acquire_owned()
            .await
            .map_err(|e| StorageError::WorkerFailed(e.to_string()))?;

        state.send_replace(CaptureState::Saving);
        let sequence = frame.frame().sequence;
        let path = tokio::task::spawn_blocking(move || {
            let result = storage.save_frame(frame.frame(), rotation);
            frame.close();
            result
        })
        .await
        .map_err(|e| StorageError::WorkerFailed(e.to_string()))??;
        debug!(sequence, path = %path.display(), "Capture written");

        state.send_replace(CaptureState::Indexing);
        let storage_path = path.to_string_lossy().into_owned();
        let record = tokio::task::spawn_blocking(move || {
            gateway.insert_image(&timestamp, &storage_path)
        })
        .await
        .map_err(|e| PersistenceError::WorkerFailed(e.to_string()))?
        .map_err(|e| {
            warn!(path = %path.display(), error = %e, "Photo saved but not indexed, leaving file on disk");
            e
        })?;

        Ok(record)
    }
}
