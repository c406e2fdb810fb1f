// SPDX-License-Identifier: GPL-3.0-only

//! Async photo capture pipeline
//!
//! ```text
//! Shutter → Capturing → Saving (encode + write) → Indexing (id + record) → Done
//!                            ↓                           ↓
//!                         Failed                       Failed
//! ```
//!
//! Each capture is its own task. Captures run concurrently up to a fixed
//! limit; only id allocation is serialized, inside the store. The camera
//! preview is never blocked: all file and database work happens on
//! blocking threads.

pub mod capture;
pub mod encoding;
pub mod processing;

pub use capture::{CaptureState, CaptureTask};
pub use encoding::{EncodingFormat, PhotoEncoder};
pub use processing::PostProcessor;

use crate::app::{Message, Notification, UiSender};
use crate::backends::camera::{FrameHandle, Rotation};
use crate::constants::{RECORD_TIMESTAMP_FORMAT, messages};
use crate::persistence::{ImageRecord, PersistenceGateway};
use crate::storage::FrameStorage;
use capture::CaptureJob;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, watch};
use tracing::{error, info};

/// Turns shutter presses into stored, indexed photos
pub struct CapturePipeline {
    storage: Arc<dyn FrameStorage>,
    gateway: Arc<dyn PersistenceGateway>,
    ui: UiSender,
    permits: Arc<Semaphore>,
    last_captured: Arc<Mutex<Option<ImageRecord>>>,
    runtime: Handle,
}

impl CapturePipeline {
    /// `max_concurrent` bounds how many captures save/index at once
    pub fn new(
        storage: Arc<dyn FrameStorage>,
        gateway: Arc<dyn PersistenceGateway>,
        ui: UiSender,
        max_concurrent: usize,
        runtime: Handle,
    ) -> Self {
        Self {
            storage,
            gateway,
            ui,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_captured: Arc::new(Mutex::new(None)),
            runtime,
        }
    }

    /// Most recent successfully indexed capture
    pub fn last_captured(&self) -> Option<ImageRecord> {
        self.last_captured
            .lock()
            .map(|last| last.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Start a capture of `frame` taken at `rotation`
    ///
    /// Returns immediately. The outcome is posted to the UI queue
    /// (`PhotoSaved` plus a notification, or a failure notification) and is
    /// also available from the returned task.
    pub fn capture(&self, frame: FrameHandle, rotation: Rotation) -> CaptureTask {
        let (state_tx, state_rx) = watch::channel(CaptureState::Idle);
        state_tx.send_replace(CaptureState::Capturing);

        let sequence = frame.frame().sequence;
        info!(sequence, rotation = %rotation, "Capture started");

        let job = CaptureJob {
            frame,
            rotation,
            timestamp: chrono::Local::now()
                .format(RECORD_TIMESTAMP_FORMAT)
                .to_string(),
            storage: Arc::clone(&self.storage),
            gateway: Arc::clone(&self.gateway),
            permits: Arc::clone(&self.permits),
        };
        let ui = self.ui.clone();
        let last_captured = Arc::clone(&self.last_captured);

        let handle = self.runtime.spawn(async move {
            let outcome = job.run(&state_tx).await;
            match &outcome {
                Ok(record) => {
                    update_last_captured(&last_captured, record);
                    info!(id = record.id, path = %record.storage_path, "Photo indexed");
                    state_tx.send_replace(CaptureState::Done(record.clone()));
                    ui.post(Message::PhotoSaved {
                        id: record.id,
                        path: PathBuf::from(&record.storage_path),
                    });
                    ui.post(Message::Notify(Notification::info(messages::PICTURE_TAKEN)));
                }
                Err(e) => {
                    error!(sequence, error = %e, "Capture failed");
                    state_tx.send_replace(CaptureState::Failed(e.to_string()));
                    ui.post(Message::Notify(Notification::error(
                        messages::PICTURE_SAVE_FAILED,
                    )));
                }
            }
            outcome
        });

        CaptureTask::new(state_rx, handle)
    }
}

/// Keep the highest id so concurrent captures settle on the newest photo
fn update_last_captured(last: &Mutex<Option<ImageRecord>>, record: &ImageRecord) {
    let mut guard = match last.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if guard.as_ref().is_none_or(|current| current.id < record.id) {
        *guard = Some(record.clone());
    }
}
