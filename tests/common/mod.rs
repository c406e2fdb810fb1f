// SPDX-License-Identifier: GPL-3.0-only

//! Test doubles shared by the integration tests

#![allow(dead_code)]

use image::DynamicImage;
use photostudio::app::frame_processor::{Detection, FrameRegion};
use photostudio::backends::camera::{CameraFrame, CameraSource, FrameHandle, Rotation};
use photostudio::backends::detector::ObjectDetector;
use photostudio::errors::{InferenceError, PersistenceError, StorageError};
use photostudio::persistence::{ImageRecord, PersistedFilterRecord, PersistenceGateway, SqliteStore};
use photostudio::storage::FrameStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Small gradient frame
pub fn test_frame(sequence: u64) -> CameraFrame {
    let (width, height) = (16, 8);
    let data = (0..width * height)
        .flat_map(|i| [(i * 2) as u8, 128, 255 - i as u8, 255])
        .collect();
    CameraFrame::from_rgba(width, height, data, sequence)
}

/// Counts how many times frames were handed back to the camera
#[derive(Default)]
pub struct ReleaseCounter(AtomicUsize);

impl ReleaseCounter {
    pub fn handle(self: &Arc<Self>, frame: CameraFrame) -> FrameHandle {
        let counter = Arc::clone(self);
        FrameHandle::new(frame, move || {
            counter.0.fetch_add(1, Ordering::SeqCst);
        })
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Camera that only counts frame requests
#[derive(Default)]
pub struct CountingCamera {
    requests: AtomicUsize,
}

impl CountingCamera {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl CameraSource for CountingCamera {
    fn request_next_preview_frame(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

pub enum DetectorBehavior {
    Succeed,
    Fail,
    Panic,
}

/// Detector that sleeps, tracks concurrency and returns one box
pub struct SlowDetector {
    delay: Duration,
    behavior: DetectorBehavior,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowDetector {
    pub fn new(delay: Duration, behavior: DetectorBehavior) -> Self {
        Self {
            delay,
            behavior,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ObjectDetector for SlowDetector {
    fn detect(
        &self,
        frame: &CameraFrame,
        _rotation_degrees: u32,
    ) -> Result<Vec<Detection>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.behavior {
            DetectorBehavior::Succeed => Ok(vec![Detection::new(
                "cup",
                0.9,
                FrameRegion::from_pixels(0, 0, frame.width / 2, frame.height / 2, frame.width, frame.height),
            )]),
            DetectorBehavior::Fail => Err(InferenceError::DetectionFailed("model not loaded".into())),
            DetectorBehavior::Panic => panic!("detector crashed"),
        }
    }
}

/// Storage that refuses every write, or only frames with given sequences
pub struct FailingStorage<S> {
    pub inner: S,
    pub fail_sequences: Option<Vec<u64>>,
}

impl<S: FrameStorage> FrameStorage for FailingStorage<S> {
    fn save_frame(&self, frame: &CameraFrame, rotation: Rotation) -> Result<PathBuf, StorageError> {
        let fails = self
            .fail_sequences
            .as_ref()
            .is_none_or(|seqs| seqs.contains(&frame.sequence));
        if fails {
            return Err(StorageError::SaveFailed("disk full".into()));
        }
        self.inner.save_frame(frame, rotation)
    }

    fn load_image(&self, path: &Path) -> Result<Option<DynamicImage>, StorageError> {
        self.inner.load_image(path)
    }
}

/// Gateway whose image inserts always fail
pub struct BrokenIndexGateway(pub SqliteStore);

impl PersistenceGateway for BrokenIndexGateway {
    fn next_image_id(&self) -> Result<i64, PersistenceError> {
        self.0.next_image_id()
    }

    fn insert_image(&self, _timestamp: &str, _path: &str) -> Result<ImageRecord, PersistenceError> {
        Err(PersistenceError::Unavailable("database is locked".into()))
    }

    fn upsert_image(&self, record: &ImageRecord) -> Result<(), PersistenceError> {
        self.0.upsert_image(record)
    }

    fn get_image(&self, id: i64) -> Result<Option<ImageRecord>, PersistenceError> {
        self.0.get_image(id)
    }

    fn list_images(&self) -> Result<Vec<ImageRecord>, PersistenceError> {
        self.0.list_images()
    }

    fn delete_image(&self, id: i64) -> Result<bool, PersistenceError> {
        self.0.delete_image(id)
    }

    fn delete_filter_records(&self, owner_image_id: i64) -> Result<usize, PersistenceError> {
        self.0.delete_filter_records(owner_image_id)
    }

    fn insert_filter_record(&self, record: &PersistedFilterRecord) -> Result<(), PersistenceError> {
        self.0.insert_filter_record(record)
    }

    fn get_filter_records(
        &self,
        owner_image_id: i64,
    ) -> Result<Vec<PersistedFilterRecord>, PersistenceError> {
        self.0.get_filter_records(owner_image_id)
    }
}

/// Poll `condition` until it holds or two seconds pass
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
