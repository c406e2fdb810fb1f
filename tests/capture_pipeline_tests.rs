// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture pipeline

mod common;

use common::{BrokenIndexGateway, FailingStorage, ReleaseCounter, test_frame};
use photostudio::app::{Message, NotificationKind, UiQueue, ui_channel};
use photostudio::backends::camera::Rotation;
use photostudio::constants::{QualityPreset, messages};
use photostudio::persistence::{PersistenceGateway, SqliteStore};
use photostudio::pipelines::photo::{CapturePipeline, CaptureState, EncodingFormat, PhotoEncoder};
use photostudio::storage::{DiskStorage, FrameStorage};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::runtime::Handle;

fn disk_storage(dir: &std::path::Path) -> DiskStorage {
    DiskStorage::new(
        dir.join("photos"),
        PhotoEncoder::new(EncodingFormat::Png, QualityPreset::High),
    )
}

fn drain(queue: &mut UiQueue) -> Vec<Message> {
    let mut messages = Vec::new();
    while let Ok(message) = queue.try_recv() {
        messages.push(message);
    }
    messages
}

fn notifications(messages: &[Message]) -> Vec<(NotificationKind, String)> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Notify(n) => Some((n.kind, n.text.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capture_saves_indexes_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("catalog.db")).unwrap());
    let (ui, mut queue) = ui_channel();
    let pipeline = CapturePipeline::new(
        Arc::new(disk_storage(dir.path())),
        store.clone(),
        ui,
        2,
        Handle::current(),
    );
    let released = Arc::new(ReleaseCounter::default());

    let task = pipeline.capture(released.handle(test_frame(1)), Rotation::Rotate90);
    let mut states = task.subscribe();
    let record = task.wait().await.unwrap();

    assert!(matches!(&*states.borrow_and_update(), CaptureState::Done(r) if r.id == record.id));
    assert_eq!(released.count(), 1);
    assert_eq!(store.get_image(record.id).unwrap(), Some(record.clone()));
    assert_eq!(pipeline.last_captured(), Some(record.clone()));

    let path = std::path::PathBuf::from(&record.storage_path);
    let saved = image::open(&path).unwrap();
    // 16x8 frame rotated by 90 degrees
    assert_eq!((saved.width(), saved.height()), (8, 16));

    let posted = drain(&mut queue);
    assert!(posted.iter().any(
        |m| matches!(m, Message::PhotoSaved { id, path: p } if *id == record.id && *p == path)
    ));
    assert_eq!(
        notifications(&posted),
        vec![(NotificationKind::Info, messages::PICTURE_TAKEN.to_string())]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_captures_get_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("catalog.db")).unwrap());
    let (ui, mut queue) = ui_channel();
    let pipeline = CapturePipeline::new(
        Arc::new(disk_storage(dir.path())),
        store.clone(),
        ui,
        4,
        Handle::current(),
    );
    let released = Arc::new(ReleaseCounter::default());

    let tasks: Vec<_> = (0..8)
        .map(|seq| pipeline.capture(released.handle(test_frame(seq)), Rotation::None))
        .collect();

    let mut ids = HashSet::new();
    let mut paths = HashSet::new();
    for task in tasks {
        let record = task.wait().await.unwrap();
        ids.insert(record.id);
        paths.insert(record.storage_path);
    }

    assert_eq!(ids.len(), 8);
    assert_eq!(paths.len(), 8);
    assert_eq!(released.count(), 8);
    assert_eq!(store.list_images().unwrap().len(), 8);
    assert_eq!(pipeline.last_captured().map(|r| r.id), ids.iter().max().copied());

    let saved = drain(&mut queue)
        .into_iter()
        .filter(|m| matches!(m, Message::PhotoSaved { .. }))
        .count();
    assert_eq!(saved, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_save_failure_releases_frame_and_writes_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let (ui, mut queue) = ui_channel();
    let storage = FailingStorage {
        inner: disk_storage(dir.path()),
        fail_sequences: None,
    };
    let pipeline = CapturePipeline::new(Arc::new(storage), store.clone(), ui, 1, Handle::current());
    let released = Arc::new(ReleaseCounter::default());

    let task = pipeline.capture(released.handle(test_frame(1)), Rotation::None);
    let states = task.subscribe();
    assert!(task.wait().await.is_err());

    assert!(matches!(&*states.borrow(), CaptureState::Failed(_)));
    assert_eq!(released.count(), 1);
    assert!(store.list_images().unwrap().is_empty());
    assert_eq!(pipeline.last_captured(), None);
    assert_eq!(
        notifications(&drain(&mut queue)),
        vec![(NotificationKind::Error, messages::PICTURE_SAVE_FAILED.to_string())]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_index_failure_keeps_file_but_not_last_captured() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(BrokenIndexGateway(SqliteStore::open_in_memory().unwrap()));
    let storage = Arc::new(disk_storage(dir.path()));
    let (ui, mut queue) = ui_channel();
    let pipeline = CapturePipeline::new(storage.clone(), gateway, ui, 1, Handle::current());
    let released = Arc::new(ReleaseCounter::default());

    let task = pipeline.capture(released.handle(test_frame(1)), Rotation::None);
    assert!(task.wait().await.is_err());

    assert_eq!(released.count(), 1);
    assert_eq!(pipeline.last_captured(), None);
    // The written file is left behind on purpose
    let files = std::fs::read_dir(storage.photos_dir()).unwrap().count();
    assert_eq!(files, 1);

    let posted = drain(&mut queue);
    assert!(!posted.iter().any(|m| matches!(m, Message::PhotoSaved { .. })));
    assert_eq!(
        notifications(&posted),
        vec![(NotificationKind::Error, messages::PICTURE_SAVE_FAILED.to_string())]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_failed_capture_does_not_affect_others() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let storage = FailingStorage {
        inner: disk_storage(dir.path()),
        fail_sequences: Some(vec![2]),
    };
    let (ui, _queue) = ui_channel();
    let pipeline = CapturePipeline::new(Arc::new(storage), store.clone(), ui, 3, Handle::current());
    let released = Arc::new(ReleaseCounter::default());

    let tasks: Vec<_> = (1..=3)
        .map(|seq| pipeline.capture(released.handle(test_frame(seq)), Rotation::None))
        .collect();
    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.wait().await.is_ok());
    }

    assert_eq!(outcomes, vec![true, false, true]);
    assert_eq!(released.count(), 3);
    assert_eq!(store.list_images().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_capture_after_ui_teardown_still_stores() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let (ui, queue) = ui_channel();
    drop(queue);
    let storage: Arc<dyn FrameStorage> = Arc::new(disk_storage(dir.path()));
    let pipeline = CapturePipeline::new(storage, store.clone(), ui, 1, Handle::current());

    let record = pipeline
        .capture(photostudio::backends::camera::FrameHandle::unmanaged(test_frame(1)), Rotation::None)
        .wait()
        .await
        .unwrap();
    assert_eq!(store.get_image(record.id).unwrap(), Some(record));
}
