// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the UI-side model

mod common;

use common::test_frame;
use photostudio::app::frame_processor::{Detection, DetectionResult, FrameRegion};
use photostudio::app::{AppModel, Message, NotificationKind, UiQueue, UiSender, ui_channel};
use photostudio::backends::camera::{FrameHandle, Rotation};
use photostudio::config::Config;
use photostudio::constants::{TRANSFORM_EPSILON, THUMBNAIL_SIZE, messages};
use photostudio::filter::{ColorMatrix, FilterTag};
use photostudio::persistence::{PersistenceGateway, SqliteStore};
use photostudio::pipelines::photo::CapturePipeline;
use photostudio::storage::DiskStorage;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

struct Fixture {
    _dir: tempfile::TempDir,
    store: Arc<SqliteStore>,
    storage: Arc<DiskStorage>,
    ui: UiSender,
    queue: UiQueue,
    model: AppModel,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("catalog.db")).unwrap());
    let storage = Arc::new(DiskStorage::new(dir.path().join("photos"), Default::default()));
    let (ui, queue) = ui_channel();
    let model = AppModel::new(
        Config::default(),
        store.clone(),
        storage.clone(),
        ui.clone(),
        Handle::current(),
    );
    Fixture {
        _dir: dir,
        store,
        storage,
        ui,
        queue,
        model,
    }
}

impl Fixture {
    /// Process one queued message, waiting up to two seconds for it
    async fn step(&mut self) -> bool {
        tokio::time::timeout(Duration::from_secs(2), self.model.process_next(&mut self.queue))
            .await
            .unwrap_or(false)
    }

    async fn capture(&mut self) -> i64 {
        let pipeline = CapturePipeline::new(
            self.storage.clone(),
            self.store.clone(),
            self.ui.clone(),
            1,
            Handle::current(),
        );
        let record = pipeline
            .capture(FrameHandle::unmanaged(test_frame(1)), Rotation::None)
            .wait()
            .await
            .unwrap();
        record.id
    }
}

fn result(sequence: u64) -> DetectionResult {
    DetectionResult {
        boxes: vec![Detection::new("person", 0.8, FrameRegion::from_pixels(0, 0, 5, 5, 10, 10))],
        sequence,
        inference_time: Duration::from_millis(12),
        image_width: 10,
        image_height: 10,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overlay_keeps_latest_result_of_active_session() {
    let mut f = fixture();
    f.model.update(Message::DetectionSessionStarted { session: 2 });

    f.model.update(Message::DetectionsUpdated { session: 2, result: result(5) });
    assert_eq!(f.model.detection.result().map(|r| r.sequence), Some(5));

    // Older frame of the same session
    f.model.update(Message::DetectionsUpdated { session: 2, result: result(3) });
    assert_eq!(f.model.detection.result().map(|r| r.sequence), Some(5));

    // Stale session
    f.model.update(Message::DetectionsUpdated { session: 1, result: result(9) });
    assert_eq!(f.model.detection.result().map(|r| r.sequence), Some(5));
    assert_eq!(f.model.detection.detections().len(), 1);

    f.model.update(Message::DetectionsCleared);
    assert!(f.model.detection.detections().is_empty());

    f.model.update(Message::DetectionSessionEnded { session: 2 });
    f.model.update(Message::DetectionsUpdated { session: 2, result: result(10) });
    assert!(f.model.detection.result().is_none());
    assert_eq!(f.model.detection.session(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_photo_saved_loads_thumbnail() {
    let mut f = fixture();
    let id = f.capture().await;

    // PhotoSaved, then the notification
    assert!(f.step().await);
    assert_eq!(f.model.last_image.as_ref().map(|l| l.id), Some(id));
    assert!(f.step().await);
    assert_eq!(f.model.notifications.last().map(|n| n.text.as_str()), Some(messages::PICTURE_TAKEN));

    // Thumbnail arrives from the background load
    assert!(f.step().await);
    let thumbnail = f.model.thumbnail.as_ref().unwrap();
    assert_eq!((thumbnail.width, thumbnail.height), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_last_image_restored_on_startup() {
    let mut f = fixture();
    let id = f.capture().await;
    while f.queue.try_recv().is_ok() {}

    f.model.load_last_image();
    assert!(f.step().await);
    assert_eq!(f.model.last_image.as_ref().map(|l| l.id), Some(id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_editor_without_photo_asks_for_one() {
    let mut f = fixture();
    f.model.update(Message::OpenEditor(None));
    let last = f.model.notifications.last().unwrap();
    assert_eq!(last.text, messages::TAKE_PICTURE_FIRST);
    assert!(f.model.editor.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_editor_missing_image_notifies() {
    let mut f = fixture();
    f.model.update(Message::OpenEditor(Some(404)));
    assert!(f.step().await);
    assert!(f.model.editor.is_none());
    let last = f.model.notifications.last().unwrap();
    assert_eq!(last.kind, NotificationKind::Error);
    assert_eq!(last.text, messages::IMAGE_LOAD_FAILED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_edit_and_save_filters() {
    let mut f = fixture();
    let id = f.capture().await;
    while f.queue.try_recv().is_ok() {}

    f.model.update(Message::OpenEditor(Some(id)));
    assert!(f.step().await);
    assert!(f.model.editor.is_some());
    assert!(f.model.preview_transform().is_identity(TRANSFORM_EPSILON));

    f.model.update(Message::AddFilter(FilterTag::Saturation));
    f.model.update(Message::SetFilterControl { key: "saturation", position: 0 });
    assert!(f.model.preview_transform().approx_eq(&ColorMatrix::saturation(0.0), TRANSFORM_EPSILON));

    f.model.update(Message::SaveFilters);
    assert!(f.model.saving_filters);
    assert!(f.step().await);
    assert!(!f.model.saving_filters);
    assert_eq!(
        f.model.notifications.last().map(|n| n.text.as_str()),
        Some(messages::FILTERS_SAVED)
    );

    let records = f.store.get_filter_records(id).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].type_tag, "saturation");
    assert_eq!(records[0].name, "Saturation 1");

    f.model.update(Message::CloseEditor);
    assert!(f.model.preview_transform().is_identity(TRANSFORM_EPSILON));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_closed_editor_stays_closed_after_late_load() {
    let mut f = fixture();
    let id = f.capture().await;
    while f.queue.try_recv().is_ok() {}

    f.model.update(Message::OpenEditor(Some(id)));
    f.model.update(Message::CloseEditor);
    assert!(f.step().await);

    assert!(f.model.editor.is_none());
    assert!(f.model.preview_transform().is_identity(TRANSFORM_EPSILON));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_last_requested_editor_wins() {
    let mut f = fixture();
    let first = f.store.insert_image("2024-05-01 12:00:00", "/photos/a.jpg").unwrap();
    let second = f.store.insert_image("2024-05-01 12:00:01", "/photos/b.jpg").unwrap();

    f.model.update(Message::OpenEditor(Some(second.id)));
    f.model.update(Message::OpenEditor(Some(first.id)));
    assert!(f.step().await);
    assert!(f.step().await);

    let editor = f.model.editor.as_ref().unwrap();
    assert_eq!(editor.image().id, first.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_notifications_are_bounded_and_dismissable() {
    let mut f = fixture();
    for i in 0..20 {
        f.model.update(Message::Notify(photostudio::app::Notification::info(format!("n{i}"))));
    }
    assert!(f.model.notifications.len() < 20);
    assert_eq!(f.model.notifications.last().unwrap().text, "n19");

    let before = f.model.notifications.len();
    f.model.update(Message::DismissNotification);
    assert_eq!(f.model.notifications.len(), before - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_drain_applies_posted_messages_in_order() {
    let mut f = fixture();
    f.ui.post(Message::DetectionSessionStarted { session: 1 });
    f.ui.post(Message::DetectionsUpdated { session: 1, result: result(1) });
    f.ui.post(Message::DetectionsUpdated { session: 1, result: result(2) });

    assert_eq!(f.model.drain(&mut f.queue), 3);
    assert_eq!(f.model.detection.result().map(|r| r.sequence), Some(2));
    assert_eq!(f.model.drain(&mut f.queue), 0);
}
