// SPDX-License-Identifier: GPL-3.0-only

//! Application state types

use super::UiSender;
use super::editor::EditorSession;
use super::frame_processor::{Detection, DetectionResult};
use crate::config::Config;
use crate::filter::{ColorMatrix, FilterId, FilterTag, StackChange};
use crate::persistence::PersistenceGateway;
use crate::storage::{FrameStorage, Thumbnail};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::trace;

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// Short message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }
}

/// The most recent photo, shown next to the shutter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastImage {
    pub id: i64,
    pub path: PathBuf,
}

/// Render state of the detection overlay
///
/// Only results from the active session are shown, and a result never
/// replaces a newer one.
#[derive(Debug, Default)]
pub struct DetectionOverlay {
    session: Option<u64>,
    last_sequence: Option<u64>,
    result: Option<DetectionResult>,
    updated_at: Option<Instant>,
}

impl DetectionOverlay {
    pub(crate) fn begin(&mut self, session: u64) {
        self.session = Some(session);
        self.last_sequence = None;
        self.clear();
    }

    pub(crate) fn end(&mut self, session: u64) {
        if self.session == Some(session) {
            self.session = None;
            self.clear();
        }
    }

    /// Apply a posted result; returns whether it was shown
    pub(crate) fn apply(&mut self, session: u64, result: DetectionResult) -> bool {
        if self.session != Some(session) {
            trace!(session, active = ?self.session, "Ignoring result from inactive session");
            return false;
        }
        if self.last_sequence.is_some_and(|last| result.sequence <= last) {
            trace!(sequence = result.sequence, "Ignoring out-of-order detection result");
            return false;
        }
        self.last_sequence = Some(result.sequence);
        self.result = Some(result);
        self.updated_at = Some(Instant::now());
        true
    }

    pub(crate) fn clear(&mut self) {
        self.result = None;
    }

    pub fn session(&self) -> Option<u64> {
        self.session
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.result.as_ref()
    }

    /// Boxes currently drawn
    pub fn detections(&self) -> &[Detection] {
        self.result
            .as_ref()
            .map(|r| r.boxes.as_slice())
            .unwrap_or_default()
    }

    pub fn updated_at(&self) -> Option<Instant> {
        self.updated_at
    }
}

/// Messages processed by [`AppModel::update`]
#[derive(Debug)]
pub enum Message {
    // ===== Capture =====
    /// A capture finished saving and indexing
    PhotoSaved { id: i64, path: PathBuf },
    /// Newest catalog entry found at startup
    LastImageLoaded(Option<LastImage>),
    /// Thumbnail of the last photo decoded
    ThumbnailLoaded(Option<Thumbnail>),

    // ===== Detection =====
    DetectionSessionStarted { session: u64 },
    DetectionSessionEnded { session: u64 },
    DetectionsUpdated { session: u64, result: DetectionResult },
    DetectionsCleared,

    // ===== Editor =====
    /// Open an image for editing; `None` means the last captured photo
    OpenEditor(Option<i64>),
    /// Load finished; `request` is the generation of the open it answers
    EditorLoaded {
        request: u64,
        result: Result<Box<EditorSession>, String>,
    },
    CloseEditor,
    AddFilter(FilterTag),
    RemoveFilter(FilterId),
    SelectFilter(Option<FilterId>),
    /// Slider moved for a control of the selected filter
    SetFilterControl { key: &'static str, position: u8 },
    ResetFilter(FilterId),
    RenameFilter { id: FilterId, name: String },
    SaveFilters,
    FiltersSaved(Result<(), String>),

    // ===== Notifications =====
    Notify(Notification),
    DismissNotification,
}

impl Message {
    /// Variant name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Message::PhotoSaved { .. } => "PhotoSaved",
            Message::LastImageLoaded(_) => "LastImageLoaded",
            Message::ThumbnailLoaded(_) => "ThumbnailLoaded",
            Message::DetectionSessionStarted { .. } => "DetectionSessionStarted",
            Message::DetectionSessionEnded { .. } => "DetectionSessionEnded",
            Message::DetectionsUpdated { .. } => "DetectionsUpdated",
            Message::DetectionsCleared => "DetectionsCleared",
            Message::OpenEditor(_) => "OpenEditor",
            Message::EditorLoaded { .. } => "EditorLoaded",
            Message::CloseEditor => "CloseEditor",
            Message::AddFilter(_) => "AddFilter",
            Message::RemoveFilter(_) => "RemoveFilter",
            Message::SelectFilter(_) => "SelectFilter",
            Message::SetFilterControl { .. } => "SetFilterControl",
            Message::ResetFilter(_) => "ResetFilter",
            Message::RenameFilter { .. } => "RenameFilter",
            Message::SaveFilters => "SaveFilters",
            Message::FiltersSaved(_) => "FiltersSaved",
            Message::Notify(_) => "Notify",
            Message::DismissNotification => "DismissNotification",
        }
    }
}

/// UI-side application state
pub struct AppModel {
    pub config: Config,
    pub(crate) ui: UiSender,
    pub(crate) gateway: Arc<dyn PersistenceGateway>,
    pub(crate) storage: Arc<dyn FrameStorage>,
    pub(crate) runtime: Handle,
    /// Live detection overlay
    pub detection: DetectionOverlay,
    pub last_image: Option<LastImage>,
    pub thumbnail: Option<Thumbnail>,
    /// Pending notifications, oldest first
    pub notifications: Vec<Notification>,
    /// Open editing session, if any
    pub editor: Option<EditorSession>,
    pub(crate) editor_changes: Option<watch::Receiver<StackChange>>,
    /// Bumped on every open and close; loads for older values are stale
    pub(crate) editor_request: u64,
    /// A filter save is running
    pub saving_filters: bool,
}

impl AppModel {
    pub fn new(
        config: Config,
        gateway: Arc<dyn PersistenceGateway>,
        storage: Arc<dyn FrameStorage>,
        ui: UiSender,
        runtime: Handle,
    ) -> Self {
        Self {
            config,
            ui,
            gateway,
            storage,
            runtime,
            detection: DetectionOverlay::default(),
            last_image: None,
            thumbnail: None,
            notifications: Vec::new(),
            editor: None,
            editor_changes: None,
            editor_request: 0,
            saving_filters: false,
        }
    }

    /// Composite the editor preview should render with
    pub fn preview_transform(&self) -> ColorMatrix {
        self.editor_changes
            .as_ref()
            .map(|rx| rx.borrow().transform)
            .unwrap_or_default()
    }

    /// Run `future` off the UI and post its message back
    pub(crate) fn perform<F>(&self, future: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let ui = self.ui.clone();
        self.runtime.spawn(async move {
            ui.post(future.await);
        });
    }
}
