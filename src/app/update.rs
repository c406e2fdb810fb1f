// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! `update()` only routes; the handling code lives in the `handlers`
//! submodules, organized by domain:
//!
//! - `handlers::capture`: last photo, thumbnail, notifications
//! - `handlers::detection`: detection overlay sessions and results
//! - `handlers::editor`: filter editing session

use crate::app::UiQueue;
use crate::app::state::{AppModel, Message};
use tracing::trace;

impl AppModel {
    /// Main message handler, routes messages to handler methods
    pub fn update(&mut self, message: Message) {
        trace!(message = message.name(), "Update");
        match message {
            // ===== Capture =====
            Message::PhotoSaved { id, path } => self.handle_photo_saved(id, path),
            Message::LastImageLoaded(last) => self.handle_last_image_loaded(last),
            Message::ThumbnailLoaded(thumbnail) => self.handle_thumbnail_loaded(thumbnail),

            // ===== Detection =====
            Message::DetectionSessionStarted { session } => {
                self.handle_detection_session_started(session)
            }
            Message::DetectionSessionEnded { session } => {
                self.handle_detection_session_ended(session)
            }
            Message::DetectionsUpdated { session, result } => {
                self.handle_detections_updated(session, result)
            }
            Message::DetectionsCleared => self.handle_detections_cleared(),

            // ===== Editor =====
            Message::OpenEditor(image_id) => self.handle_open_editor(image_id),
            Message::EditorLoaded { request, result } => {
                self.handle_editor_loaded(request, result)
            }
            Message::CloseEditor => self.handle_close_editor(),
            Message::AddFilter(tag) => self.handle_add_filter(tag),
            Message::RemoveFilter(id) => self.handle_remove_filter(id),
            Message::SelectFilter(id) => self.handle_select_filter(id),
            Message::SetFilterControl { key, position } => {
                self.handle_set_filter_control(key, position)
            }
            Message::ResetFilter(id) => self.handle_reset_filter(id),
            Message::RenameFilter { id, name } => self.handle_rename_filter(id, name),
            Message::SaveFilters => self.handle_save_filters(),
            Message::FiltersSaved(result) => self.handle_filters_saved(result),

            // ===== Notifications =====
            Message::Notify(notification) => self.handle_notify(notification),
            Message::DismissNotification => self.handle_dismiss_notification(),
        }
    }

    /// Apply every message already queued; returns how many were handled
    pub fn drain(&mut self, queue: &mut UiQueue) -> usize {
        let mut handled = 0;
        while let Ok(message) = queue.try_recv() {
            self.update(message);
            handled += 1;
        }
        handled
    }

    /// Wait for the next message and apply it
    ///
    /// Returns `false` once every sender is gone.
    pub async fn process_next(&mut self, queue: &mut UiQueue) -> bool {
        match queue.recv().await {
            Some(message) => {
                self.update(message);
                true
            }
            None => false,
        }
    }
}
