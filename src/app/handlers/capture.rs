// SPDX-License-Identifier: GPL-3.0-only

//! Capture handlers
//!
//! Last-photo tracking, thumbnail refresh and notifications.

use crate::app::state::{AppModel, LastImage, Message, Notification, NotificationKind};
use crate::storage::Thumbnail;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Oldest notifications are dropped beyond this many
const MAX_NOTIFICATIONS: usize = 8;

impl AppModel {
    /// Look up the newest stored photo so the thumbnail shows on startup
    pub fn load_last_image(&self) {
        let gateway = self.gateway.clone();
        self.perform(async move {
            let latest = tokio::task::spawn_blocking(move || gateway.list_images())
                .await
                .map_err(|e| e.to_string())
                .and_then(|r| r.map_err(|e| e.to_string()));
            match latest {
                Ok(images) => Message::LastImageLoaded(images.into_iter().next().map(|r| {
                    LastImage {
                        id: r.id,
                        path: PathBuf::from(r.storage_path),
                    }
                })),
                Err(e) => {
                    warn!(error = %e, "Failed to look up last image");
                    Message::LastImageLoaded(None)
                }
            }
        });
    }

    pub(crate) fn handle_photo_saved(&mut self, id: i64, path: PathBuf) {
        info!(id, path = %path.display(), "Photo saved");
        self.set_last_image(LastImage { id, path });
    }

    pub(crate) fn handle_last_image_loaded(&mut self, last: Option<LastImage>) {
        // A capture that finished first is newer
        if self.last_image.is_some() {
            return;
        }
        if let Some(last) = last {
            self.set_last_image(last);
        }
    }

    fn set_last_image(&mut self, last: LastImage) {
        let path = last.path.clone();
        self.last_image = Some(last);
        self.perform(async move {
            Message::ThumbnailLoaded(crate::storage::load_thumbnail(path).await)
        });
    }

    pub(crate) fn handle_thumbnail_loaded(&mut self, thumbnail: Option<Thumbnail>) {
        let Some(thumbnail) = thumbnail else {
            return;
        };
        let current = self.last_image.as_ref().map(|l| &l.path);
        if current != Some(&thumbnail.path) {
            debug!(path = %thumbnail.path.display(), "Ignoring thumbnail of an older photo");
            return;
        }
        self.thumbnail = Some(thumbnail);
    }

    pub(crate) fn handle_notify(&mut self, notification: Notification) {
        match notification.kind {
            NotificationKind::Info => info!(text = %notification.text, "Notification"),
            NotificationKind::Error => warn!(text = %notification.text, "Error notification"),
        }
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    pub(crate) fn handle_dismiss_notification(&mut self) {
        if !self.notifications.is_empty() {
            self.notifications.remove(0);
        }
    }
}
