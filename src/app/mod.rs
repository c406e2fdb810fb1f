// SPDX-License-Identifier: GPL-3.0-only

//! UI side of the application
//!
//! Render state lives in [`AppModel`] and is only mutated by
//! [`AppModel::update`]. Workers (capture, detection, persistence) never
//! touch it; they post [`Message`]s through a [`UiSender`] onto the single
//! UI-owned queue.
//!
//! # Modules
//!
//! - `state`: `AppModel`, `Message`, overlay and notification types
//! - `update`: message dispatch
//! - `handlers`: message handlers grouped by domain
//! - `editor`: filter editing session for one stored image
//! - `frame_processor`: live detection dispatch loop

pub mod editor;
pub mod frame_processor;
mod handlers;
mod state;
mod update;

pub use editor::EditorSession;
pub use state::{
    AppModel, DetectionOverlay, LastImage, Message, Notification, NotificationKind,
};

use tokio::sync::mpsc;
use tracing::debug;

/// Receiving end of the UI queue, owned by whoever drives `AppModel`
pub type UiQueue = mpsc::UnboundedReceiver<Message>;

/// Posts messages onto the UI queue from any thread
///
/// Posting never blocks. Once the UI is gone the message is dropped and
/// logged at debug level.
#[derive(Debug, Clone)]
pub struct UiSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl UiSender {
    /// Returns `false` if the UI queue is closed
    pub fn post(&self, message: Message) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(mpsc::error::SendError(message)) => {
                debug!(message = message.name(), "UI queue closed, dropping message");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create the UI queue
pub fn ui_channel() -> (UiSender, UiQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_after_ui_teardown_is_dropped() {
        let (ui, queue) = ui_channel();
        assert!(ui.post(Message::DetectionsCleared));
        drop(queue);
        assert!(ui.is_closed());
        assert!(!ui.post(Message::DetectionsCleared));
    }
}
