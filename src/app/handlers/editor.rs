// SPDX-License-Identifier: GPL-3.0-only

//! Filter editor handlers

use crate::app::editor::EditorSession;
use crate::app::state::{AppModel, Message, Notification};
use crate::constants::messages;
use crate::filter::{Filter, FilterId, FilterTag};
use tracing::{debug, error, info, warn};

impl AppModel {
    pub(crate) fn handle_open_editor(&mut self, image_id: Option<i64>) {
        self.editor_request += 1;
        let request = self.editor_request;

        let Some(image_id) = image_id.or(self.last_image.as_ref().map(|l| l.id)) else {
            self.handle_notify(Notification::info(messages::TAKE_PICTURE_FIRST));
            return;
        };

        let gateway = self.gateway.clone();
        self.perform(async move {
            let loaded = tokio::task::spawn_blocking(move || {
                EditorSession::load(gateway.as_ref(), image_id)
            })
            .await;
            let result = match loaded {
                Ok(Ok(session)) => Ok(Box::new(session)),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            Message::EditorLoaded { request, result }
        });
    }

    pub(crate) fn handle_editor_loaded(
        &mut self,
        request: u64,
        result: Result<Box<EditorSession>, String>,
    ) {
        if request != self.editor_request {
            debug!(
                request,
                current = self.editor_request,
                "Dropping editor load for a superseded request"
            );
            return;
        }

        match result {
            Ok(session) => {
                info!(image_id = session.image().id, "Editor ready");
                self.editor_changes = Some(session.stack().subscribe());
                self.editor = Some(*session);
            }
            Err(e) => {
                error!(error = %e, "Failed to open editor");
                self.handle_notify(Notification::error(messages::IMAGE_LOAD_FAILED));
            }
        }
    }

    pub(crate) fn handle_close_editor(&mut self) {
        self.editor_request += 1;
        self.editor = None;
        self.editor_changes = None;
    }

    pub(crate) fn handle_add_filter(&mut self, tag: FilterTag) {
        let Some(editor) = self.editor.as_mut() else {
            warn!(%tag, "No editor open, ignoring add filter");
            return;
        };
        editor.stack_mut().add(Filter::new(tag.default_kind()), true);
    }

    pub(crate) fn handle_remove_filter(&mut self, id: FilterId) {
        if let Some(editor) = self.editor.as_mut() {
            // Unknown ids are logged by the stack
            let _ = editor.stack_mut().remove(id);
        }
    }

    pub(crate) fn handle_select_filter(&mut self, id: Option<FilterId>) {
        if let Some(editor) = self.editor.as_mut() {
            let _ = editor.stack_mut().select(id);
        }
    }

    pub(crate) fn handle_set_filter_control(&mut self, key: &str, position: u8) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let stack = editor.stack_mut();
        let Some(id) = stack.selected() else {
            warn!(key, "No filter selected, ignoring control change");
            return;
        };
        let Some(control) = stack
            .selected_controls()
            .and_then(|controls| controls.into_iter().find(|c| c.key == key))
        else {
            warn!(key, "Selected filter has no such control");
            return;
        };
        let _ = stack.set_control(id, key, control.value_at(position));
    }

    pub(crate) fn handle_reset_filter(&mut self, id: FilterId) {
        if let Some(editor) = self.editor.as_mut() {
            let _ = editor.stack_mut().reset(id);
        }
    }

    pub(crate) fn handle_rename_filter(&mut self, id: FilterId, name: String) {
        if let Some(editor) = self.editor.as_mut() {
            let _ = editor.stack_mut().rename(id, name);
        }
    }

    pub(crate) fn handle_save_filters(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let image_id = editor.image().id;
        let records = match editor.records() {
            Ok(records) => records,
            Err(e) => {
                self.handle_filters_saved(Err(e.to_string()));
                return;
            }
        };
        let gateway = self.gateway.clone();
        self.saving_filters = true;

        self.perform(async move {
            let saved = tokio::task::spawn_blocking(move || {
                gateway.replace_filter_records(image_id, &records)
            })
            .await;
            Message::FiltersSaved(match saved {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(e.to_string()),
            })
        });
    }

    pub(crate) fn handle_filters_saved(&mut self, result: Result<(), String>) {
        self.saving_filters = false;
        match result {
            Ok(()) => self.handle_notify(Notification::info(messages::FILTERS_SAVED)),
            Err(e) => {
                error!(error = %e, "Failed to save filters");
                self.handle_notify(Notification::error(messages::FILTERS_SAVE_FAILED));
            }
        }
    }
}
