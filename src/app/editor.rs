// SPDX-License-Identifier: GPL-3.0-only

//! Filter editing session for one stored image
//!
//! Loading and saving are blocking store calls; the UI runs them through
//! `spawn_blocking`, the CLI calls them directly.

use crate::constants::QualityPreset;
use crate::errors::{AppError, AppResult, PersistenceError, StorageError};
use crate::filter::codec::{self, PersistedFilterRecord};
use crate::filter::FilterStack;
use crate::persistence::{ImageRecord, PersistenceGateway};
use crate::pipelines::photo::PostProcessor;
use crate::storage::{self, FrameStorage};
use image::RgbaImage;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub struct EditorSession {
    image: ImageRecord,
    stack: FilterStack,
}

impl EditorSession {
    /// Load an image record and its persisted filter stack
    pub fn load(gateway: &dyn PersistenceGateway, image_id: i64) -> AppResult<Self> {
        let image = gateway
            .get_image(image_id)?
            .ok_or(AppError::ImageNotFound(image_id))?;
        let filters = codec::decode_all(gateway, image_id)?;
        info!(image_id, filters = filters.len(), "Editor session opened");
        Ok(Self {
            image,
            stack: FilterStack::from_filters(filters),
        })
    }

    pub fn image(&self) -> &ImageRecord {
        &self.image
    }

    pub fn stack(&self) -> &FilterStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut FilterStack {
        &mut self.stack
    }

    /// The stack as it would be persisted right now
    pub fn records(&self) -> Result<Vec<PersistedFilterRecord>, PersistenceError> {
        self.stack
            .filters()
            .map(|f| codec::encode(f, self.image.id))
            .collect()
    }

    /// Replace the stored stack with the current one
    pub fn save(&self, gateway: &dyn PersistenceGateway) -> Result<(), PersistenceError> {
        codec::save_all(gateway, self.image.id, self.stack.filters())?;
        info!(image_id = self.image.id, filters = self.stack.len(), "Filters saved");
        Ok(())
    }

    /// Decode the original photo and apply the composite transform
    pub fn render(&self, storage: &dyn FrameStorage) -> AppResult<RgbaImage> {
        let path = Path::new(&self.image.storage_path);
        let decoded = storage.load_image(path)?.ok_or_else(|| {
            StorageError::LoadFailed(format!("{} no longer exists", path.display()))
        })?;
        let mut image = decoded.to_rgba8();
        PostProcessor::new(self.stack.current_transform()).apply(&mut image);
        Ok(image)
    }

    /// Render and write to `output`, format chosen by its extension
    pub fn export(
        &self,
        storage: &dyn FrameStorage,
        output: &Path,
        quality: QualityPreset,
    ) -> AppResult<()> {
        let image = self.render(storage)?;
        storage::export_image(&image, output, quality)?;
        Ok(())
    }
}
