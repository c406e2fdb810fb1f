// SPDX-License-Identifier: GPL-3.0-only

//! Photo files on disk
//!
//! [`FrameStorage`] is the blocking I/O seam used by the capture pipeline.
//! [`DiskStorage`] writes encoded photos into one directory with unique,
//! timestamped names.

use crate::backends::camera::{CameraFrame, Rotation};
use crate::constants::{FILENAME_TIMESTAMP_FORMAT, PHOTO_FILE_PREFIX, THUMBNAIL_SIZE};
use crate::errors::StorageError;
use crate::pipelines::photo::{EncodingFormat, PhotoEncoder};
use image::{DynamicImage, RgbaImage, imageops};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Blocking photo storage
pub trait FrameStorage: Send + Sync {
    /// Encode and write `frame`, rotated clockwise by `rotation`
    ///
    /// On failure no file is left behind.
    fn save_frame(&self, frame: &CameraFrame, rotation: Rotation) -> Result<PathBuf, StorageError>;

    /// Decode a stored photo; `Ok(None)` if the file does not exist
    fn load_image(&self, path: &Path) -> Result<Option<DynamicImage>, StorageError>;
}

/// Stores photos as JPEG/PNG files in a directory
#[derive(Debug, Clone)]
pub struct DiskStorage {
    photos_dir: PathBuf,
    encoder: PhotoEncoder,
}

impl DiskStorage {
    pub fn new(photos_dir: impl Into<PathBuf>, encoder: PhotoEncoder) -> Self {
        Self {
            photos_dir: photos_dir.into(),
            encoder,
        }
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// `IMG_<YYYYmmdd_HHMMSS>_<suffix>.<ext>`
    ///
    /// The random suffix keeps captures within the same second apart.
    fn unique_path(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format(FILENAME_TIMESTAMP_FORMAT);
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let filename = format!(
            "{}_{}_{}.{}",
            PHOTO_FILE_PREFIX,
            timestamp,
            &suffix[..8],
            self.encoder.format().extension()
        );
        self.photos_dir.join(filename)
    }
}

impl FrameStorage for DiskStorage {
    fn save_frame(&self, frame: &CameraFrame, rotation: Rotation) -> Result<PathBuf, StorageError> {
        let image = frame_to_image(frame, rotation)?;
        let data = self.encoder.encode(&image)?;

        std::fs::create_dir_all(&self.photos_dir)?;
        let path = self.unique_path();
        write_or_remove(&path, &data)?;

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            rotation = %rotation,
            "Photo saved"
        );
        Ok(path)
    }

    fn load_image(&self, path: &Path) -> Result<Option<DynamicImage>, StorageError> {
        load_image_file(path)
    }
}

/// Write `data` to `path`, deleting whatever was written if the write fails
fn write_or_remove(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Err(e) = std::fs::write(path, data) {
        if path.exists() {
            if let Err(remove_err) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %remove_err, "Failed to remove partial photo");
            }
        }
        return Err(StorageError::SaveFailed(format!("{}: {e}", path.display())));
    }
    Ok(())
}

/// Decode an image file; a missing file is `Ok(None)`
pub fn load_image_file(path: &Path) -> Result<Option<DynamicImage>, StorageError> {
    if !path.exists() {
        debug!(path = %path.display(), "Image file missing");
        return Ok(None);
    }
    image::open(path)
        .map(Some)
        .map_err(|e| StorageError::LoadFailed(format!("{}: {e}", path.display())))
}

/// Copy a frame into an owned image and apply the capture rotation
pub fn frame_to_image(frame: &CameraFrame, rotation: Rotation) -> Result<RgbaImage, StorageError> {
    if !frame.is_valid() {
        return Err(StorageError::InvalidFrame(format!(
            "{}x{} frame with stride {} and {} bytes",
            frame.width,
            frame.height,
            frame.stride,
            frame.data.len()
        )));
    }

    let image = RgbaImage::from_raw(frame.width, frame.height, frame.to_packed_rgba())
        .ok_or_else(|| StorageError::InvalidFrame("pixel data does not match dimensions".into()))?;

    Ok(match rotation {
        Rotation::None => image,
        Rotation::Rotate90 => imageops::rotate90(&image),
        Rotation::Rotate180 => imageops::rotate180(&image),
        Rotation::Rotate270 => imageops::rotate270(&image),
    })
}

/// Turn a decoded file back into a frame (CLI capture, tests)
pub fn image_to_frame(image: &DynamicImage, sequence: u64) -> CameraFrame {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    CameraFrame::from_rgba(width, height, rgba.into_raw(), sequence)
}

/// Encode `image` by the extension of `path` and write it
pub fn export_image(
    image: &RgbaImage,
    path: &Path,
    quality: crate::constants::QualityPreset,
) -> Result<(), StorageError> {
    let format = EncodingFormat::from_path(path).ok_or_else(|| {
        StorageError::EncodingFailed(format!(
            "unsupported export format: {} (use .jpg or .png)",
            path.display()
        ))
    })?;
    let data = PhotoEncoder::new(format, quality).encode(image)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_or_remove(path, &data)?;
    info!(path = %path.display(), "Image exported");
    Ok(())
}

/// Small square preview of the last captured photo
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub path: PathBuf,
    /// RGBA pixels, `width * height * 4` bytes
    pub rgba: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

/// Load a centre-cropped thumbnail of `path`
///
/// Decoding runs on a blocking thread. Any failure yields `None`; the caller
/// just keeps showing the previous thumbnail.
pub async fn load_thumbnail(path: PathBuf) -> Option<Thumbnail> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| warn!(path = %path.display(), error = %e, "Failed to read photo for thumbnail"))
        .ok()?;

    let (rgba, width, height) = tokio::task::spawn_blocking(move || {
        let img = image::load_from_memory(&bytes).ok()?;
        let thumb = img
            .resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, imageops::FilterType::Triangle)
            .to_rgba8();
        let (width, height) = thumb.dimensions();
        Some((thumb.into_raw(), width, height))
    })
    .await
    .ok()??;

    debug!(path = %path.display(), width, height, "Thumbnail loaded");
    Some(Thumbnail {
        path,
        rgba: Arc::new(rgba),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::QualityPreset;

    fn frame(width: u32, height: u32) -> CameraFrame {
        let data = (0..width * height)
            .flat_map(|i| [(i % 256) as u8, 0, 0, 255])
            .collect();
        CameraFrame::from_rgba(width, height, data, 0)
    }

    #[test]
    fn test_save_frame_names_and_rotates() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(
            dir.path(),
            PhotoEncoder::new(EncodingFormat::Png, QualityPreset::High),
        );

        let path = storage.save_frame(&frame(4, 2), Rotation::Rotate90).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("IMG_"), "{name}");
        assert!(name.ends_with(".png"), "{name}");
        // IMG_ + 8 date + _ + 6 time + _ + 8 suffix + .png
        assert_eq!(name.len(), 4 + 8 + 1 + 6 + 1 + 8 + 4);

        let loaded = storage.load_image(&path).unwrap().unwrap();
        assert_eq!((loaded.width(), loaded.height()), (2, 4));
    }

    #[test]
    fn test_saves_in_same_second_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path(), PhotoEncoder::default());
        let a = storage.save_frame(&frame(2, 2), Rotation::None).unwrap();
        let b = storage.save_frame(&frame(2, 2), Rotation::None).unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
    }

    #[test]
    fn test_invalid_frame_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path(), PhotoEncoder::default());
        let bad = CameraFrame::from_rgba(10, 10, vec![0; 12], 0);
        assert!(matches!(
            storage.save_frame(&bad, Rotation::None),
            Err(StorageError::InvalidFrame(_))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwritable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let storage = DiskStorage::new(blocker.join("photos"), PhotoEncoder::default());
        assert!(storage.save_frame(&frame(2, 2), Rotation::None).is_err());
    }

    #[test]
    fn test_missing_image_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image_file(&dir.path().join("nope.jpg")).unwrap().is_none());
    }

    #[test]
    fn test_export_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbaImage::new(2, 2);
        assert!(export_image(&image, &dir.path().join("out.bmp"), QualityPreset::High).is_err());
        export_image(&image, &dir.path().join("sub/out.png"), QualityPreset::High).unwrap();
        assert!(dir.path().join("sub/out.png").exists());
    }

    #[tokio::test]
    async fn test_thumbnail_is_square() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path(), PhotoEncoder::default());
        let path = storage.save_frame(&frame(300, 200), Rotation::None).unwrap();

        let thumb = load_thumbnail(path.clone()).await.unwrap();
        assert_eq!((thumb.width, thumb.height), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
        assert_eq!(thumb.rgba.len(), (THUMBNAIL_SIZE * THUMBNAIL_SIZE * 4) as usize);
        assert_eq!(thumb.path, path);

        assert!(load_thumbnail(dir.path().join("missing.jpg")).await.is_none());
    }
}
