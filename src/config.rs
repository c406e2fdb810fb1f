// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `<config dir>/photostudio/config.json`. A missing file
//! means defaults; an unreadable or malformed file is logged and also falls
//! back to defaults so the app always starts.

use crate::constants::{DEFAULT_DETECTION_WORKERS, DEFAULT_MAX_CONCURRENT_CAPTURES, QualityPreset};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::{EncodingFormat, PhotoEncoder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Application directory name under the platform config/data/picture dirs
pub const APP_DIR_NAME: &str = "photostudio";
const CONFIG_FILE_NAME: &str = "config.json";
const DATABASE_FILE_NAME: &str = "photostudio.db";

/// Photo output format
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PhotoOutputFormat {
    /// JPEG (lossy, smaller files)
    #[default]
    Jpeg,
    /// PNG (lossless, larger files)
    Png,
}

impl From<PhotoOutputFormat> for EncodingFormat {
    fn from(format: PhotoOutputFormat) -> Self {
        match format {
            PhotoOutputFormat::Jpeg => EncodingFormat::Jpeg,
            PhotoOutputFormat::Png => EncodingFormat::Png,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run live object detection during preview
    pub object_detection_enabled: bool,
    /// Size of the detection worker pool
    pub detection_workers: usize,
    /// Captures that may save and index concurrently
    pub max_concurrent_captures: usize,
    pub photo_output_format: PhotoOutputFormat,
    /// JPEG quality preset (ignored for PNG)
    pub jpeg_quality: QualityPreset,
    /// Where photos are written; platform pictures dir when unset
    pub photos_dir: Option<PathBuf>,
    /// Catalog database file; platform data dir when unset
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            object_detection_enabled: true,
            detection_workers: DEFAULT_DETECTION_WORKERS,
            max_concurrent_captures: DEFAULT_MAX_CONCURRENT_CAPTURES,
            photo_output_format: PhotoOutputFormat::default(),
            jpeg_quality: QualityPreset::default(),
            photos_dir: None,
            database_path: None,
        }
    }
}

impl Config {
    /// `<config dir>/photostudio/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the platform config location
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<Config>(&text) {
            Ok(config) => {
                info!(path = %path.display(), "Config loaded");
                config.sanitized()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
                Self::default()
            }
        }
    }

    /// Write as pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Pools need at least one worker
    fn sanitized(mut self) -> Self {
        if self.detection_workers == 0 {
            warn!("detection_workers must be at least 1");
            self.detection_workers = 1;
        }
        if self.max_concurrent_captures == 0 {
            warn!("max_concurrent_captures must be at least 1");
            self.max_concurrent_captures = 1;
        }
        self
    }

    /// Resolved photo directory
    pub fn photos_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.photos_dir {
            return Ok(dir.clone());
        }
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| AppError::Config("cannot determine a photo directory".into()))
    }

    /// Resolved catalog database path
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(DATABASE_FILE_NAME))
            .ok_or_else(|| AppError::Config("cannot determine a data directory".into()))
    }

    pub fn photo_encoder(&self) -> PhotoEncoder {
        PhotoEncoder::new(self.photo_output_format.into(), self.jpeg_quality)
    }
}
