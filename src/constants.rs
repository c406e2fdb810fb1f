// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};

/// Editor sliders run from 0 to this value
pub const SLIDER_MAX: u8 = 100;
/// Slider position of a filter's neutral value
pub const SLIDER_CENTER: u8 = 50;

/// Edge length of the "last photo" thumbnail
pub const THUMBNAIL_SIZE: u32 = 128;

/// Prefix of captured photo filenames
pub const PHOTO_FILE_PREFIX: &str = "IMG";
/// Timestamp used in photo filenames
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Timestamp stored in image records
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tolerance used when comparing composite transforms
pub const TRANSFORM_EPSILON: f32 = 1e-5;

/// Default size of the detection worker pool
pub const DEFAULT_DETECTION_WORKERS: usize = 5;
/// Default number of captures that may save/index at the same time
pub const DEFAULT_MAX_CONCURRENT_CAPTURES: usize = 4;

/// Notification texts shown to the user
pub mod messages {
    pub const PICTURE_TAKEN: &str = "Picture taken";
    pub const PICTURE_SAVE_FAILED: &str = "Failed to save picture";
    pub const FILTERS_SAVED: &str = "Filters saved successfully";
    pub const FILTERS_SAVE_FAILED: &str = "Failed to save filters";
    pub const IMAGE_LOAD_FAILED: &str = "Failed to load image";
    pub const TAKE_PICTURE_FIRST: &str = "First take picture";
}

/// JPEG quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QualityPreset {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 4] = [
        QualityPreset::Low,
        QualityPreset::Medium,
        QualityPreset::High,
        QualityPreset::Maximum,
    ];

    /// JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 80,
            QualityPreset::High => 92,
            QualityPreset::Maximum => 98,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
            QualityPreset::Maximum => "Maximum",
        }
    }
}
