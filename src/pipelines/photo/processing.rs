// SPDX-License-Identifier: GPL-3.0-only

//! Post-processing of decoded photos
//!
//! Applies a composite color transform to an RGBA image on the CPU. Used by
//! export and the editor preview render.

use crate::constants::TRANSFORM_EPSILON;
use crate::filter::ColorMatrix;
use image::RgbaImage;
use tracing::debug;

/// Applies a fixed color transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessor {
    transform: ColorMatrix,
}

impl PostProcessor {
    pub fn new(transform: ColorMatrix) -> Self {
        Self { transform }
    }

    /// Apply the transform in place
    pub fn apply(&self, image: &mut RgbaImage) {
        if self.transform.is_identity(TRANSFORM_EPSILON) {
            debug!("Identity transform, skipping post-processing");
            return;
        }
        let start = std::time::Instant::now();
        self.transform.apply_rgba8(&mut **image);
        debug!(
            width = image.width(),
            height = image.height(),
            elapsed_ms = start.elapsed().as_millis(),
            "Post-processing complete"
        );
    }
}
