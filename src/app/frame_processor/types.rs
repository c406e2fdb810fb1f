// SPDX-License-Identifier: GPL-3.0-only

//! Detection result types
//!
//! These are produced on detection workers and consumed by the overlay on
//! the UI side.

use std::time::Duration;

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions,
/// so the overlay can scale them to any preview size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width.max(1) as f32;
        let fh = frame_height.max(1) as f32;
        Self {
            x: x as f32 / fw,
            y: y as f32 / fh,
            width: width as f32 / fw,
            height: height as f32 / fh,
        }
    }

    /// Scale to a target surface, returning `(x, y, width, height)` in pixels
    pub fn to_pixels(&self, surface_width: f32, surface_height: f32) -> (f32, f32, f32, f32) {
        (
            self.x * surface_width,
            self.y * surface_height,
            self.width * surface_width,
            self.height * surface_height,
        )
    }
}

/// One detected object
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    /// Confidence in 0..=1
    pub score: f32,
    pub region: FrameRegion,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f32, region: FrameRegion) -> Self {
        Self {
            label: label.into(),
            score,
            region,
        }
    }
}

/// Detections for one preview frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionResult {
    pub boxes: Vec<Detection>,
    /// Sequence number of the frame these boxes belong to
    pub sequence: u64,
    pub inference_time: Duration,
    /// Size of the analysed image, after rotation
    pub image_width: u32,
    pub image_height: u32,
}

impl DetectionResult {
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_pixels() {
        let region = FrameRegion::from_pixels(160, 120, 320, 240, 640, 480);
        assert_eq!(region.x, 0.25);
        assert_eq!(region.y, 0.25);
        assert_eq!(region.width, 0.5);
        assert_eq!(region.height, 0.5);
        assert_eq!(region.to_pixels(100.0, 200.0), (25.0, 50.0, 50.0, 100.0));
    }

    #[test]
    fn test_region_zero_frame_does_not_divide_by_zero() {
        let region = FrameRegion::from_pixels(0, 0, 1, 1, 0, 0);
        assert!(region.width.is_finite());
    }
}
