// SPDX-License-Identifier: GPL-3.0-only

//! Object detector interface

use crate::app::frame_processor::Detection;
use crate::backends::camera::CameraFrame;
use crate::errors::InferenceError;

/// Blocking object detection model
///
/// Called from a worker thread, never from the UI. Implementations may take
/// as long as they need; the dispatch loop keeps at most one frame in flight.
pub trait ObjectDetector: Send + Sync {
    /// Run inference on `frame`, which the sensor delivered rotated by
    /// `rotation_degrees` clockwise
    fn detect(
        &self,
        frame: &CameraFrame,
        rotation_degrees: u32,
    ) -> Result<Vec<Detection>, InferenceError>;
}
