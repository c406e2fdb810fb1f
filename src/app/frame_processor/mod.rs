// SPDX-License-Identifier: GPL-3.0-only

//! Live object detection on preview frames
//!
//! [`DetectionDispatchLoop`] samples the preview stream with back-pressure
//! and posts [`DetectionResult`]s for the overlay.

pub mod dispatch;
pub mod types;

pub use dispatch::{DetectionDispatchLoop, DetectionStats};
pub use types::{Detection, DetectionResult, FrameRegion};
