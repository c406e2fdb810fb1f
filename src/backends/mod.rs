// SPDX-License-Identifier: GPL-3.0-only

//! Collaborators at the edge of the core
//!
//! ```text
//! ┌─────────────────────┐      frames       ┌──────────────────────┐
//! │    CameraSource     │ ────────────────▶ │ DetectionDispatchLoop│
//! └─────────────────────┘                   └──────────┬───────────┘
//!            ▲   request_next_preview_frame()          │ detect()
//!            └─────────────────────────────────────────┤
//!                                           ┌──────────▼───────────┐
//!                                           │    ObjectDetector    │
//!                                           └──────────────────────┘
//! ```
//!
//! Hardware sessions and model internals live behind these traits; the crate
//! only depends on the interfaces.

pub mod camera;
pub mod detector;

pub use camera::{CameraFrame, CameraSource, FrameHandle, Rotation};
pub use detector::ObjectDetector;
