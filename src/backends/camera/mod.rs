// SPDX-License-Identifier: GPL-3.0-only

//! Camera collaborator interface

pub mod types;

pub use types::*;

/// Source of preview frames
///
/// Frames are pushed to the detection loop as they become available. The
/// source delivers at most one more preview frame per request, which is how
/// the loop applies back-pressure.
pub trait CameraSource: Send + Sync {
    /// Ask for the next preview frame
    fn request_next_preview_frame(&self);
}
