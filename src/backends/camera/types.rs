// SPDX-License-Identifier: GPL-3.0-only

//! Camera frame and orientation types

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Device orientation at capture time
///
/// Photos are rotated clockwise by this amount before they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Rotate90,
        Rotation::Rotate180,
        Rotation::Rotate270,
    ];

    /// Rotation for an exact right angle, `None` for anything else
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Rotate90),
            180 => Some(Rotation::Rotate180),
            270 => Some(Rotation::Rotate270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('°');
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Rotation::from_degrees)
            .ok_or_else(|| format!("rotation must be 0, 90, 180 or 270 (got '{s}')"))
    }
}

/// A single RGBA frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// When the frame was captured
    pub captured_at: Instant,
    /// Monotonic frame counter assigned by the source
    pub sequence: u64,
}

impl CameraFrame {
    /// Wrap tightly packed RGBA data
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, sequence: u64) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            stride: width * 4,
            captured_at: Instant::now(),
            sequence,
        }
    }

    /// Whether the buffer is large enough for the declared geometry
    pub fn is_valid(&self) -> bool {
        if self.width == 0 || self.height == 0 || self.stride < self.width * 4 {
            return false;
        }
        let needed = self.stride as usize * (self.height as usize - 1) + self.width as usize * 4;
        self.data.len() >= needed
    }

    /// Copy the pixels into a tightly packed buffer, dropping row padding
    pub fn to_packed_rgba(&self) -> Vec<u8> {
        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.stride as usize;

        if stride == width * 4 && self.data.len() == width * height * 4 {
            return self.data.to_vec();
        }

        let mut result = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            let row_start = y * stride;
            let row_end = row_start + width * 4;
            if row_end <= self.data.len() {
                result.extend_from_slice(&self.data[row_start..row_end]);
            }
        }
        result
    }
}

/// Scoped ownership of a camera frame
///
/// The camera wants every delivered frame handed back. The release callback
/// runs exactly once: on [`close`](Self::close) or when the handle is dropped,
/// whichever comes first.
pub struct FrameHandle {
    frame: Arc<CameraFrame>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl FrameHandle {
    pub fn new(frame: CameraFrame, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            frame: Arc::new(frame),
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release (decoded files, tests)
    pub fn unmanaged(frame: CameraFrame) -> Self {
        Self {
            frame: Arc::new(frame),
            release: None,
        }
    }

    pub fn frame(&self) -> &CameraFrame {
        &self.frame
    }

    /// Shared reference for work that outlives the handle
    pub fn shared(&self) -> Arc<CameraFrame> {
        Arc::clone(&self.frame)
    }

    /// Release the frame now
    pub fn close(self) {}
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHandle")
            .field("sequence", &self.frame.sequence)
            .field("width", &self.frame.width)
            .field("height", &self.frame.height)
            .field("released", &self.release.is_none())
            .finish()
    }
}
