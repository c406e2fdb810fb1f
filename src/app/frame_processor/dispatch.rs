// SPDX-License-Identifier: GPL-3.0-only

//! Detection dispatch loop
//!
//! Preview frames arrive at the camera's cadence; detection is much slower.
//! The loop keeps exactly one frame in flight: frames that arrive while a
//! detection runs are dropped, and the next frame is requested only when
//! the current one finishes (successfully or not).
//!
//! Results are posted to the UI queue tagged with the session generation,
//! so the overlay can ignore anything from a session that has ended.

use super::types::DetectionResult;
use crate::app::{Message, UiSender};
use crate::backends::camera::{CameraSource, FrameHandle, Rotation};
use crate::backends::detector::ObjectDetector;
use crate::errors::InferenceError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, info, trace, warn};

/// Counters since the loop was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionStats {
    /// Frames handed to a worker
    pub dispatched: u64,
    /// Frames dropped because a detection was already running
    pub dropped: u64,
    /// Detections that ran to completion
    pub completed: u64,
    /// Detections that errored or panicked
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    dropped: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

struct Shared {
    camera: Arc<dyn CameraSource>,
    detector: Arc<dyn ObjectDetector>,
    ui: UiSender,
    workers: Arc<Semaphore>,
    runtime: Handle,
    enabled: AtomicBool,
    running: AtomicBool,
    in_flight: AtomicBool,
    session: AtomicU64,
    rotation: AtomicU32,
    counters: Counters,
}

/// Back-pressured frame → detection → overlay loop
///
/// Cheap to clone; clones drive the same loop.
#[derive(Clone)]
pub struct DetectionDispatchLoop {
    shared: Arc<Shared>,
}

impl DetectionDispatchLoop {
    pub fn new(
        camera: Arc<dyn CameraSource>,
        detector: Arc<dyn ObjectDetector>,
        ui: UiSender,
        workers: usize,
        enabled: bool,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                camera,
                detector,
                ui,
                workers: Arc::new(Semaphore::new(workers.max(1))),
                runtime,
                enabled: AtomicBool::new(enabled),
                running: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                session: AtomicU64::new(0),
                rotation: AtomicU32::new(0),
                counters: Counters::default(),
            }),
        }
    }

    /// Begin a new session and request the first frame
    ///
    /// When detection is disabled no frame is requested and the overlay is
    /// cleared. Returns the new session generation.
    pub fn start(&self) -> u64 {
        let shared = &self.shared;
        let session = shared.session.fetch_add(1, Ordering::AcqRel) + 1;
        shared.running.store(true, Ordering::SeqCst);
        shared.ui.post(Message::DetectionSessionStarted { session });

        if shared.enabled.load(Ordering::Acquire) {
            info!(session, "Detection session started");
            shared.camera.request_next_preview_frame();
        } else {
            info!(session, "Detection disabled, not requesting frames");
            shared.ui.post(Message::DetectionsCleared);
        }
        session
    }

    /// End the current session
    ///
    /// No further frames are requested; a detection still running finishes
    /// but its result is discarded.
    pub fn stop(&self) {
        let shared = &self.shared;
        if !shared.running.swap(false, Ordering::AcqRel) {
            return;
        }
        let session = shared.session.fetch_add(1, Ordering::AcqRel);
        info!(session, "Detection session stopped");
        shared.ui.post(Message::DetectionSessionEnded { session });
    }

    /// Turn detection on or off at runtime
    pub fn set_enabled(&self, enabled: bool) {
        let shared = &self.shared;
        let was = shared.enabled.swap(enabled, Ordering::SeqCst);
        if was == enabled {
            return;
        }
        info!(enabled, "Object detection toggled");

        if !enabled {
            shared.ui.post(Message::DetectionsCleared);
        } else if shared.running.load(Ordering::SeqCst)
            && !shared.in_flight.load(Ordering::SeqCst)
        {
            // A running detection requests the next frame itself
            shared.camera.request_next_preview_frame();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Current session generation (0 before the first `start`)
    pub fn session(&self) -> u64 {
        self.shared.session.load(Ordering::Acquire)
    }

    /// Device orientation passed to the detector
    pub fn set_rotation(&self, rotation: Rotation) {
        self.shared
            .rotation
            .store(rotation.degrees(), Ordering::Release);
    }

    pub fn stats(&self) -> DetectionStats {
        let c = &self.shared.counters;
        DetectionStats {
            dispatched: c.dispatched.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            completed: c.completed.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
        }
    }

    /// Camera callback for a new preview frame
    ///
    /// Never blocks. The frame is either handed to a worker or released
    /// right away.
    pub fn on_frame_available(&self, frame: FrameHandle) {
        let shared = &self.shared;
        let sequence = frame.frame().sequence;

        if !shared.running.load(Ordering::Acquire) || !shared.enabled.load(Ordering::Acquire) {
            trace!(sequence, "Detection inactive, releasing frame");
            return;
        }

        if shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
            trace!(sequence, "Detection busy, dropping frame");
            return;
        }

        let session = shared.session.load(Ordering::Acquire);
        shared.counters.dispatched.fetch_add(1, Ordering::Relaxed);

        let task_shared = Arc::clone(shared);
        shared.runtime.spawn(async move {
            task_shared.detect_frame(frame, session).await;
        });
    }
}

impl Shared {
    async fn detect_frame(self: Arc<Self>, frame: FrameHandle, session: u64) {
        let rotation = Rotation::from_degrees(self.rotation.load(Ordering::Acquire))
            .unwrap_or_default();
        let image = frame.shared();
        let sequence = image.sequence;
        let (image_width, image_height) = if rotation.swaps_dimensions() {
            (image.height, image.width)
        } else {
            (image.width, image.height)
        };

        let start = Instant::now();
        let outcome = match Arc::clone(&self.workers).acquire_owned().await {
            Ok(permit) => {
                let detector = Arc::clone(&self.detector);
                tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    detector.detect(&image, rotation.degrees())
                })
                .await
                .unwrap_or_else(|e| Err(InferenceError::WorkerFailed(e.to_string())))
            }
            Err(e) => Err(InferenceError::WorkerFailed(e.to_string())),
        };
        let inference_time = start.elapsed();
        drop(frame);

        let boxes = match outcome {
            Ok(boxes) => {
                self.counters.completed.fetch_add(1, Ordering::Relaxed);
                trace!(
                    sequence,
                    count = boxes.len(),
                    elapsed_ms = inference_time.as_millis(),
                    "Detection complete"
                );
                boxes
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(sequence, error = %e, "Detection failed, treating as no results");
                Vec::new()
            }
        };

        let active = self.is_active();
        if active && self.session.load(Ordering::Acquire) == session {
            self.ui.post(Message::DetectionsUpdated {
                session,
                result: DetectionResult {
                    boxes,
                    sequence,
                    inference_time,
                    image_width,
                    image_height,
                },
            });
        } else {
            debug!(session, sequence, "Session ended, discarding detection result");
        }

        // Clear before re-reading the gates: a concurrent `start` or
        // `set_enabled(true)` that saw this detection in flight left the
        // next request to us.
        self.in_flight.store(false, Ordering::SeqCst);
        if self.is_active() {
            self.camera.request_next_preview_frame();
        }
    }

    fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst) && self.enabled.load(Ordering::SeqCst)
    }
}
