// SPDX-License-Identifier: GPL-3.0-only

//! Detection overlay handlers

use crate::app::frame_processor::DetectionResult;
use crate::app::state::AppModel;
use tracing::{debug, info};

impl AppModel {
    pub(crate) fn handle_detection_session_started(&mut self, session: u64) {
        info!(session, "Detection overlay session started");
        self.detection.begin(session);
    }

    pub(crate) fn handle_detection_session_ended(&mut self, session: u64) {
        info!(session, "Detection overlay session ended");
        self.detection.end(session);
    }

    pub(crate) fn handle_detections_updated(&mut self, session: u64, result: DetectionResult) {
        let count = result.boxes.len();
        let sequence = result.sequence;
        if self.detection.apply(session, result) && count > 0 {
            debug!(session, sequence, count, "Detections updated");
        }
    }

    pub(crate) fn handle_detections_cleared(&mut self) {
        self.detection.clear();
    }
}
