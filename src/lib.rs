// SPDX-License-Identifier: GPL-3.0-only

//! Photo Studio - photo capture with live object detection and
//! non-destructive filter editing
//!
//! # Architecture
//!
//! - [`filter`]: color filters, the filter stack and its persistence codec
//! - [`persistence`]: image and filter catalog (SQLite)
//! - [`storage`]: photo files on disk and thumbnails
//! - [`pipelines`]: async capture pipeline (save → index → notify)
//! - [`app`]: UI-side model, message queue and the detection dispatch loop
//! - [`backends`]: camera and detector interfaces
//! - [`config`]: user configuration

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod persistence;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::frame_processor::{Detection, DetectionDispatchLoop, DetectionResult};
pub use app::{AppModel, Message, UiSender, ui_channel};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use filter::{Filter, FilterStack, FilterTag};
pub use pipelines::photo::CapturePipeline;
