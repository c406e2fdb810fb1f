// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  JPEG / PNG  │
//! │   (RGBA)     │     │  - Rotation       │     │  + catalog   │
//! │              │     │  - Encoding       │     │    record    │
//! │              │     │  - Indexing       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! Heavy work runs on blocking threads so the preview never stalls.

pub mod photo;
