// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host-side event capture
//!
//! Log events relayed from the page are validated, routed by channel and
//! aggregated per category:
//! - Canvas keeps every call in order so draw and export calls can be correlated
//! - Audio, WebGL and Misc keep one copy of each distinct call
//! - Call stacks are kept only when a category's policy asks for them

mod category;
mod dispatcher;
mod message;
mod policy;
mod stack;
mod state;

pub use category::{Category, AUDIO_CHANNEL, CANVAS_CHANNEL, MISC_CHANNEL, WEBGL_CHANNEL};
pub use dispatcher::{Delivery, FingerprintScan, ScanStats};
pub use message::{Access, CallRecord, LogMessage, PropertyAccessRecord, Record};
pub use policy::{
    CategoryPolicy, DedupMode, PolicySet, StackCapture, CANVAS_EXPORT_METHOD,
    CANVAS_TEXT_METHODS, MISC_TRACKED_PROPERTIES,
};
pub use stack::{CallStack, StackFrame};
pub use state::CategoryState;
