// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-category aggregation policies
//!
//! Every category runs the same aggregation code; what differs is a small
//! [`CategoryPolicy`] value deciding deduplication, when a call stack is kept
//! as evidence, and whether a call's return value is retained as the export
//! candidate.

use serde::{Deserialize, Serialize};

use super::category::Category;

/// Canvas export method
pub const CANVAS_EXPORT_METHOD: &str = "HTMLCanvasElement.toDataURL";

/// Canvas text drawing methods
pub const CANVAS_TEXT_METHODS: [&str; 2] = [
    "CanvasRenderingContext2D.fillText",
    "CanvasRenderingContext2D.strokeText",
];

/// Accessor names the Misc category records as property reads/writes
pub const MISC_TRACKED_PROPERTIES: [&str; 4] = ["userAgent", "language", "languages", "colorDepth"];

/// How repeated records are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Keep every record in arrival order
    KeepAll,
    /// Append only records not already present
    Distinct,
}

/// When a call stack is captured as evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackCapture {
    /// Never capture
    Never,
    /// Keep the stack of the first event in the category
    FirstCall,
    /// Keep the stack of the latest event with this method name
    OnMethod(String),
}

impl StackCapture {
    /// Whether an event named `name` should replace the captured stack
    pub fn triggers(&self, name: &str, already_captured: bool) -> bool {
        match self {
            StackCapture::Never => false,
            StackCapture::FirstCall => !already_captured,
            StackCapture::OnMethod(method) => method == name,
        }
    }
}

/// Aggregation policy for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    pub dedup: DedupMode,
    pub stack_capture: StackCapture,
    /// Keep the return value of the call that triggered a stack capture
    pub keep_capture_retval: bool,
}

impl CategoryPolicy {
    /// Canvas: full chronology, export call captured with its return value
    pub fn canvas() -> Self {
        Self {
            dedup: DedupMode::KeepAll,
            stack_capture: StackCapture::OnMethod(CANVAS_EXPORT_METHOD.to_string()),
            keep_capture_retval: true,
        }
    }

    /// Distinct records, capture hook inert
    pub fn distinct() -> Self {
        Self {
            dedup: DedupMode::Distinct,
            stack_capture: StackCapture::Never,
            keep_capture_retval: false,
        }
    }

    /// Change the capture trigger
    pub fn with_stack_capture(mut self, capture: StackCapture) -> Self {
        self.stack_capture = capture;
        self
    }
}

/// Policies for all four categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    pub canvas: CategoryPolicy,
    pub audio: CategoryPolicy,
    pub webgl: CategoryPolicy,
    pub misc: CategoryPolicy,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self::baseline()
    }
}

impl PolicySet {
    /// Only canvas exports capture a stack; the other hooks are inert
    pub fn baseline() -> Self {
        Self {
            canvas: CategoryPolicy::canvas(),
            audio: CategoryPolicy::distinct(),
            webgl: CategoryPolicy::distinct(),
            misc: CategoryPolicy::distinct(),
        }
    }

    /// Baseline plus first-call stack capture on Audio, WebGL and Misc
    pub fn forensic() -> Self {
        Self {
            canvas: CategoryPolicy::canvas(),
            audio: CategoryPolicy::distinct().with_stack_capture(StackCapture::FirstCall),
            webgl: CategoryPolicy::distinct().with_stack_capture(StackCapture::FirstCall),
            misc: CategoryPolicy::distinct().with_stack_capture(StackCapture::FirstCall),
        }
    }

    /// Policy for a category
    pub fn get(&self, category: Category) -> &CategoryPolicy {
        match category {
            Category::Canvas => &self.canvas,
            Category::Audio => &self.audio,
            Category::WebGl => &self.webgl,
            Category::Misc => &self.misc,
        }
    }

    /// Replace the policy for a category
    pub fn set(mut self, category: Category, policy: CategoryPolicy) -> Self {
        match category {
            Category::Canvas => self.canvas = policy,
            Category::Audio => self.audio = policy,
            Category::WebGl => self.webgl = policy,
            Category::Misc => self.misc = policy,
        }
        self
    }
}
