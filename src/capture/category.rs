// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! API categories and their log channels

use serde::{Deserialize, Serialize};

/// Log channel for canvas events
pub const CANVAS_CHANNEL: &str = "fingerprinting:canvas";
/// Log channel for audio events
pub const AUDIO_CHANNEL: &str = "fingerprinting:audio";
/// Log channel for WebGL events
pub const WEBGL_CHANNEL: &str = "fingerprinting:webgl";
/// Log channel for storage, navigator and screen events
pub const MISC_CHANNEL: &str = "fingerprinting:misc";

/// Fingerprinting API category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Canvas 2D drawing and export
    Canvas,
    /// AudioContext
    Audio,
    /// WebGL context queries
    #[serde(rename = "webgl")]
    WebGl,
    /// Web Storage, Navigator and Screen
    Misc,
}

impl Category {
    /// All categories in result order
    pub const ALL: [Category; 4] = [
        Category::Canvas,
        Category::Audio,
        Category::WebGl,
        Category::Misc,
    ];

    /// Channel name events for this category arrive on
    pub fn channel(&self) -> &'static str {
        match self {
            Category::Canvas => CANVAS_CHANNEL,
            Category::Audio => AUDIO_CHANNEL,
            Category::WebGl => WEBGL_CHANNEL,
            Category::Misc => MISC_CHANNEL,
        }
    }

    /// Resolve a channel name (exact match only)
    pub fn from_channel(channel: &str) -> Option<Self> {
        match channel {
            CANVAS_CHANNEL => Some(Category::Canvas),
            AUDIO_CHANNEL => Some(Category::Audio),
            WEBGL_CHANNEL => Some(Category::WebGl),
            MISC_CHANNEL => Some(Category::Misc),
            _ => None,
        }
    }

    /// Key used in the result document
    pub fn key(&self) -> &'static str {
        match self {
            Category::Canvas => "canvas",
            Category::Audio => "audio",
            Category::WebGl => "webgl",
            Category::Misc => "misc",
        }
    }

    /// Position in [`Category::ALL`]
    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Canvas => 0,
            Category::Audio => 1,
            Category::WebGl => 2,
            Category::Misc => 3,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
