// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Data URL splitting and payload decoding

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Standard alphabet, padding required, non-zero trailing bits accepted
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A `data:<mime>[;base64],<payload>` string split at its first comma
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    header: &'a str,
    payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split at the first comma; `None` if there is none
    pub fn split(url: &'a str) -> Option<Self> {
        let (header, payload) = url.split_once(',')?;
        Some(Self { header, payload })
    }

    /// Everything before the first comma
    pub fn header(&self) -> &'a str {
        self.header
    }

    /// Everything after the first comma
    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Whether the header marks the payload as base64
    pub fn is_base64(&self) -> bool {
        self.header.contains("base64")
    }

    /// Media type from the header, if present
    pub fn mime_type(&self) -> Option<&'a str> {
        let media = self.header.strip_prefix("data:").unwrap_or(self.header);
        let mime = media.split(';').next()?.trim();
        if mime.is_empty() {
            None
        } else {
            Some(mime)
        }
    }

    /// Decode a base64 payload
    ///
    /// Bytes outside the base64 alphabet are discarded first. `None` for
    /// non-base64 headers and for payloads that still fail to decode.
    pub fn decode(&self) -> Option<Vec<u8>> {
        if !self.is_base64() {
            return None;
        }
        let compact: String = self
            .payload
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
            .collect();
        LENIENT.decode(compact).ok()
    }
}
