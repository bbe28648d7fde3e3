// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Canvas fingerprinting decision and image evidence

use serde_json::Value;

use super::data_url::DataUrl;
use super::CategoryVerdict;
use crate::capture::{CategoryState, CANVAS_TEXT_METHODS};

/// Name of the artifact holding the exported canvas image
pub const CANVAS_ARTIFACT_NAME: &str = "fingerprinting_canvas";

/// Decoded canvas export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasArtifact {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decode the most recent `toDataURL` return value
///
/// Anything other than a base64 data URL with a non-empty payload yields
/// `None`; the verdict does not depend on this.
pub fn decode_canvas_image(candidate: &Value) -> Option<CanvasArtifact> {
    let Some(url) = candidate.as_str() else {
        tracing::warn!("Canvas export returned a non-string value");
        return None;
    };
    let Some(data_url) = DataUrl::split(url) else {
        tracing::warn!("Canvas export is not a data URL");
        return None;
    };
    let bytes = data_url.decode()?;
    if bytes.is_empty() {
        return None;
    }

    Some(CanvasArtifact {
        name: CANVAS_ARTIFACT_NAME.to_string(),
        mime_type: data_url.mime_type().map(str::to_string),
        bytes,
    })
}

/// Decide the canvas verdict
///
/// Fingerprinting requires both a text draw and a captured export; the export
/// stack becomes the evidence and the latest export is decoded when
/// `persist_image` is set.
pub(crate) fn finalize_canvas(
    state: CategoryState,
    persist_image: bool,
) -> (CategoryVerdict, Option<CanvasArtifact>) {
    let uses_text = state.used_any(&CANVAS_TEXT_METHODS);
    let (calls, stack, candidate) = state.into_parts();

    match stack {
        Some(stack) if uses_text => {
            let artifact = if persist_image {
                candidate.as_ref().and_then(decode_canvas_image)
            } else {
                None
            };
            tracing::info!(
                frames = stack.len(),
                artifact = artifact.is_some(),
                "Canvas fingerprinting detected"
            );
            (
                CategoryVerdict {
                    calls,
                    is_fingerprinting: true,
                    call_stack: Some(stack),
                },
                artifact,
            )
        }
        _ => (CategoryVerdict::clean(calls), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{
        CallStack, Category, CategoryPolicy, LogMessage, StackFrame, CANVAS_EXPORT_METHOD,
    };
    use serde_json::json;

    fn canvas_with(events: &[(&str, Value)]) -> CategoryState {
        let mut state = CategoryState::new(Category::Canvas, CategoryPolicy::canvas());
        for (name, retval) in events {
            state
                .ingest(
                    LogMessage::function(*name, vec![json!("Cwm fjordbank")], retval.clone()),
                    CallStack::new(vec![StackFrame::named("fp")]),
                )
                .unwrap();
        }
        state
    }

    #[test]
    fn test_export_alone_is_clean() {
        let state = canvas_with(&[(CANVAS_EXPORT_METHOD, json!("data:image/png;base64,aGVsbG8="))]);
        let (verdict, artifact) = finalize_canvas(state, true);
        assert!(!verdict.is_fingerprinting);
        assert!(verdict.call_stack.is_none());
        assert!(artifact.is_none());
    }

    #[test]
    fn test_text_alone_is_clean() {
        let state = canvas_with(&[(CANVAS_TEXT_METHODS[0], Value::Null)]);
        let (verdict, artifact) = finalize_canvas(state, true);
        assert!(!verdict.is_fingerprinting);
        assert!(artifact.is_none());
    }

    #[test]
    fn test_stroke_text_counts() {
        let state = canvas_with(&[
            (CANVAS_TEXT_METHODS[1], Value::Null),
            (CANVAS_EXPORT_METHOD, json!("data:image/png;base64,aGVsbG8=")),
        ]);
        let (verdict, artifact) = finalize_canvas(state, true);
        assert!(verdict.is_fingerprinting);
        let artifact = artifact.unwrap();
        assert_eq!(artifact.bytes, b"hello");
        assert_eq!(artifact.name, CANVAS_ARTIFACT_NAME);
        assert_eq!(artifact.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_persist_disabled() {
        let state = canvas_with(&[
            (CANVAS_TEXT_METHODS[0], Value::Null),
            (CANVAS_EXPORT_METHOD, json!("data:image/png;base64,aGVsbG8=")),
        ]);
        let (verdict, artifact) = finalize_canvas(state, false);
        assert!(verdict.is_fingerprinting);
        assert!(artifact.is_none());
    }

    #[test]
    fn test_decode_rejects_non_strings_and_empty_payloads() {
        assert!(decode_canvas_image(&json!(null)).is_none());
        assert!(decode_canvas_image(&json!("data:image/png;base64,")).is_none());
    }

    #[test]
    fn test_missing_mime_type() {
        let artifact = decode_canvas_image(&json!("data:;base64,aGVsbG8=")).unwrap();
        assert_eq!(artifact.mime_type, None);
        assert_eq!(artifact.bytes, b"hello");
    }
}
