// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Verdicts and evidence
//!
//! Turns the aggregated state of a scan into one immutable verdict per
//! category, plus the decoded canvas image when canvas fingerprinting was
//! detected.

mod canvas;
mod data_url;

pub use canvas::{decode_canvas_image, CanvasArtifact, CANVAS_ARTIFACT_NAME};
pub use data_url::DataUrl;

use serde::{Deserialize, Serialize};

use crate::capture::{CallStack, Category, CategoryState, Record, ScanStats};
use crate::error::Result;
use crate::result::ResultSink;

/// Result section key
pub const RESULT_KEY: &str = "fingerprinting";

/// Final verdict of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVerdict {
    pub calls: Vec<Record>,
    pub is_fingerprinting: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_stack: Option<CallStack>,
}

impl CategoryVerdict {
    fn clean(calls: Vec<Record>) -> Self {
        Self {
            calls,
            is_fingerprinting: false,
            call_stack: None,
        }
    }
}

/// Verdicts of a finalized scan
#[derive(Debug, Clone, Serialize)]
pub struct FingerprintingReport {
    pub canvas: CategoryVerdict,
    pub audio: CategoryVerdict,
    pub webgl: CategoryVerdict,
    pub misc: CategoryVerdict,
    /// Exported canvas image, stored as a separate artifact
    #[serde(skip)]
    pub canvas_image: Option<CanvasArtifact>,
    #[serde(skip)]
    pub stats: ScanStats,
}

impl FingerprintingReport {
    /// Verdict for a category
    pub fn verdict(&self, category: Category) -> &CategoryVerdict {
        match category {
            Category::Canvas => &self.canvas,
            Category::Audio => &self.audio,
            Category::WebGl => &self.webgl,
            Category::Misc => &self.misc,
        }
    }

    /// Categories flagged as fingerprinting
    pub fn flagged(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.verdict(*c).is_fingerprinting)
            .collect()
    }

    /// Whether any category was flagged
    pub fn is_fingerprinting(&self) -> bool {
        !self.flagged().is_empty()
    }

    /// Hosts of the scripts found on evidence stacks
    pub fn originating_hosts(&self) -> Vec<String> {
        let mut hosts = Vec::new();
        for category in Category::ALL {
            if let Some(host) = self
                .verdict(category)
                .call_stack
                .as_ref()
                .and_then(CallStack::originating_host)
            {
                if !hosts.contains(&host) {
                    hosts.push(host);
                }
            }
        }
        hosts
    }

    /// The `fingerprinting` result section
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Store the section and the canvas artifact in a result
    pub fn write_to<S: ResultSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.set_section(RESULT_KEY, self.to_json()?)?;
        if let Some(ref image) = self.canvas_image {
            sink.add_file(&image.name, image.mime_type.as_deref(), &image.bytes)?;
        }
        Ok(())
    }
}

/// Convert the aggregated states into verdicts
pub(crate) fn finalize(
    states: [CategoryState; 4],
    persist_canvas_image: bool,
    stats: ScanStats,
) -> FingerprintingReport {
    let [canvas, audio, webgl, misc] = states;
    let (canvas, canvas_image) = canvas::finalize_canvas(canvas, persist_canvas_image);

    FingerprintingReport {
        canvas,
        audio: finalize_captured(audio),
        webgl: finalize_captured(webgl),
        misc: finalize_captured(misc),
        canvas_image,
        stats,
    }
}

/// A captured stack alone flags the category
fn finalize_captured(state: CategoryState) -> CategoryVerdict {
    let category = state.category();
    let (calls, stack, _) = state.into_parts();

    match stack {
        Some(stack) => {
            tracing::info!(%category, frames = stack.len(), "Fingerprinting detected");
            CategoryVerdict {
                calls,
                is_fingerprinting: true,
                call_stack: Some(stack),
            }
        }
        None => CategoryVerdict::clean(calls),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{
        FingerprintScan, PolicySet, StackFrame, AUDIO_CHANNEL, CANVAS_CHANNEL, MISC_CHANNEL,
        WEBGL_CHANNEL,
    };
    use crate::result::MemoryResult;
    use serde_json::{json, Value};

    fn stack() -> CallStack {
        CallStack::new(vec![
            StackFrame::named("wrapper"),
            StackFrame::named("collect").at("https://fp.tracker.example/v2.js", 1, 44),
        ])
    }

    fn call(name: &str, arguments: Value, retval: Value) -> Value {
        json!({"type": "function", "name": name, "arguments": arguments, "retval": retval})
    }

    fn fill_text() -> Value {
        call("CanvasRenderingContext2D.fillText", json!(["Cwm fjordbank glyphs vext quiz", 2, 15]), Value::Null)
    }

    fn to_data_url(url: &str) -> Value {
        call("HTMLCanvasElement.toDataURL", json!([]), json!(url))
    }

    #[test]
    fn test_text_then_export_is_fingerprinting() {
        let mut scan = FingerprintScan::new();
        scan.receive(CANVAS_CHANNEL, &fill_text(), stack()).unwrap();
        scan.receive(CANVAS_CHANNEL, &to_data_url("data:image/png;base64,aGVsbG8="), stack())
            .unwrap();
        let report = scan.finalize();

        assert!(report.canvas.is_fingerprinting);
        assert_eq!(report.canvas.call_stack.as_ref().unwrap().len(), 1);
        assert_eq!(report.canvas_image.as_ref().unwrap().bytes, b"hello".to_vec());
        assert_eq!(report.flagged(), vec![Category::Canvas]);
        assert_eq!(report.originating_hosts(), vec!["fp.tracker.example".to_string()]);
    }

    #[test]
    fn test_malformed_payload_tolerated() {
        let mut scan = FingerprintScan::new();
        scan.receive(CANVAS_CHANNEL, &fill_text(), stack()).unwrap();
        scan.receive(CANVAS_CHANNEL, &to_data_url("not-a-data-url"), stack()).unwrap();
        let report = scan.finalize();

        assert!(report.canvas.is_fingerprinting);
        assert!(report.canvas_image.is_none());
    }

    #[test]
    fn test_non_base64_header_tolerated() {
        let mut scan = FingerprintScan::new();
        scan.receive(CANVAS_CHANNEL, &fill_text(), stack()).unwrap();
        scan.receive(CANVAS_CHANNEL, &to_data_url("data:text/plain,hello"), stack()).unwrap();
        let report = scan.finalize();

        assert!(report.canvas.is_fingerprinting);
        assert!(report.canvas_image.is_none());
    }

    #[test]
    fn test_latest_export_is_decoded() {
        let mut scan = FingerprintScan::new();
        scan.receive(CANVAS_CHANNEL, &to_data_url("data:image/png;base64,Zmlyc3Q="), stack())
            .unwrap();
        scan.receive(CANVAS_CHANNEL, &fill_text(), stack()).unwrap();
        scan.receive(CANVAS_CHANNEL, &to_data_url("data:image/png;base64,c2Vjb25k"), stack())
            .unwrap();
        let report = scan.finalize();

        assert_eq!(report.canvas_image.unwrap().bytes, b"second".to_vec());
    }

    #[test]
    fn test_baseline_never_flags_other_categories() {
        let mut scan = FingerprintScan::new();
        for _ in 0..50 {
            scan.receive(AUDIO_CHANNEL, &call("AudioContext.createAnalyser", json!([]), json!({})), stack())
                .unwrap();
            scan.receive(
                WEBGL_CHANNEL,
                &call("WebGLRenderingContext.getParameter", json!([37446]), json!("ANGLE")),
                stack(),
            )
            .unwrap();
        }
        let report = scan.finalize();

        assert!(!report.audio.is_fingerprinting);
        assert!(!report.webgl.is_fingerprinting);
        assert_eq!(report.audio.calls.len(), 1);
        assert_eq!(report.webgl.calls.len(), 1);
        assert!(!report.is_fingerprinting());
    }

    #[test]
    fn test_forensic_policy_flags_on_first_call() {
        let mut scan = FingerprintScan::with_policies(PolicySet::forensic());
        scan.receive(
            MISC_CHANNEL,
            &json!({"type": "property", "name": "languages", "value": ["en-US", "en"], "access": "get"}),
            stack(),
        )
        .unwrap();
        let report = scan.finalize();

        assert!(report.misc.is_fingerprinting);
        assert!(!report.audio.is_fingerprinting);
        assert_eq!(
            report.misc.call_stack.as_ref().unwrap().frames()[0].function_name,
            "collect"
        );
    }

    #[test]
    fn test_result_shape() {
        let mut scan = FingerprintScan::new();
        scan.receive(
            MISC_CHANNEL,
            &json!({"type": "property", "name": "userAgent", "value": "X", "access": "get"}),
            stack(),
        )
        .unwrap();
        scan.receive(MISC_CHANNEL, &call("setItem", json!(["k", "v"]), Value::Null), stack())
            .unwrap();
        let report = scan.finalize();

        let mut result = MemoryResult::new();
        report.write_to(&mut result).unwrap();
        let section = result.section(RESULT_KEY).unwrap();

        assert_eq!(
            section["misc"],
            json!({
                "calls": [
                    {"property": "userAgent", "value": "X"},
                    {"method": "setItem", "arguments": ["k", "v"]}
                ],
                "is_fingerprinting": false
            })
        );
        assert_eq!(section["canvas"], json!({"calls": [], "is_fingerprinting": false}));
        assert!(result.files().is_empty());
    }

    #[test]
    fn test_misc_property_serializes_without_access() {
        let mut scan = FingerprintScan::new();
        for access in ["get", "set"] {
            scan.receive(
                MISC_CHANNEL,
                &json!({"type": "property", "name": "userAgent", "value": "X", "access": access}),
                stack(),
            )
            .unwrap();
        }
        let report = scan.finalize();

        assert_eq!(
            serde_json::to_value(&report.misc.calls).unwrap(),
            json!([{"property": "userAgent", "value": "X"}])
        );
    }

    #[test]
    fn test_artifact_written_to_result() {
        let mut scan = FingerprintScan::new();
        scan.receive(CANVAS_CHANNEL, &fill_text(), stack()).unwrap();
        scan.receive(CANVAS_CHANNEL, &to_data_url("data:image/png;base64,aGVsbG8="), stack())
            .unwrap();

        let mut result = MemoryResult::new();
        scan.finalize().write_to(&mut result).unwrap();

        assert_eq!(result.file(CANVAS_ARTIFACT_NAME), Some(&b"hello"[..]));
        assert_eq!(
            result.section(RESULT_KEY).unwrap()["canvas"]["call_stack"][0]["functionName"],
            json!("collect")
        );
    }
}
