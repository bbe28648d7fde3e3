// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Call stacks captured at interception time
//!
//! Drivers deliver stacks either as DevTools `Runtime.CallFrame` objects or as
//! the text of a V8 `Error().stack`. Both normalize into [`CallStack`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

lazy_static! {
    static ref V8_FRAME_WITH_LOCATION: Regex =
        Regex::new(r"^\s*at (?:(?P<func>.+?) \()?(?P<url>[^()\s]+?):(?P<line>\d+):(?P<col>\d+)\)?\s*$")
            .unwrap();
    static ref V8_FRAME_BARE: Regex = Regex::new(r"^\s*at (?P<func>.+?)\s*$").unwrap();
}

/// One caller frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Function name, empty for anonymous functions and top-level code
    #[serde(default)]
    pub function_name: String,
    /// Script URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    /// DevTools script identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
}

impl StackFrame {
    /// Create a frame with a function name only
    pub fn named(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            ..Default::default()
        }
    }

    /// Set the script location
    pub fn at(mut self, url: impl Into<String>, line: u32, column: u32) -> Self {
        self.url = Some(url.into());
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }

    /// Host of the script this frame belongs to
    pub fn script_host(&self) -> Option<String> {
        let parsed = Url::parse(self.url.as_deref()?).ok()?;
        parsed.host_str().map(str::to_string)
    }

    /// Parse one line of a V8 stack trace
    fn parse_v8_line(line: &str) -> Option<Self> {
        if let Some(caps) = V8_FRAME_WITH_LOCATION.captures(line) {
            return Some(Self {
                function_name: caps
                    .name("func")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                url: caps.name("url").map(|m| m.as_str().to_string()),
                line_number: caps.name("line").and_then(|m| m.as_str().parse().ok()),
                column_number: caps.name("col").and_then(|m| m.as_str().parse().ok()),
                script_id: None,
            });
        }
        V8_FRAME_BARE
            .captures(line)
            .and_then(|caps| caps.name("func"))
            .map(|m| Self::named(m.as_str()))
    }
}

impl std::fmt::Display for StackFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.function_name.is_empty() {
            "<anonymous>"
        } else {
            &self.function_name
        };
        match (&self.url, self.line_number, self.column_number) {
            (Some(url), Some(line), Some(col)) => write!(f, "{} ({}:{}:{})", name, url, line, col),
            (Some(url), _, _) => write!(f, "{} ({})", name, url),
            _ => f.write_str(name),
        }
    }
}

/// Ordered caller frames, innermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallStack(Vec<StackFrame>);

impl CallStack {
    /// Create a stack from frames
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }

    /// Parse the text of a V8 `Error().stack`
    ///
    /// The leading `Error` message line and any line that is not a frame are
    /// skipped.
    pub fn from_v8_trace(trace: &str) -> Self {
        Self(
            trace
                .lines()
                .filter(|line| line.trim_start().starts_with("at "))
                .filter_map(StackFrame::parse_v8_line)
                .collect(),
        )
    }

    /// Normalize a driver-supplied stack (frame array, V8 text, or null)
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::String(trace) => Ok(Self::from_v8_trace(trace)),
            Value::Array(_) => Ok(serde_json::from_value(value.clone())?),
            Value::Object(map) => match map.get("callFrames") {
                Some(frames) => Self::from_value(frames),
                None => Err(Error::other("stack object without callFrames")),
            },
            other => Err(Error::other(format!("unsupported call stack: {}", other))),
        }
    }

    /// Drop the first frame, which is always the logging wrapper itself
    pub fn strip_wrapper(mut self) -> Self {
        if !self.0.is_empty() {
            self.0.remove(0);
        }
        self
    }

    /// Frames, innermost first
    pub fn frames(&self) -> &[StackFrame] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distinct script URLs on the stack, in stack order
    pub fn script_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for url in self.0.iter().filter_map(|f| f.url.as_deref()) {
            if !url.is_empty() && !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    /// Host of the innermost frame that has a parseable script URL
    pub fn originating_host(&self) -> Option<String> {
        self.0.iter().find_map(StackFrame::script_host)
    }
}

impl From<Vec<StackFrame>> for CallStack {
    fn from(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_wrapper() {
        let stack = CallStack::new(vec![
            StackFrame::named("instrumented"),
            StackFrame::named("getFingerprint").at("https://cdn.tracker.example/fp.js", 10, 4),
        ]);
        let stripped = stack.strip_wrapper();

        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped.frames()[0].function_name, "getFingerprint");
        assert!(CallStack::default().strip_wrapper().is_empty());
    }

    #[test]
    fn test_devtools_frames() {
        let raw = json!([
            {"functionName": "", "scriptId": "12", "url": "", "lineNumber": 3, "columnNumber": 20},
            {"functionName": "render", "scriptId": "40", "url": "https://a.example/app.js", "lineNumber": 120, "columnNumber": 8}
        ]);
        let stack = CallStack::from_value(&raw).unwrap();

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.frames()[1].script_id.as_deref(), Some("40"));
        assert_eq!(stack.script_urls(), vec!["https://a.example/app.js"]);
        assert_eq!(stack.originating_host().as_deref(), Some("a.example"));

        let wrapped = json!({"callFrames": raw});
        assert_eq!(CallStack::from_value(&wrapped).unwrap(), stack);
    }

    #[test]
    fn test_v8_trace() {
        let trace = "Error\n    at HTMLCanvasElement.toDataURL (<anonymous>:4:21)\n    at fp (https://t.example/fp.js:1:200)\n    at https://t.example/fp.js:1:950\n    at <anonymous>";
        let stack = CallStack::from_v8_trace(trace);

        assert_eq!(stack.len(), 4);
        assert_eq!(stack.frames()[1].function_name, "fp");
        assert_eq!(stack.frames()[1].line_number, Some(1));
        assert_eq!(stack.frames()[1].column_number, Some(200));
        assert_eq!(stack.frames()[2].function_name, "");
        assert_eq!(stack.frames()[2].url.as_deref(), Some("https://t.example/fp.js"));
        assert_eq!(stack.frames()[3].function_name, "<anonymous>");
        assert_eq!(stack.frames()[3].url, None);
    }

    #[test]
    fn test_from_value_rejects_scalars() {
        assert!(CallStack::from_value(&json!(42)).is_err());
        assert!(CallStack::from_value(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_frame_display() {
        let frame = StackFrame::named("fp").at("https://t.example/fp.js", 1, 2);
        assert_eq!(frame.to_string(), "fp (https://t.example/fp.js:1:2)");
        assert_eq!(StackFrame::default().to_string(), "<anonymous>");
    }
}
