// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Async log relay
//!
//! Drivers that receive page log events on their own tasks push them through a
//! [`LogSender`]; a single [`LogCollector`] drains the stream in order into one
//! scan and finalizes it when every sender has been dropped.

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::{CallStack, FingerprintScan};
use crate::error::{Error, Result};
use crate::evidence::FingerprintingReport;
use crate::extractor::LogHandler;

/// One log event as relayed from the page
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub channel: String,
    pub message: Value,
    pub call_stack: CallStack,
}

#[derive(Deserialize)]
struct RawLogEvent {
    channel: String,
    message: Value,
    #[serde(default, alias = "callStack", alias = "stack")]
    call_stack: Value,
}

impl LogEvent {
    pub fn new(channel: impl Into<String>, message: Value, call_stack: CallStack) -> Self {
        Self {
            channel: channel.into(),
            message,
            call_stack,
        }
    }

    /// Parse a recorded event: `{"channel", "message", "call_stack"}`
    ///
    /// The stack may be a DevTools frame array or V8 stack text.
    pub fn from_json(line: &str) -> Result<Self> {
        let raw: RawLogEvent = serde_json::from_str(line)?;
        Ok(Self {
            call_stack: CallStack::from_value(&raw.call_stack)?,
            channel: raw.channel,
            message: raw.message,
        })
    }
}

/// Sending half of the relay
#[derive(Debug, Clone)]
pub struct LogSender {
    tx: mpsc::UnboundedSender<LogEvent>,
}

impl LogSender {
    /// Queue one event
    pub fn send(&self, event: LogEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| Error::other("log collector has stopped"))
    }

    /// Handler suitable for [`crate::PageHooks::on_log`]
    pub fn handler(&self) -> LogHandler {
        let sender = self.clone();
        Box::new(move |channel: &str, message: &Value, call_stack: CallStack| {
            if let Err(e) = sender.send(LogEvent::new(channel, message.clone(), call_stack)) {
                tracing::warn!(channel, error = %e, "Dropped fingerprinting event");
            }
        })
    }
}

/// Receiving half of the relay, owning the scan
#[derive(Debug)]
pub struct LogCollector {
    rx: mpsc::UnboundedReceiver<LogEvent>,
    scan: FingerprintScan,
}

/// Create a relay feeding `scan`
pub fn channel(scan: FingerprintScan) -> (LogSender, LogCollector) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LogSender { tx }, LogCollector { rx, scan })
}

impl LogCollector {
    /// Drain events until all senders are gone, then finalize
    pub async fn run(mut self) -> FingerprintingReport {
        while let Some(event) = self.rx.recv().await {
            // rejections are counted in the scan stats and logged there
            let _ = self
                .scan
                .receive(&event.channel, &event.message, event.call_stack);
        }
        tracing::debug!(
            accepted = self.scan.stats().accepted,
            rejected = self.scan.stats().rejected,
            "Log relay closed"
        );
        self.scan.finalize()
    }

    /// Run on a tokio task
    pub fn spawn(self) -> JoinHandle<FingerprintingReport> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{StackFrame, CANVAS_CHANNEL, WEBGL_CHANNEL};
    use serde_json::json;

    #[test]
    fn test_parse_recorded_event() {
        let line = r#"{"channel":"fingerprinting:canvas","message":{"type":"function","name":"HTMLCanvasElement.toDataURL","arguments":[]},"callStack":[{"functionName":"w"},{"functionName":"fp","url":"https://x.example/a.js"}]}"#;
        let event = LogEvent::from_json(line).unwrap();

        assert_eq!(event.channel, CANVAS_CHANNEL);
        assert_eq!(event.call_stack.len(), 2);

        let bare = LogEvent::from_json(r#"{"channel":"x","message":{}}"#).unwrap();
        assert!(bare.call_stack.is_empty());
        assert!(LogEvent::from_json("not json").is_err());
    }

    #[tokio::test]
    async fn test_collector_preserves_order() {
        let (sender, collector) = channel(FingerprintScan::new());
        let handle = collector.spawn();

        let stack = CallStack::new(vec![StackFrame::named("w"), StackFrame::named("fp")]);
        let mut handler = sender.handler();
        handler(
            CANVAS_CHANNEL,
            &json!({"type": "function", "name": "CanvasRenderingContext2D.fillText", "arguments": ["a", 1, 1]}),
            stack.clone(),
        );
        handler(
            CANVAS_CHANNEL,
            &json!({"type": "function", "name": "HTMLCanvasElement.toDataURL", "arguments": [], "retval": "data:image/png;base64,aGVsbG8="}),
            stack.clone(),
        );

        let other = sender.clone();
        tokio::spawn(async move {
            other
                .send(LogEvent::new(
                    WEBGL_CHANNEL,
                    json!({"type": "function", "name": "WebGLRenderingContext.getParameter", "arguments": [7936]}),
                    CallStack::default(),
                ))
                .unwrap();
        })
        .await
        .unwrap();

        drop(handler);
        drop(sender);
        let report = handle.await.unwrap();

        assert!(report.canvas.is_fingerprinting);
        assert_eq!(report.canvas.calls[0].method(), Some("CanvasRenderingContext2D.fillText"));
        assert_eq!(report.webgl.calls.len(), 1);
        assert_eq!(report.stats.accepted, 3);
    }

    #[tokio::test]
    async fn test_send_after_collector_stopped() {
        let (sender, collector) = channel(FingerprintScan::new());
        drop(collector);
        assert!(sender
            .send(LogEvent::new(CANVAS_CHANNEL, json!({}), CallStack::default()))
            .is_err());
    }
}
