// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fingerprinting extractor
//!
//! Glue between a page driver and a scan: injects the instrumentation through
//! [`PageHooks`], feeds every relayed log event into the scan, and writes the
//! verdicts into a [`ResultSink`] once the page interaction is over.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::capture::{CallStack, Delivery, FingerprintScan};
use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::evidence::FingerprintingReport;
use crate::instrument::InstrumentationBuilder;
use crate::result::ResultSink;

/// Callback receiving `(channel, message, call_stack)` for each page log event
pub type LogHandler = Box<dyn FnMut(&str, &Value, CallStack) + Send>;

/// Hooks a page driver offers for instrumentation
///
/// # Example
///
/// ```rust,no_run
/// use fpwatch::{FingerprintingExtractor, MemoryResult, PageSandbox, PageScript, ScanConfig};
///
/// # fn main() -> fpwatch::Result<()> {
/// let extractor = FingerprintingExtractor::new(ScanConfig::default())?;
/// let mut page = PageSandbox::default();
/// extractor.attach(&mut page)?;
///
/// page.run(&[PageScript::new("fp.js", "document.createElement('canvas').toDataURL()")])?;
///
/// let mut result = MemoryResult::new();
/// let report = extractor.extract_into(&mut result)?;
/// println!("canvas fingerprinting: {}", report.canvas.is_fingerprinting);
/// # Ok(())
/// # }
/// ```
pub trait PageHooks {
    /// Run `source` in the page before any page script
    fn inject_before_page_scripts(&mut self, source: &str) -> Result<()>;

    /// Register a callback for log events relayed from the page
    fn on_log(&mut self, handler: LogHandler);
}

/// Runs one fingerprinting scan against a page
pub struct FingerprintingExtractor {
    config: ScanConfig,
    scan: Arc<Mutex<Option<FingerprintScan>>>,
}

impl FingerprintingExtractor {
    /// Create an extractor with a fresh scan
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let scan = FingerprintScan::from_config(&config);
        Ok(Self {
            config,
            scan: Arc::new(Mutex::new(Some(scan))),
        })
    }

    /// Scan configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Instrumentation script for this configuration
    pub fn instrumentation(&self) -> String {
        InstrumentationBuilder::from_config(&self.config).build()
    }

    /// Inject the instrumentation and subscribe to the page's log events
    pub fn attach<H: PageHooks + ?Sized>(&self, hooks: &mut H) -> Result<()> {
        hooks.inject_before_page_scripts(&self.instrumentation())?;

        let scan = Arc::clone(&self.scan);
        hooks.on_log(Box::new(move |channel: &str, message: &Value, call_stack: CallStack| {
            if let Err(e) = Self::deliver(&scan, channel, message, call_stack) {
                tracing::error!(channel, error = %e, "Fingerprinting event not recorded");
            }
        }));
        Ok(())
    }

    /// Deliver one event directly
    pub fn receive_log(&self, channel: &str, message: &Value, call_stack: CallStack) -> Result<Delivery> {
        Self::deliver(&self.scan, channel, message, call_stack)
    }

    fn deliver(
        scan: &Mutex<Option<FingerprintScan>>,
        channel: &str,
        message: &Value,
        call_stack: CallStack,
    ) -> Result<Delivery> {
        match scan.lock().as_mut() {
            Some(scan) => scan.receive(channel, message, call_stack),
            None => Err(Error::AlreadyFinalized),
        }
    }

    /// Seal the scan and produce its verdicts
    ///
    /// Only the first call succeeds; events arriving afterwards are rejected.
    pub fn finalize(&self) -> Result<FingerprintingReport> {
        let scan = self.scan.lock().take().ok_or(Error::AlreadyFinalized)?;
        Ok(scan.finalize())
    }

    /// Finalize and write the verdicts and artifacts into `sink`
    pub fn extract_into<S: ResultSink + ?Sized>(&self, sink: &mut S) -> Result<FingerprintingReport> {
        let report = self.finalize()?;
        report.write_to(sink)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{StackFrame, CANVAS_CHANNEL};
    use crate::evidence::{CANVAS_ARTIFACT_NAME, RESULT_KEY};
    use crate::result::MemoryResult;
    use serde_json::json;

    /// Driver double that records injections and replays events on demand
    #[derive(Default)]
    struct RecordingHooks {
        injected: Vec<String>,
        handlers: Vec<LogHandler>,
    }

    impl RecordingHooks {
        fn emit(&mut self, channel: &str, message: Value) {
            let stack = CallStack::new(vec![
                StackFrame::named("wrapper"),
                StackFrame::named("probe").at("https://fp.example/p.js", 0, 12),
            ]);
            for handler in &mut self.handlers {
                handler(channel, &message, stack.clone());
            }
        }
    }

    impl PageHooks for RecordingHooks {
        fn inject_before_page_scripts(&mut self, source: &str) -> Result<()> {
            self.injected.push(source.to_string());
            Ok(())
        }

        fn on_log(&mut self, handler: LogHandler) {
            self.handlers.push(handler);
        }
    }

    #[test]
    fn test_attach_and_extract() {
        let extractor = FingerprintingExtractor::new(ScanConfig::default()).unwrap();
        let mut hooks = RecordingHooks::default();
        extractor.attach(&mut hooks).unwrap();

        assert_eq!(hooks.injected.len(), 1);
        assert!(hooks.injected[0].contains("fingerprinting:canvas"));

        hooks.emit(
            CANVAS_CHANNEL,
            json!({"type": "function", "name": "CanvasRenderingContext2D.fillText", "arguments": ["hi", 0, 0]}),
        );
        hooks.emit(
            CANVAS_CHANNEL,
            json!({"type": "function", "name": "HTMLCanvasElement.toDataURL", "arguments": [], "retval": "data:image/png;base64,aGVsbG8="}),
        );
        // malformed events are logged and dropped, not fatal to the scan
        hooks.emit(CANVAS_CHANNEL, json!({"type": "bogus"}));

        let mut result = MemoryResult::new();
        let report = extractor.extract_into(&mut result).unwrap();

        assert!(report.canvas.is_fingerprinting);
        assert_eq!(report.canvas.calls.len(), 2);
        assert_eq!(report.stats.rejected, 1);
        assert_eq!(result.file(CANVAS_ARTIFACT_NAME), Some(&b"hello"[..]));
        assert_eq!(result.section(RESULT_KEY).unwrap()["canvas"]["is_fingerprinting"], json!(true));
    }

    #[test]
    fn test_finalize_once() {
        let extractor = FingerprintingExtractor::new(ScanConfig::default()).unwrap();
        assert!(extractor.finalize().is_ok());
        assert!(matches!(extractor.finalize(), Err(Error::AlreadyFinalized)));

        let late = extractor.receive_log(
            CANVAS_CHANNEL,
            &json!({"type": "function", "name": "HTMLCanvasElement.toDataURL", "arguments": []}),
            CallStack::default(),
        );
        assert!(matches!(late, Err(Error::AlreadyFinalized)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(FingerprintingExtractor::new(ScanConfig::new().bindings(vec![])).is_err());
    }
}
