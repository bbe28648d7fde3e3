// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # fpwatch - Runtime Fingerprinting Detection
//!
//! Detects browser fingerprinting while a page runs. Fingerprint-prone APIs
//! are wrapped in-page; every wrapped call or property access is relayed to
//! the host, aggregated per category and turned into verdicts at the end of
//! the page visit.
//!
//! ## Features
//!
//! - Table-driven instrumentation for canvas, audio, WebGL, storage, navigator and screen
//! - Per-category aggregation with configurable dedup and stack capture policies
//! - Canvas verdicts backed by the exported image, persisted as an artifact
//! - Async relay for drivers that receive page events on their own tasks
//! - Emulated page on boa_engine for running captured scripts without a browser
//!
//! ## Example
//!
//! ```rust,no_run
//! use fpwatch::{FingerprintingExtractor, MemoryResult, PageSandbox, PageScript, ScanConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = FingerprintingExtractor::new(ScanConfig::default())?;
//!     let mut page = PageSandbox::default();
//!     extractor.attach(&mut page)?;
//!
//!     let source = std::fs::read_to_string("fp.js")?;
//!     page.run(&[PageScript::new("https://tracker.example/fp.js", source)])?;
//!
//!     let mut result = MemoryResult::new();
//!     let report = extractor.extract_into(&mut result)?;
//!     for category in report.flagged() {
//!         println!("{} fingerprinting detected", category);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod evidence;
pub mod extractor;
pub mod instrument;
pub mod js;
pub mod relay;
pub mod result;

// Re-exports for convenience

// Capture
pub use capture::{
    Access, CallStack, Category, CategoryPolicy, Delivery, DedupMode, FingerprintScan,
    LogMessage, PolicySet, Record, ScanStats, StackCapture, StackFrame,
};
pub use capture::{AUDIO_CHANNEL, CANVAS_CHANNEL, MISC_CHANNEL, WEBGL_CHANNEL};

// Configuration
pub use config::ScanConfig;

// Errors
pub use error::{Error, Result};

// Verdicts
pub use evidence::{CanvasArtifact, CategoryVerdict, FingerprintingReport, RESULT_KEY};

// Extraction
pub use extractor::{FingerprintingExtractor, LogHandler, PageHooks};

// Instrumentation
pub use instrument::{instrumentation_script, Binding, BindingKind, InstrumentationBuilder, Target};

// Emulated page
pub use js::{ConsoleLevel, ConsoleMessage, PageRun, PageSandbox, PageSandboxConfig, PageScript};

// Relay
pub use relay::{LogCollector, LogEvent, LogSender};

// Results
pub use result::{MemoryResult, ResultSink, StoredFile};

/// fpwatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
