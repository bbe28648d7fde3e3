// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Emulated page using boa_engine
//!
//! Runs captured scripts against a minimal browser surface so the
//! instrumentation can be exercised without a real browser.

mod sandbox;
mod stubs;

pub use sandbox::{
    ConsoleLevel, ConsoleMessage, PageRun, PageSandbox, PageSandboxConfig, PageScript, WRAPPER_FRAME,
};
pub use stubs::EMULATED_BROWSER_JS;
