// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-page instrumentation
//!
//! Generates the script that wraps fingerprinting-relevant browser APIs so
//! every call or accessor use is reported on a per-category log channel,
//! while callers still observe the original return values and side effects.

mod builder;
mod table;

pub use builder::{instrumentation_script, InstrumentationBuilder, DEFAULT_LOG_FUNCTION};
pub use table::{default_bindings, Binding, BindingKind, Target};
