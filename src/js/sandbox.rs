// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Emulated page built on boa_engine
//!
//! Runs injected init scripts and then page scripts against the emulated
//! browser surface, relaying every instrumentation log event to the handlers
//! registered through [`PageHooks`].

use std::sync::Arc;

use boa_engine::context::ContextBuilder;
use boa_engine::property::Attribute;
use boa_engine::{js_string, Context, JsObject, JsResult, JsString, JsValue, NativeFunction, Source};
use boa_gc::{Finalize, Trace};
use parking_lot::RwLock;

use super::stubs::EMULATED_BROWSER_JS;
use crate::capture::{CallStack, StackFrame};
use crate::error::{Error, Result};
use crate::extractor::{LogHandler, PageHooks};
use crate::instrument::DEFAULT_LOG_FUNCTION;

/// Native function the in-page relay forwards serialized events to
const RELAY_NATIVE: &str = "__fpwatchRelay";

/// Name of the frame standing in for the instrumentation wrapper
pub const WRAPPER_FRAME: &str = "<instrumentation>";

/// Page sandbox configuration
#[derive(Debug, Clone)]
pub struct PageSandboxConfig {
    /// Global function name the instrumentation relays events through
    pub log_function: String,
    /// Install the emulated browser APIs
    pub emulate_browser: bool,
    /// Console output capture
    pub capture_console: bool,
    /// Maximum timer callbacks run after each script
    pub max_timer_callbacks: u32,
}

impl Default for PageSandboxConfig {
    fn default() -> Self {
        Self {
            log_function: DEFAULT_LOG_FUNCTION.to_string(),
            emulate_browser: true,
            capture_console: true,
            max_timer_callbacks: 256,
        }
    }
}

impl PageSandboxConfig {
    /// Set the relay function name
    pub fn log_function(mut self, name: impl Into<String>) -> Self {
        self.log_function = name.into();
        self
    }
}

/// Console message type
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
}

/// Console log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

/// A script loaded by the page
#[derive(Debug, Clone)]
pub struct PageScript {
    /// Script URL or file name, reported as the calling frame's location
    pub name: String,
    pub source: String,
}

impl PageScript {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Outcome of running a page
#[derive(Debug, Default)]
pub struct PageRun {
    /// Log events delivered to the handlers
    pub events: usize,
    /// Page scripts that threw; later scripts still ran
    pub script_errors: Vec<Error>,
}

/// Event relayed from the page, before JSON decoding
#[derive(Debug, Clone)]
struct RelayedEvent {
    channel: String,
    message: String,
    script: String,
}

/// Host state reachable from the native relay
#[derive(Trace, Finalize)]
struct RelayCaptures {
    #[unsafe_ignore_trace]
    relayed: Arc<RwLock<Vec<RelayedEvent>>>,
    #[unsafe_ignore_trace]
    current_script: Arc<RwLock<String>>,
}

/// Host state reachable from one console method
#[derive(Trace, Finalize)]
struct ConsoleCaptures {
    #[unsafe_ignore_trace]
    output: Arc<RwLock<Vec<ConsoleMessage>>>,
    #[unsafe_ignore_trace]
    level: ConsoleLevel,
}

/// Emulated page implementing [`PageHooks`]
pub struct PageSandbox {
    config: PageSandboxConfig,
    init_scripts: Vec<String>,
    handlers: Vec<LogHandler>,
    /// Events relayed during the current script
    relayed: Arc<RwLock<Vec<RelayedEvent>>>,
    /// Name of the script currently executing
    current_script: Arc<RwLock<String>>,
    /// Console output
    console_output: Arc<RwLock<Vec<ConsoleMessage>>>,
}

impl Default for PageSandbox {
    fn default() -> Self {
        Self::new(PageSandboxConfig::default())
    }
}

impl PageSandbox {
    /// Create a new page sandbox
    pub fn new(config: PageSandboxConfig) -> Self {
        Self {
            config,
            init_scripts: Vec::new(),
            handlers: Vec::new(),
            relayed: Arc::new(RwLock::new(Vec::new())),
            current_script: Arc::new(RwLock::new(String::new())),
            console_output: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get console output
    pub fn console_output(&self) -> Vec<ConsoleMessage> {
        self.console_output.read().clone()
    }

    /// Load the page: init scripts first, then `scripts` in order
    ///
    /// A throwing init script aborts the run; a throwing page script is
    /// recorded in [`PageRun::script_errors`] and the next one still runs.
    pub fn run(&mut self, scripts: &[PageScript]) -> Result<PageRun> {
        let mut context = ContextBuilder::new()
            .build()
            .map_err(|e| Error::js(format!("Failed to create JS context: {}", e)))?;

        if self.config.capture_console {
            Self::install_console(&mut context, self.console_output.clone())?;
        }
        Self::install_relay(
            &mut context,
            &self.config.log_function,
            self.relayed.clone(),
            self.current_script.clone(),
        )?;
        if self.config.emulate_browser {
            Self::eval(&mut context, EMULATED_BROWSER_JS)
                .map_err(|e| Error::js(format!("Failed to install browser emulation: {}", e)))?;
        }

        let mut run = PageRun::default();

        let init_scripts = self.init_scripts.clone();
        for (i, source) in init_scripts.iter().enumerate() {
            let name = format!("<init-script-{}>", i);
            *self.current_script.write() = name.clone();
            Self::eval(&mut context, source).map_err(|e| Error::js_in_script(e.to_string(), name))?;
            run.events += self.deliver_relayed();
        }

        for script in scripts {
            *self.current_script.write() = script.name.clone();
            if let Err(e) = Self::eval(&mut context, &script.source) {
                tracing::warn!(script = %script.name, error = %e, "Page script threw");
                run.script_errors
                    .push(Error::js_in_script(e.to_string(), script.name.clone()));
            }
            context.run_jobs();
            if self.config.emulate_browser {
                let flush = format!("__fpwatchFlushTimers({})", self.config.max_timer_callbacks);
                if let Err(e) = Self::eval(&mut context, &flush) {
                    tracing::debug!(error = %e, "Timer flush failed");
                }
                context.run_jobs();
            }
            run.events += self.deliver_relayed();
        }

        tracing::debug!(
            scripts = scripts.len(),
            events = run.events,
            errors = run.script_errors.len(),
            "Page run complete"
        );
        Ok(run)
    }

    fn eval(context: &mut Context, source: &str) -> JsResult<JsValue> {
        context.eval(Source::from_bytes(source))
    }

    /// Hand relayed events to the handlers in arrival order
    fn deliver_relayed(&mut self) -> usize {
        let events: Vec<RelayedEvent> = std::mem::take(&mut *self.relayed.write());
        let mut delivered = 0;

        for event in events {
            let message: serde_json::Value = match serde_json::from_str(&event.message) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(channel = %event.channel, error = %e, "Undecodable relayed event");
                    continue;
                }
            };
            let stack = CallStack::new(vec![
                StackFrame::named(WRAPPER_FRAME),
                StackFrame {
                    url: Some(event.script.clone()),
                    ..Default::default()
                },
            ]);
            for handler in self.handlers.iter_mut() {
                handler(&event.channel, &message, stack.clone());
            }
            delivered += 1;
        }

        delivered
    }

    /// Install the relay: a native sink plus the in-page log function
    fn install_relay(
        context: &mut Context,
        log_function: &str,
        relayed: Arc<RwLock<Vec<RelayedEvent>>>,
        current_script: Arc<RwLock<String>>,
    ) -> Result<()> {
        let relay_fn = NativeFunction::from_copy_closure_with_captures(
            |_, args, captures: &RelayCaptures, ctx| {
                let channel = args
                    .first()
                    .map(|v| v.to_string(ctx))
                    .transpose()?
                    .map(|s| s.to_std_string_escaped())
                    .unwrap_or_default();
                let message = args
                    .get(1)
                    .map(|v| v.to_string(ctx))
                    .transpose()?
                    .map(|s| s.to_std_string_escaped())
                    .unwrap_or_default();

                captures.relayed.write().push(RelayedEvent {
                    channel,
                    message,
                    script: captures.current_script.read().clone(),
                });

                Ok(JsValue::undefined())
            },
            RelayCaptures {
                relayed,
                current_script,
            },
        );
        context
            .register_global_builtin_callable(JsString::from(RELAY_NATIVE), 2, relay_fn)
            .map_err(|e| Error::js(format!("Failed to register relay: {}", e)))?;

        let shim = format!(
            "globalThis[{}] = function (channel, message) {{ {}(String(channel), JSON.stringify(message)); }};",
            serde_json::Value::String(log_function.to_string()),
            RELAY_NATIVE,
        );
        Self::eval(context, &shim)
            .map_err(|e| Error::js(format!("Failed to install log function: {}", e)))?;

        Ok(())
    }

    /// Install console object
    fn install_console(
        context: &mut Context,
        output: Arc<RwLock<Vec<ConsoleMessage>>>,
    ) -> Result<()> {
        let console = JsObject::default();

        let levels = [
            ("log", ConsoleLevel::Log),
            ("info", ConsoleLevel::Info),
            ("warn", ConsoleLevel::Warn),
            ("error", ConsoleLevel::Error),
            ("debug", ConsoleLevel::Debug),
        ];

        for (name, level) in levels {
            let log_fn = NativeFunction::from_copy_closure_with_captures(
                |_, args, captures: &ConsoleCaptures, ctx| {
                    let msg = args
                        .iter()
                        .map(|v| {
                            v.to_string(ctx)
                                .map(|s| s.to_std_string_escaped())
                                .unwrap_or_else(|_| "[object]".to_string())
                        })
                        .collect::<Vec<_>>()
                        .join(" ");

                    tracing::trace!(level = ?captures.level, %msg, "Page console");
                    captures.output.write().push(ConsoleMessage {
                        level: captures.level,
                        message: msg,
                    });

                    Ok(JsValue::undefined())
                },
                ConsoleCaptures {
                    output: output.clone(),
                    level,
                },
            );
            console
                .set(JsString::from(name), log_fn.to_js_function(context.realm()), false, context)
                .map_err(|e| Error::js(format!("Failed to set console.{}: {}", name, e)))?;
        }

        context
            .register_global_property(js_string!("console"), console, Attribute::all())
            .map_err(|e| Error::js(format!("Failed to register console: {}", e)))?;

        Ok(())
    }
}

impl PageHooks for PageSandbox {
    fn inject_before_page_scripts(&mut self, source: &str) -> Result<()> {
        self.init_scripts.push(source.to_string());
        Ok(())
    }

    fn on_log(&mut self, handler: LogHandler) {
        self.handlers.push(handler);
    }
}
