// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Instrumentation script generation

use super::table::{default_bindings, Binding, BindingKind};
use crate::config::ScanConfig;

/// Wrapper runtime shared by every binding.
///
/// `__FP_LOG__` is replaced with the relay function name as a string literal.
/// The relay is looked up on every event so the driver may install it after
/// this script has run.
const INSTRUMENTATION_RUNTIME: &str = r#"(function (root) {
    var relayName = __FP_LOG__;

    function emit(channel, message) {
        try {
            root[relayName](channel, message);
        } catch (e) {
            // relay failures must never reach the page
        }
    }

    function findDescriptor(obj, prop) {
        var proto = obj;
        while (proto !== null && proto !== undefined) {
            var descriptor = Object.getOwnPropertyDescriptor(proto, prop);
            if (descriptor !== undefined) {
                return descriptor;
            }
            proto = Object.getPrototypeOf(proto);
        }
        return undefined;
    }

    function instrumentFunction(func, name, channel) {
        return function () {
            var retval = func.apply(this, arguments);
            emit(channel, {
                type: 'function',
                name: name,
                arguments: Array.prototype.slice.call(arguments),
                retval: retval
            });
            return retval;
        };
    }

    function instrumentAccessor(obj, prop, name, channel) {
        var descriptor = findDescriptor(obj, prop);
        if (descriptor === undefined || (!descriptor.get && !descriptor.set)) {
            return false;
        }
        var origGetter = descriptor.get;
        var origSetter = descriptor.set;
        Object.defineProperty(obj, prop, {
            configurable: true,
            enumerable: descriptor.enumerable,
            get: function () {
                var value = origGetter ? origGetter.apply(this, arguments) : undefined;
                emit(channel, {type: 'property', name: name, value: value, access: 'get'});
                return value;
            },
            set: function (value) {
                emit(channel, {type: 'property', name: name, value: value, access: 'set'});
                if (origSetter) {
                    return origSetter.apply(this, arguments);
                }
            }
        });
        return true;
    }

    function instrumentObject(obj, objectName, properties, channel) {
        for (var i = 0; i < properties.length; i++) {
            var prop = properties[i];
            var name = objectName + '.' + prop;
            var descriptor = findDescriptor(obj, prop);
            if (descriptor !== undefined && typeof descriptor.value === 'function') {
                obj[prop] = instrumentFunction(descriptor.value, name, channel);
            } else {
                instrumentAccessor(obj, prop, name, channel);
            }
        }
    }

    function install(resolve, objectName, properties, channel, kind) {
        var target;
        try {
            target = resolve();
        } catch (e) {
            return;
        }
        if (target === null || target === undefined) {
            return;
        }
        if (kind === 'accessor') {
            for (var i = 0; i < properties.length; i++) {
                instrumentAccessor(target, properties[i], properties[i], channel);
            }
        } else {
            instrumentObject(target, objectName, properties, channel);
        }
    }
"#;

const INSTRUMENTATION_EPILOGUE: &str = "})(this);\n";

/// Default in-page relay function name
pub const DEFAULT_LOG_FUNCTION: &str = "log";

/// Builds the script injected before page scripts run
#[derive(Debug, Clone)]
pub struct InstrumentationBuilder {
    log_function: String,
    bindings: Vec<Binding>,
}

impl Default for InstrumentationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstrumentationBuilder {
    /// Builder over the default instrumentation table
    pub fn new() -> Self {
        Self {
            log_function: DEFAULT_LOG_FUNCTION.to_string(),
            bindings: default_bindings(),
        }
    }

    /// Builder with no bindings
    pub fn empty() -> Self {
        Self {
            log_function: DEFAULT_LOG_FUNCTION.to_string(),
            bindings: Vec::new(),
        }
    }

    /// Builder matching a scan configuration
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            log_function: config.log_function.clone(),
            bindings: config.bindings.clone(),
        }
    }

    /// Set the relay function events are emitted through
    pub fn log_function(mut self, name: impl Into<String>) -> Self {
        self.log_function = name.into();
        self
    }

    /// Add a binding
    pub fn binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Bindings that will be installed, in order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Generate the instrumentation script
    pub fn build(&self) -> String {
        let mut script = INSTRUMENTATION_RUNTIME.replace("__FP_LOG__", &js_string(&self.log_function));

        for binding in &self.bindings {
            script.push_str(&Self::install_call(binding));
        }

        script.push_str(INSTRUMENTATION_EPILOGUE);
        script
    }

    fn install_call(binding: &Binding) -> String {
        let properties = binding
            .properties
            .iter()
            .map(|p| js_string(p))
            .collect::<Vec<_>>()
            .join(", ");
        let kind = match binding.kind {
            BindingKind::Object => "object",
            BindingKind::Accessor => "accessor",
        };

        format!(
            "    install(function () {{ return {}; }}, {}, [{}], {}, {});\n",
            binding.target.expression(),
            js_string(binding.target.display_name()),
            properties,
            js_string(binding.category.channel()),
            js_string(kind),
        )
    }
}

/// Quote a string as a JavaScript literal
fn js_string(value: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::Value::String(value.to_string()).to_string()
}

/// Instrumentation script for the default table and relay
pub fn instrumentation_script() -> String {
    InstrumentationBuilder::new().build()
}
