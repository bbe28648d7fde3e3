// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan configuration

use serde::{Deserialize, Serialize};

use crate::capture::{Category, CategoryPolicy, PolicySet, StackCapture};
use crate::error::{Error, Result};
use crate::instrument::{default_bindings, Binding, DEFAULT_LOG_FUNCTION};

/// Fingerprinting scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// In-page function the instrumentation relays events through
    pub log_function: String,
    /// APIs to instrument
    pub bindings: Vec<Binding>,
    /// Per-category aggregation policies
    pub policies: PolicySet,
    /// Decode and attach the exported canvas image on a positive canvas verdict
    pub persist_canvas_image: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            log_function: DEFAULT_LOG_FUNCTION.to_string(),
            bindings: default_bindings(),
            policies: PolicySet::baseline(),
            persist_canvas_image: true,
        }
    }
}

impl ScanConfig {
    /// Create a new scan config
    pub fn new() -> Self {
        Self::default()
    }

    /// Only canvas exports are kept as evidence
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Also keep the first call stack seen on Audio, WebGL and Misc, which
    /// flags those categories whenever they are used at all
    pub fn forensic() -> Self {
        Self {
            policies: PolicySet::forensic(),
            ..Default::default()
        }
    }

    /// Set the relay function name
    pub fn log_function(mut self, name: impl Into<String>) -> Self {
        self.log_function = name.into();
        self
    }

    /// Replace the instrumentation table
    pub fn bindings(mut self, bindings: Vec<Binding>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the policy of one category
    pub fn policy(mut self, category: Category, policy: CategoryPolicy) -> Self {
        self.policies = self.policies.set(category, policy);
        self
    }

    /// Change only the stack capture trigger of one category
    pub fn stack_capture(self, category: Category, capture: StackCapture) -> Self {
        let policy = self.policies.get(category).clone().with_stack_capture(capture);
        self.policy(category, policy)
    }

    /// Enable/disable canvas image persistence
    pub fn persist_canvas_image(mut self, persist: bool) -> Self {
        self.persist_canvas_image = persist;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.log_function.trim().is_empty() {
            return Err(Error::config("log_function must not be empty"));
        }
        if self.bindings.is_empty() {
            return Err(Error::config("no APIs to instrument"));
        }
        if let Some(binding) = self.bindings.iter().find(|b| b.properties.is_empty()) {
            return Err(Error::config(format!(
                "binding for {} has no properties",
                binding.target.display_name()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_function, "log");
        assert_eq!(config.policies, PolicySet::baseline());
    }

    #[test]
    fn test_builder() {
        let config = ScanConfig::new()
            .log_function("__fpRelay")
            .stack_capture(Category::Audio, StackCapture::FirstCall)
            .persist_canvas_image(false);

        assert_eq!(config.log_function, "__fpRelay");
        assert_eq!(config.policies.audio.stack_capture, StackCapture::FirstCall);
        assert_eq!(config.policies.webgl.stack_capture, StackCapture::Never);
        assert!(!config.persist_canvas_image);
    }

    #[test]
    fn test_validation() {
        assert!(ScanConfig::new().log_function(" ").validate().is_err());
        assert!(ScanConfig::new().bindings(vec![]).validate().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = serde_json::to_string(&ScanConfig::forensic()).unwrap();
        let config: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, ScanConfig::forensic());
    }
}
