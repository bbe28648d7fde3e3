// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-category aggregation state

use serde_json::Value;

use super::category::Category;
use super::message::{LogMessage, Record};
use super::policy::{CategoryPolicy, DedupMode, MISC_TRACKED_PROPERTIES};
use super::stack::CallStack;
use crate::error::{Error, Result};

/// Accumulated observations for one category during a scan
#[derive(Debug, Clone)]
pub struct CategoryState {
    category: Category,
    policy: CategoryPolicy,
    calls: Vec<Record>,
    captured_stack: Option<CallStack>,
    captured_retval: Option<Value>,
}

impl CategoryState {
    /// Create an empty state
    pub fn new(category: Category, policy: CategoryPolicy) -> Self {
        Self {
            category,
            policy,
            calls: Vec::new(),
            captured_stack: None,
            captured_retval: None,
        }
    }

    /// Record one event; `call_stack` must already have the wrapper frame stripped
    pub fn ingest(&mut self, message: LogMessage, call_stack: CallStack) -> Result<()> {
        let record = self.to_record(&message)?;

        match self.policy.dedup {
            DedupMode::KeepAll => self.calls.push(record),
            DedupMode::Distinct => {
                if !self.calls.contains(&record) {
                    self.calls.push(record);
                }
            }
        }

        if self
            .policy
            .stack_capture
            .triggers(message.name(), self.captured_stack.is_some())
        {
            tracing::debug!(
                category = %self.category,
                name = message.name(),
                frames = call_stack.len(),
                "Captured call stack"
            );
            self.captured_stack = Some(call_stack);
            if self.policy.keep_capture_retval {
                if let LogMessage::Function { retval, .. } = message {
                    self.captured_retval = Some(retval);
                }
            }
        }

        Ok(())
    }

    /// Convert a message into the record shape this category stores
    fn to_record(&self, message: &LogMessage) -> Result<Record> {
        let tracked = MISC_TRACKED_PROPERTIES.contains(&message.name());

        match (self.category, message) {
            (Category::Misc, LogMessage::Property { name, value, .. }) if tracked => {
                Ok(Record::access(name.clone(), value.clone()))
            }
            (Category::Misc, LogMessage::Function { name, arguments, .. }) if !tracked => {
                Ok(Record::call(name.clone(), arguments.clone()))
            }
            (Category::Misc, _) => Err(Error::invalid_message(
                self.category.channel(),
                format!(
                    "'{}' is neither a tracked property nor a method call",
                    message.name()
                ),
            )),
            (_, LogMessage::Function { name, arguments, .. }) => {
                Ok(Record::call(name.clone(), arguments.clone()))
            }
            (_, LogMessage::Property { name, .. }) => Err(Error::invalid_message(
                self.category.channel(),
                format!("unexpected property event '{}'", name),
            )),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn policy(&self) -> &CategoryPolicy {
        &self.policy
    }

    /// Stored records in arrival order
    pub fn calls(&self) -> &[Record] {
        &self.calls
    }

    /// Stack of the event that last triggered a capture
    pub fn captured_stack(&self) -> Option<&CallStack> {
        self.captured_stack.as_ref()
    }

    /// Return value kept alongside the captured stack
    pub fn captured_retval(&self) -> Option<&Value> {
        self.captured_retval.as_ref()
    }

    /// Whether any record used one of `methods`
    pub fn used_any(&self, methods: &[&str]) -> bool {
        self.calls
            .iter()
            .filter_map(Record::method)
            .any(|m| methods.contains(&m))
    }

    /// Split into the parts the finalizer consumes
    pub(crate) fn into_parts(self) -> (Vec<Record>, Option<CallStack>, Option<Value>) {
        (self.calls, self.captured_stack, self.captured_retval)
    }
}
