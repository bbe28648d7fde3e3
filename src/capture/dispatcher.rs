// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Log channel dispatch for one scan

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::category::Category;
use super::message::LogMessage;
use super::policy::PolicySet;
use super::stack::CallStack;
use super::state::CategoryState;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::evidence::{self, FingerprintingReport};

/// Outcome of delivering one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Routed to the category's aggregator
    Accepted(Category),
    /// Channel is not a fingerprinting channel
    Ignored,
}

/// Event counters for a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    pub started_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub accepted: usize,
    pub ignored: usize,
    pub rejected: usize,
}

impl ScanStats {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finalized_at: None,
            accepted: 0,
            ignored: 0,
            rejected: 0,
        }
    }
}

/// Aggregation state of one page visit
///
/// Created fresh per scan, fed by [`FingerprintScan::receive`] while the page
/// runs, and consumed by [`FingerprintScan::finalize`], after which no further
/// events can be recorded.
#[derive(Debug, Clone)]
pub struct FingerprintScan {
    states: [CategoryState; 4],
    persist_canvas_image: bool,
    stats: ScanStats,
}

impl Default for FingerprintScan {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintScan {
    /// Scan with the baseline policies
    pub fn new() -> Self {
        Self::with_policies(PolicySet::baseline())
    }

    /// Scan with custom per-category policies
    pub fn with_policies(policies: PolicySet) -> Self {
        Self {
            states: Category::ALL.map(|c| CategoryState::new(c, policies.get(c).clone())),
            persist_canvas_image: true,
            stats: ScanStats::new(),
        }
    }

    /// Scan configured from a [`ScanConfig`]
    pub fn from_config(config: &ScanConfig) -> Self {
        let mut scan = Self::with_policies(config.policies.clone());
        scan.persist_canvas_image = config.persist_canvas_image;
        scan
    }

    /// Deliver one raw event relayed from the page
    ///
    /// Unknown channels are ignored. A message that does not match the shape
    /// its category expects is rejected with [`crate::Error::InvalidMessage`]
    /// and leaves the state untouched.
    pub fn receive(&mut self, channel: &str, message: &Value, call_stack: CallStack) -> Result<Delivery> {
        let Some(category) = Category::from_channel(channel) else {
            self.stats.ignored += 1;
            tracing::trace!(channel, "Ignoring event on unknown channel");
            return Ok(Delivery::Ignored);
        };

        let parsed = match LogMessage::from_value(channel, message) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.stats.rejected += 1;
                tracing::warn!(channel, error = %e, "Rejected malformed fingerprinting event");
                return Err(e);
            }
        };

        self.receive_message(category, parsed, call_stack)?;
        Ok(Delivery::Accepted(category))
    }

    /// Deliver an already validated message
    pub fn receive_message(
        &mut self,
        category: Category,
        message: LogMessage,
        call_stack: CallStack,
    ) -> Result<()> {
        tracing::debug!(%category, name = message.name(), "Fingerprinting event");

        let state = &mut self.states[category.index()];
        match state.ingest(message, call_stack.strip_wrapper()) {
            Ok(()) => {
                self.stats.accepted += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.rejected += 1;
                tracing::warn!(%category, error = %e, "Rejected fingerprinting event");
                Err(e)
            }
        }
    }

    /// Current state of a category
    pub fn state(&self, category: Category) -> &CategoryState {
        &self.states[category.index()]
    }

    /// Event counters so far
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Produce the verdicts; the scan cannot be used afterwards
    pub fn finalize(self) -> FingerprintingReport {
        let mut stats = self.stats;
        stats.finalized_at = Some(Utc::now());
        evidence::finalize(self.states, self.persist_canvas_image, stats)
    }
}
