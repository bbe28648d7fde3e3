// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for fpwatch
//!
//! Contract violations between the in-page instrumentation and the host-side
//! aggregators surface as [`Error::InvalidMessage`] with the offending channel
//! and message attached, so they can be traced back to the emitting wrapper.

use thiserror::Error;

/// Result type alias for fpwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fpwatch
#[derive(Error, Debug)]
pub enum Error {
    /// A log message did not match the shape its category expects
    #[error("Invalid message on {channel}: {reason}")]
    InvalidMessage {
        channel: String,
        reason: String,
        message: Option<serde_json::Value>,
    },

    /// JavaScript execution failed in the emulated page
    #[error("JavaScript error: {message}")]
    JavaScript {
        message: String,
        script: Option<String>,
    },

    /// The scan has already produced its verdict
    #[error("Scan already finalized")]
    AlreadyFinalized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid message error
    pub fn invalid_message(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidMessage {
            channel: channel.into(),
            reason: reason.into(),
            message: None,
        }
    }

    /// Create a new JavaScript error
    pub fn js<S: Into<String>>(msg: S) -> Self {
        Error::JavaScript {
            message: msg.into(),
            script: None,
        }
    }

    /// Create a JavaScript error naming the script that failed
    pub fn js_in_script(msg: impl Into<String>, script: impl Into<String>) -> Self {
        Error::JavaScript {
            message: msg.into(),
            script: Some(script.into()),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Attach the offending message to an invalid message error
    pub fn with_message(mut self, value: serde_json::Value) -> Self {
        if let Error::InvalidMessage {
            ref mut message, ..
        } = self
        {
            *message = Some(value);
        }
        self
    }

    /// Check if this is an instrumentation contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::InvalidMessage { .. })
    }

    /// Channel the error was raised on, if any
    pub fn channel(&self) -> Option<&str> {
        match self {
            Error::InvalidMessage { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
