// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page-to-host log messages and the records aggregated from them

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Accessor direction of a property event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Get,
    Set,
}

/// Message emitted by an instrumentation wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogMessage {
    /// A wrapped method was called
    Function {
        name: String,
        arguments: Vec<Value>,
        /// `undefined` return values are dropped by JSON encoding
        #[serde(default)]
        retval: Value,
    },
    /// A wrapped accessor was read or written
    Property {
        name: String,
        #[serde(default)]
        value: Value,
        access: Access,
    },
}

impl LogMessage {
    /// Validate a raw message received on `channel`
    pub fn from_value(channel: &str, message: &Value) -> Result<Self> {
        serde_json::from_value(message.clone()).map_err(|e| {
            Error::invalid_message(channel, e.to_string()).with_message(message.clone())
        })
    }

    /// Instrumented name (`Object.method` or bare property)
    pub fn name(&self) -> &str {
        match self {
            LogMessage::Function { name, .. } | LogMessage::Property { name, .. } => name,
        }
    }

    /// Shorthand for a function message
    pub fn function(name: impl Into<String>, arguments: Vec<Value>, retval: Value) -> Self {
        LogMessage::Function {
            name: name.into(),
            arguments,
            retval,
        }
    }

    /// Shorthand for a property message
    pub fn property(name: impl Into<String>, value: Value, access: Access) -> Self {
        LogMessage::Property {
            name: name.into(),
            value,
            access,
        }
    }
}

/// One intercepted function invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub method: String,
    pub arguments: Vec<Value>,
}

/// One observed property value
///
/// Gets and sets of the same value are the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccessRecord {
    pub property: String,
    pub value: Value,
}

/// Stored entry of a category's call list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Call(CallRecord),
    Access(PropertyAccessRecord),
}

impl Record {
    /// Build a call record
    pub fn call(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Record::Call(CallRecord {
            method: method.into(),
            arguments,
        })
    }

    /// Build a property access record
    pub fn access(property: impl Into<String>, value: Value) -> Self {
        Record::Access(PropertyAccessRecord {
            property: property.into(),
            value,
        })
    }

    /// Method name for call records
    pub fn method(&self) -> Option<&str> {
        match self {
            Record::Call(call) => Some(&call.method),
            Record::Access(_) => None,
        }
    }

    /// Property name for access records
    pub fn property(&self) -> Option<&str> {
        match self {
            Record::Access(access) => Some(&access.property),
            Record::Call(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_function_message() {
        let raw = json!({
            "type": "function",
            "name": "CanvasRenderingContext2D.fillText",
            "arguments": ["Cwm fjordbank", 2, 15]
        });
        let msg = LogMessage::from_value("fingerprinting:canvas", &raw).unwrap();

        assert_eq!(msg.name(), "CanvasRenderingContext2D.fillText");
        match msg {
            LogMessage::Function { arguments, retval, .. } => {
                assert_eq!(arguments.len(), 3);
                assert_eq!(retval, Value::Null);
            }
            _ => panic!("Expected function message"),
        }
    }

    #[test]
    fn test_parse_property_message() {
        let raw = json!({"type": "property", "name": "colorDepth", "value": 24, "access": "get"});
        let msg = LogMessage::from_value("fingerprinting:misc", &raw).unwrap();
        assert_eq!(msg, LogMessage::property("colorDepth", json!(24), Access::Get));
    }

    #[test]
    fn test_reject_unknown_shape() {
        let raw = json!({"name": "userAgent", "value": "X"});
        let err = LogMessage::from_value("fingerprinting:misc", &raw).unwrap_err();
        assert!(err.is_contract_violation());

        let raw = json!({"type": "function", "name": "AudioContext.createAnalyser"});
        assert!(LogMessage::from_value("fingerprinting:audio", &raw).is_err());
    }

    #[test]
    fn test_record_serialization_shape() {
        let call = Record::call("Storage.setItem", vec![json!("k"), json!("v")]);
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"method": "Storage.setItem", "arguments": ["k", "v"]})
        );

        let access = Record::access("userAgent", json!("X"));
        assert_eq!(
            serde_json::to_value(&access).unwrap(),
            json!({"property": "userAgent", "value": "X"})
        );
        assert_eq!(access.property(), Some("userAgent"));
        assert_eq!(access.method(), None);
    }
}
