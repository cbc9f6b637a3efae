//! Log records, before and after rendering.
//!
//! A [`RawRecord`] is a log statement as the control-flow model describes it:
//! a printf-style template plus argument values. A [`TraceRecord`] is the
//! rendered, timestamped entry written to a trace file.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `ApID` of scenario meta-markers; never compared.
pub const SCENARIO_AP_ID: &str = "SCENARIO";

/// `ApID` of records injected by the mutation engine.
pub const INJECT_AP_ID: &str = "INJECT";

/// The only record `Type` the writer produces.
pub const RECORD_TYPE_LOG: &str = "LOG";

/// Severity of a log statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Unrecoverable failure
    Fatal,
    /// Recoverable failure
    Error,
    /// Unexpected but handled
    Warn,
    /// Normal operation
    Info,
    /// Diagnostic detail
    Debug,
}

impl LogLevel {
    /// All levels, most severe first
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// Wire name of the level
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Whether this is the `FATAL` level
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| CoreError::InvalidLogLevel {
                level: s.to_string(),
            })
    }
}

/// One argument of a log statement.
///
/// Numbers and booleans are literals. Strings are either literals
/// (`"\"ready\""`, `"3.5"`, `"a + b"`) or symbolic expressions naming a
/// variable (`"speed"`), which the renderer cannot know the value of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Floating-point literal
    Float(f64),
    /// String literal or symbolic expression
    Text(String),
}

impl ArgValue {
    /// Whether the value is known at generation time
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => true,
            Self::Text(text) => !is_identifier(text),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Bare C identifier: `[A-Za-z_][A-Za-z0-9_]*`
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A log statement ready to be rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Severity name
    pub level: String,
    /// Application id
    #[serde(rename = "apId")]
    pub ap_id: String,
    /// Context id
    #[serde(rename = "ctId")]
    pub ct_id: String,
    /// printf-style message
    pub message_template: String,
    /// Arguments for the message specifiers
    #[serde(default)]
    pub values: Vec<ArgValue>,
}

impl RawRecord {
    /// Record without arguments
    pub fn new(
        level: impl Into<String>,
        ap_id: impl Into<String>,
        ct_id: impl Into<String>,
        message_template: impl Into<String>,
    ) -> Self {
        Self {
            level: level.into(),
            ap_id: ap_id.into(),
            ct_id: ct_id.into(),
            message_template: message_template.into(),
            values: Vec::new(),
        }
    }

    /// Attach argument values
    #[must_use]
    pub fn with_values(mut self, values: Vec<ArgValue>) -> Self {
        self.values = values;
        self
    }

    /// Reduce a rendered record back to raw form. The payload becomes a
    /// literal, argument-free template: `%` is escaped so re-rendering
    /// reproduces it exactly.
    #[must_use]
    pub fn from_rendered(record: &TraceRecord) -> Self {
        Self {
            level: record.log_level.clone(),
            ap_id: record.ap_id.clone(),
            ct_id: record.ct_id.clone(),
            message_template: record.payload.replace('%', "%%"),
            values: Vec::new(),
        }
    }
}

/// A rendered trace entry, serialized with DLT field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Position in the trace, from 1
    #[serde(rename = "Index")]
    pub index: u64,
    /// Seconds since the epoch
    #[serde(rename = "Timestamp")]
    pub timestamp: f64,
    /// `Timestamp` rendered as UTC text
    #[serde(rename = "Time")]
    pub time: String,
    /// Emitting ECU
    #[serde(rename = "ECUId")]
    pub ecu_id: String,
    /// Application id
    #[serde(rename = "ApID")]
    pub ap_id: String,
    /// Context id
    #[serde(rename = "CtID")]
    pub ct_id: String,
    /// Trace session
    #[serde(rename = "SessionID")]
    pub session_id: u64,
    /// Record type, always `LOG`
    #[serde(rename = "Type")]
    pub record_type: String,
    /// Severity name
    #[serde(rename = "LogLevel")]
    pub log_level: String,
    /// Rendered message
    #[serde(rename = "Payload")]
    pub payload: String,
}

impl TraceRecord {
    /// Whether this is a scenario meta-marker rather than an application event
    #[must_use]
    pub fn is_scenario_marker(&self) -> bool {
        self.ap_id == SCENARIO_AP_ID
    }

    /// Whether this record was injected by the mutation engine
    #[must_use]
    pub fn is_injected(&self) -> bool {
        self.ap_id == INJECT_AP_ID
    }
}
