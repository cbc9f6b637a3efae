//! Structural validation of trace files.
//!
//! Works on the untyped JSON document so that one bad record is reported
//! with its position instead of failing the whole decode.

use crate::encoding::read_text;
use crate::format::{ERROR_MARKER_PREFIX, FALLBACK_STRING};
use once_cell::sync::Lazy;
use oracle_core::{LogLevel, RECORD_TYPE_LOG, parse_time};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;

/// Field names every trace record carries
pub const TRACE_FIELDS: [&str; 10] = [
    "Index",
    "Timestamp",
    "Time",
    "ECUId",
    "ApID",
    "CtID",
    "SessionID",
    "Type",
    "LogLevel",
    "Payload",
];

static UNRESOLVED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%[-+#0]*\d*(?:\.\d+)?[hljztL]*[diuxXofeEgGscp]")
        .expect("placeholder pattern is valid")
});

/// Result of validating one trace file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// File (or other source) that was validated
    pub file: String,
    /// Number of records seen
    pub record_count: usize,
    /// Problems that make the trace unusable as an oracle input
    pub errors: Vec<String>,
    /// Suspicious but tolerated content
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create an empty report for `file`
    #[must_use]
    pub fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            ..Self::default()
        }
    }

    /// Whether no errors were found
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether neither errors nor warnings were found
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Validation {} for {}: {} records, {} errors, {} warnings",
            if self.passed() { "PASSED" } else { "FAILED" },
            self.file,
            self.record_count,
            self.errors.len(),
            self.warnings.len()
        )
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Validator for generated trace files
#[derive(Debug, Clone, PartialEq)]
pub struct TraceValidator {
    /// Largest tolerated gap between `Time` and `Timestamp`, in seconds
    pub max_time_skew_secs: f64,
}

impl Default for TraceValidator {
    fn default() -> Self {
        Self {
            max_time_skew_secs: 1.0,
        }
    }
}

/// Running cross-record state
#[derive(Default)]
struct Sequence {
    expected_index: Option<u64>,
    last_timestamp: Option<f64>,
    session_id: Option<u64>,
}

impl TraceValidator {
    /// Validator with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a file on disk
    #[must_use]
    pub fn validate_file(&self, path: &Path) -> ValidationReport {
        let origin = path.display().to_string();
        match read_text(path) {
            Ok(json) => self.validate_str(&json, &origin),
            Err(err) => {
                let mut report = ValidationReport::new(&origin);
                report.error(err.to_string());
                report
            }
        }
    }

    /// Validate JSON text
    #[must_use]
    pub fn validate_str(&self, json: &str, origin: &str) -> ValidationReport {
        match serde_json::from_str::<Value>(json) {
            Ok(doc) => self.validate(&doc, origin),
            Err(err) => {
                let mut report = ValidationReport::new(origin);
                report.error(format!("Invalid JSON: {err}"));
                report
            }
        }
    }

    /// Validate a parsed document
    #[must_use]
    pub fn validate(&self, doc: &Value, origin: &str) -> ValidationReport {
        let mut report = ValidationReport::new(origin);
        let Some(records) = doc.as_array() else {
            report.error("Document is not a list of records".to_string());
            return report;
        };

        report.record_count = records.len();
        if records.is_empty() {
            report.warn("Trace is empty".to_string());
            return report;
        }

        let mut sequence = Sequence::default();
        for (position, value) in records.iter().enumerate() {
            let label = format!("record #{}", position + 1);
            match value.as_object() {
                Some(record) => self.check_record(&label, record, &mut sequence, &mut report),
                None => report.error(format!("{label}: not an object")),
            }
        }

        tracing::debug!(
            file = origin,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated trace"
        );
        report
    }

    fn check_record(
        &self,
        label: &str,
        record: &Map<String, Value>,
        sequence: &mut Sequence,
        report: &mut ValidationReport,
    ) {
        let missing: Vec<&str> = TRACE_FIELDS
            .iter()
            .copied()
            .filter(|field| !record.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            report.error(format!("{label}: missing fields {}", missing.join(", ")));
        }

        check_index(label, record.get("Index"), sequence, report);
        let timestamp = check_timestamp(label, record.get("Timestamp"), sequence, report);
        self.check_time(label, record.get("Time"), timestamp, report);
        check_session(label, record.get("SessionID"), sequence, report);

        if let Some(level) = record.get("LogLevel") {
            let known = level.as_str().is_some_and(|l| LogLevel::from_str(l).is_ok());
            if !known {
                report.error(format!("{label}: unknown LogLevel {level}"));
            }
        }

        if let Some(kind) = record.get("Type") {
            if kind.as_str() != Some(RECORD_TYPE_LOG) {
                report.warn(format!("{label}: Type is {kind}, expected \"LOG\""));
            }
        }

        if let Some(payload) = record.get("Payload").and_then(Value::as_str) {
            check_payload(label, payload, report);
        }
    }

    fn check_time(
        &self,
        label: &str,
        time: Option<&Value>,
        timestamp: Option<f64>,
        report: &mut ValidationReport,
    ) {
        let Some(time) = time else { return };
        let Some(text) = time.as_str() else {
            report.error(format!("{label}: Time is not a string"));
            return;
        };
        let Some(parsed) = parse_time(text) else {
            report.error(format!("{label}: Time '{text}' is not YYYY-MM-DD HH:MM:SS[.fff]"));
            return;
        };
        if let Some(timestamp) = timestamp {
            let skew = (parsed - timestamp).abs();
            if skew > self.max_time_skew_secs {
                report.warn(format!(
                    "{label}: Time '{text}' is {skew:.3}s away from Timestamp {timestamp}"
                ));
            }
        }
    }
}

fn check_index(
    label: &str,
    index: Option<&Value>,
    sequence: &mut Sequence,
    report: &mut ValidationReport,
) {
    let Some(index) = index else { return };
    let Some(index) = index.as_u64() else {
        report.error(format!("{label}: Index {index} is not a non-negative integer"));
        return;
    };
    let expected = sequence.expected_index.unwrap_or(1);
    if index != expected {
        report.error(format!("{label}: Index {index}, expected {expected}"));
    }
    sequence.expected_index = Some(index + 1);
}

fn check_timestamp(
    label: &str,
    timestamp: Option<&Value>,
    sequence: &mut Sequence,
    report: &mut ValidationReport,
) -> Option<f64> {
    let timestamp = timestamp?;
    let Some(value) = timestamp.as_f64() else {
        report.error(format!("{label}: Timestamp {timestamp} is not a number"));
        return None;
    };
    if let Some(previous) = sequence.last_timestamp {
        if value <= previous {
            report.warn(format!(
                "{label}: Timestamp {value} does not increase (previous {previous})"
            ));
        }
    }
    sequence.last_timestamp = Some(value);
    Some(value)
}

fn check_session(
    label: &str,
    session: Option<&Value>,
    sequence: &mut Sequence,
    report: &mut ValidationReport,
) {
    let Some(session) = session else { return };
    let Some(id) = session.as_u64() else {
        report.error(format!("{label}: SessionID {session} is not an integer"));
        return;
    };
    match sequence.session_id {
        None => sequence.session_id = Some(id),
        Some(first) if first != id => {
            report.error(format!("{label}: SessionID {id} differs from {first}"));
        }
        Some(_) => {}
    }
}

fn check_payload(label: &str, payload: &str, report: &mut ValidationReport) {
    if payload.contains(ERROR_MARKER_PREFIX) {
        report.warn(format!("{label}: payload carries a formatting error marker"));
    }
    if payload.contains(FALLBACK_STRING) {
        report.warn(format!("{label}: payload carries a fallback string"));
    }
    if UNRESOLVED.is_match(&payload.replace("%%", "")) {
        report.warn(format!("{label}: payload has an unresolved placeholder"));
    }
}
