//! Deviations: classified differences between a reference and a candidate.

use oracle_core::TraceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviationType {
    /// A reference record has no counterpart in the candidate
    MissingLog,
    /// A candidate record has no counterpart in the reference
    ExtraLog,
    /// Aligned records differ
    LogMismatch,
}

impl DeviationType {
    /// Wire name of the type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingLog => "MISSING_LOG",
            Self::ExtraLog => "EXTRA_LOG",
            Self::LogMismatch => "LOG_MISMATCH",
        }
    }
}

impl fmt::Display for DeviationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The candidate record involved in a deviation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundDetails {
    /// Index in the candidate trace
    #[serde(rename = "Index")]
    pub index: u64,
    /// Severity name
    #[serde(rename = "LogLevel")]
    pub log_level: String,
    /// Application id
    #[serde(rename = "ApID")]
    pub ap_id: String,
    /// Context id
    #[serde(rename = "CtID")]
    pub ct_id: String,
    /// Rendered message
    #[serde(rename = "Payload")]
    pub payload: String,
}

impl From<&TraceRecord> for FoundDetails {
    fn from(record: &TraceRecord) -> Self {
        Self {
            index: record.index,
            log_level: record.log_level.clone(),
            ap_id: record.ap_id.clone(),
            ct_id: record.ct_id.clone(),
            payload: record.payload.clone(),
        }
    }
}

/// The reference record involved in a deviation; positions are not kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedBehavior {
    /// Severity name
    #[serde(rename = "LogLevel")]
    pub log_level: String,
    /// Application id
    #[serde(rename = "ApID")]
    pub ap_id: String,
    /// Context id
    #[serde(rename = "CtID")]
    pub ct_id: String,
    /// Rendered message
    #[serde(rename = "Payload")]
    pub payload: String,
}

impl From<&TraceRecord> for ExpectedBehavior {
    fn from(record: &TraceRecord) -> Self {
        Self {
            log_level: record.log_level.clone(),
            ap_id: record.ap_id.clone(),
            ct_id: record.ct_id.clone(),
            payload: record.payload.clone(),
        }
    }
}

/// One classified difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deviation {
    /// Deviation type
    #[serde(rename = "type")]
    pub kind: DeviationType,
    /// Candidate record, absent for missing logs
    #[serde(rename = "foundDetails", default, skip_serializing_if = "Option::is_none")]
    pub found: Option<FoundDetails>,
    /// Reference record, absent for extra logs
    #[serde(rename = "expectedBehavior", default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedBehavior>,
    /// Human-readable explanation
    pub description: String,
}

impl Deviation {
    /// `expected` is absent from the candidate
    #[must_use]
    pub fn missing(expected: &TraceRecord) -> Self {
        Self {
            kind: DeviationType::MissingLog,
            found: None,
            expected: Some(expected.into()),
            description: format!(
                "Expected log is missing. Expected: [{}] {}",
                expected.log_level, expected.payload
            ),
        }
    }

    /// `found` has no counterpart in the reference
    #[must_use]
    pub fn extra(found: &TraceRecord) -> Self {
        Self {
            kind: DeviationType::ExtraLog,
            found: Some(found.into()),
            expected: None,
            description: format!("Unexpected log found at index {}.", found.index),
        }
    }

    /// `expected` and `found` were aligned but differ
    #[must_use]
    pub fn mismatch(expected: &TraceRecord, found: &TraceRecord) -> Self {
        let fields = differing_fields(expected, found);
        let description = if fields.is_empty() {
            format!("Unspecified content mismatch at index {}.", found.index)
        } else {
            format!(
                "Mismatch on log at index {}. Affected field(s): {}.",
                found.index,
                fields.join(", ")
            )
        };
        Self {
            kind: DeviationType::LogMismatch,
            found: Some(found.into()),
            expected: Some(expected.into()),
            description,
        }
    }
}

fn differing_fields(expected: &TraceRecord, found: &TraceRecord) -> Vec<String> {
    let mut fields = Vec::new();
    let mut compare = |name: &str, want: &str, got: &str| {
        if want != got {
            fields.push(format!("{name} (expected: '{want}', found: '{got}')"));
        }
    };
    compare("LogLevel", &expected.log_level, &found.log_level);
    compare("ApID", &expected.ap_id, &found.ap_id);
    compare("CtID", &expected.ct_id, &found.ct_id);
    if expected.payload != found.payload {
        fields.push("Payload".to_string());
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u64, level: &str, ct_id: &str, payload: &str) -> TraceRecord {
        TraceRecord {
            index,
            timestamp: 100.0 + index as f64,
            time: "1970-01-01 00:01:41.000".to_string(),
            ecu_id: "SIM_ECU_01".to_string(),
            ap_id: "ECM".to_string(),
            ct_id: ct_id.to_string(),
            session_id: 1,
            record_type: "LOG".to_string(),
            log_level: level.to_string(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_missing_description() {
        let deviation = Deviation::missing(&record(3, "WARN", "C", "low fuel"));
        assert_eq!(deviation.kind, DeviationType::MissingLog);
        assert!(deviation.found.is_none());
        assert_eq!(deviation.description, "Expected log is missing. Expected: [WARN] low fuel");
    }

    #[test]
    fn test_mismatch_lists_fields() {
        let deviation = Deviation::mismatch(
            &record(2, "INFO", "A", "x"),
            &record(5, "ERROR", "A", "y"),
        );
        assert_eq!(
            deviation.description,
            "Mismatch on log at index 5. Affected field(s): LogLevel (expected: 'INFO', found: 'ERROR'), Payload."
        );
        assert_eq!(deviation.found.unwrap().index, 5);
    }

    #[test]
    fn test_serialized_shape() {
        let deviation = Deviation::extra(&record(4, "WARN", "UNEXPECTED", "boo"));
        let value = serde_json::to_value(&deviation).unwrap();
        assert_eq!(value["type"], "EXTRA_LOG");
        assert_eq!(value["foundDetails"]["Index"], 4);
        assert_eq!(value["foundDetails"]["CtID"], "UNEXPECTED");
        assert!(value.get("expectedBehavior").is_none());
        assert_eq!(value["description"], "Unexpected log found at index 4.");
    }
}
