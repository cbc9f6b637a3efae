//! Comparison reports.

use crate::deviation::{Deviation, DeviationType};
use oracle_core::now_rfc3339;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Overall verdict of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonStatus {
    /// No deviations
    Clean,
    /// At least one deviation
    DeviationDetected,
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => f.write_str("CLEAN"),
            Self::DeviationDetected => f.write_str("DEVIATION_DETECTED"),
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// RFC 3339 UTC generation time
    #[serde(rename = "reportGeneratedAt")]
    pub generated_at: String,
    /// Base name of the candidate trace
    #[serde(rename = "analyzedTraceFile")]
    pub analyzed_trace_file: String,
}

/// Counts per deviation type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Clean or deviating
    pub status: ComparisonStatus,
    /// Number of deviations
    #[serde(rename = "totalDeviations")]
    pub total_deviations: usize,
    /// Deviation count per type
    #[serde(rename = "deviationTypes")]
    pub deviation_types: BTreeMap<DeviationType, usize>,
}

impl ComparisonSummary {
    /// Summarize `deviations`
    #[must_use]
    pub fn from_deviations(deviations: &[Deviation]) -> Self {
        let mut deviation_types = BTreeMap::new();
        for deviation in deviations {
            *deviation_types.entry(deviation.kind).or_insert(0) += 1;
        }
        Self {
            status: if deviations.is_empty() {
                ComparisonStatus::Clean
            } else {
                ComparisonStatus::DeviationDetected
            },
            total_deviations: deviations.len(),
            deviation_types,
        }
    }

    /// Count of one deviation type
    #[must_use]
    pub fn count(&self, kind: DeviationType) -> usize {
        self.deviation_types.get(&kind).copied().unwrap_or(0)
    }
}

/// Full result of comparing one candidate against its reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Provenance
    pub metadata: ReportMetadata,
    /// Counts and verdict
    #[serde(rename = "comparisonSummary")]
    pub summary: ComparisonSummary,
    /// Deviations in discovery order
    pub deviations: Vec<Deviation>,
}

impl ComparisonReport {
    /// Build a report stamped with the current time
    #[must_use]
    pub fn new(analyzed_file: &str, deviations: Vec<Deviation>) -> Self {
        Self {
            metadata: ReportMetadata {
                generated_at: now_rfc3339(),
                analyzed_trace_file: analyzed_file.to_string(),
            },
            summary: ComparisonSummary::from_deviations(&deviations),
            deviations,
        }
    }

    /// Override the generation time
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: &str) -> Self {
        self.metadata.generated_at = generated_at.to_string();
        self
    }

    /// Whether no deviation was found
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.summary.status == ComparisonStatus::Clean
    }

    /// One-line summary
    #[must_use]
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{}: {} ({} deviations)",
            self.metadata.analyzed_trace_file, self.summary.status, self.summary.total_deviations
        );
        for (kind, count) in &self.summary.deviation_types {
            line.push_str(&format!(", {kind}={count}"));
        }
        line
    }
}
