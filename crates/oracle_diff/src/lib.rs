//! TRACE.ORACLE Trace Comparison
//!
//! Aligns a candidate trace against its reference with a one-record
//! lookahead and classifies every difference as a missing, extra or
//! mismatched log. Results are wrapped in JSON reports with a per-type
//! histogram.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compare;
pub mod deviation;
pub mod report;

pub use compare::{TraceComparator, similar};
pub use deviation::{Deviation, DeviationType, ExpectedBehavior, FoundDetails};
pub use report::{ComparisonReport, ComparisonStatus, ComparisonSummary, ReportMetadata};
