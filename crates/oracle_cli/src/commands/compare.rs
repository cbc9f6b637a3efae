//! `oracle compare`: one candidate against one reference.

use crate::commands::file_name;
use color_eyre::Result;
use oracle_diff::{ComparisonReport, TraceComparator};
use oracle_log::{JsonDocument, read_trace};
use std::path::Path;

/// Compare `candidate` against `reference`, writing the report to `out`
/// when given
///
/// # Errors
///
/// Returns error if either trace cannot be read or the report cannot be
/// written
pub fn run(reference: &Path, candidate: &Path, out: Option<&Path>) -> Result<ComparisonReport> {
    let expected = read_trace(reference)?;
    let found = read_trace(candidate)?;
    let report = TraceComparator::new().report(&file_name(candidate), &expected, &found);

    if let Some(out) = out {
        report.write_to(out)?;
        tracing::info!(report = %out.display(), "wrote comparison report");
    }
    Ok(report)
}
