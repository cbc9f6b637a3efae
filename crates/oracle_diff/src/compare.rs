//! Trace comparator: aligns a candidate trace against a reference.
//!
//! Two cursors walk the sequences front to front. At each step the first
//! applicable rule wins:
//!
//! 1. an injected candidate record is extra;
//! 2. similar fronts match;
//! 3. if the next reference record is similar to the candidate front, the
//!    reference front is missing;
//! 4. if the next candidate record is similar to the reference front, the
//!    candidate front is extra;
//! 5. otherwise both fronts are consumed as a mismatch.
//!
//! Whatever is left on either side afterwards is missing or extra.

use crate::deviation::Deviation;
use crate::report::ComparisonReport;
use oracle_core::TraceRecord;

/// Whether two records are equivalent for comparison purposes.
///
/// Level, application id, context id and payload must match exactly.
/// Indices, timestamps and sessions are never compared.
#[must_use]
pub fn similar(a: Option<&TraceRecord>, b: Option<&TraceRecord>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.log_level == b.log_level
                && a.ap_id == b.ap_id
                && a.ct_id == b.ct_id
                && a.payload == b.payload
        }
        _ => false,
    }
}

/// Comparator for trace sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceComparator;

impl TraceComparator {
    /// Comparator with default settings
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Deviations of `candidate` from `reference`, in discovery order
    #[must_use]
    pub fn compare(&self, reference: &[TraceRecord], candidate: &[TraceRecord]) -> Vec<Deviation> {
        let reference = without_markers(reference);
        let candidate = without_markers(candidate);
        let mut deviations = Vec::new();
        let (mut r, mut c) = (0, 0);

        while r < reference.len() && c < candidate.len() {
            let expected = reference[r];
            let found = candidate[c];

            if found.is_injected() {
                deviations.push(Deviation::extra(found));
                c += 1;
            } else if similar(Some(expected), Some(found)) {
                r += 1;
                c += 1;
            } else if similar(reference.get(r + 1).copied(), Some(found)) {
                deviations.push(Deviation::missing(expected));
                r += 1;
            } else if similar(Some(expected), candidate.get(c + 1).copied()) {
                deviations.push(Deviation::extra(found));
                c += 1;
            } else {
                deviations.push(Deviation::mismatch(expected, found));
                r += 1;
                c += 1;
            }
        }

        deviations.extend(reference[r..].iter().map(|record| Deviation::missing(record)));
        deviations.extend(candidate[c..].iter().map(|record| Deviation::extra(record)));

        tracing::debug!(
            reference = reference.len(),
            candidate = candidate.len(),
            deviations = deviations.len(),
            "compared traces"
        );
        deviations
    }

    /// Compare and wrap the result in a report for `analyzed_file`
    #[must_use]
    pub fn report(
        &self,
        analyzed_file: &str,
        reference: &[TraceRecord],
        candidate: &[TraceRecord],
    ) -> ComparisonReport {
        ComparisonReport::new(analyzed_file, self.compare(reference, candidate))
    }
}

fn without_markers(records: &[TraceRecord]) -> Vec<&TraceRecord> {
    records.iter().filter(|r| !r.is_scenario_marker()).collect()
}
