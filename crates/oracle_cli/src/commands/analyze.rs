//! `oracle analyze`: batch comparison of defect and reference traces.
//!
//! Every defect file is compared against the reference it was derived from
//! and every reference against itself. Comparisons are independent and run
//! on the blocking pool; results are collected in submission order.

use crate::commands::{file_name, file_stem, json_files};
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use oracle_diff::TraceComparator;
use oracle_log::{
    JsonDocument, TraceFileError, is_defect_file, read_trace, reference_for, report_file_name,
};
use std::path::{Path, PathBuf};

/// One comparison to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub reference: PathBuf,
    pub candidate: PathBuf,
}

/// Result of a finished comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analyzed {
    pub report: PathBuf,
    pub candidate: String,
    pub deviations: usize,
}

/// Everything a batch produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub analyzed: Vec<Analyzed>,
    /// Files that could not be analyzed, with the reason
    pub skipped: Vec<String>,
}

impl AnalysisOutcome {
    /// Number of candidates with at least one deviation
    #[must_use]
    pub fn deviating(&self) -> usize {
        self.analyzed.iter().filter(|a| a.deviations > 0).count()
    }
}

/// Build the job list: references against themselves, then defects against
/// their references. Defects without a reference are returned separately.
///
/// # Errors
///
/// Returns error if either directory cannot be listed
pub fn plan(references: &Path, defects: &Path) -> Result<(Vec<Job>, Vec<String>)> {
    let mut jobs = Vec::new();
    let mut orphans = Vec::new();

    for reference in json_files(references)? {
        if !is_defect_file(&file_name(&reference)) {
            jobs.push(Job {
                reference: reference.clone(),
                candidate: reference,
            });
        }
    }

    for candidate in json_files(defects)? {
        let name = file_name(&candidate);
        if !is_defect_file(&name) {
            continue;
        }
        let reference = references.join(reference_for(&name));
        if !reference.is_file() {
            tracing::warn!(defect = %name, reference = %reference.display(), "reference not found");
            orphans.push(format!("{name}: reference {} not found", reference.display()));
            continue;
        }
        jobs.push(Job {
            reference,
            candidate,
        });
    }
    Ok((jobs, orphans))
}

/// Compare one job and write its report into `reports`
///
/// # Errors
///
/// Returns error if a trace cannot be read or the report cannot be written
pub fn analyze_one(job: &Job, reports: &Path) -> Result<Analyzed, TraceFileError> {
    let expected = read_trace(&job.reference)?;
    let found = read_trace(&job.candidate)?;
    let candidate = file_name(&job.candidate);
    let report = TraceComparator::new().report(&candidate, &expected, &found);

    let path = reports.join(report_file_name(&file_stem(&job.candidate)));
    report.write_to(&path)?;
    tracing::info!(
        candidate = %candidate,
        status = %report.summary.status,
        deviations = report.summary.total_deviations,
        "analyzed trace"
    );
    Ok(Analyzed {
        report: path,
        candidate,
        deviations: report.summary.total_deviations,
    })
}

/// Run the whole batch
///
/// # Errors
///
/// Returns error if a directory cannot be listed or a worker panics;
/// per-file failures are reported in the outcome instead
pub async fn run(
    references: &Path,
    defects: &Path,
    reports: &Path,
    show_progress: bool,
) -> Result<AnalysisOutcome> {
    let (jobs, orphans) = plan(references, defects)?;
    let mut outcome = AnalysisOutcome {
        skipped: orphans,
        ..AnalysisOutcome::default()
    };

    let progress = if show_progress {
        let bar = ProgressBar::new(jobs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let reports = reports.to_path_buf();
            tokio::task::spawn_blocking(move || {
                let result = analyze_one(&job, &reports);
                (job, result)
            })
        })
        .collect();

    for handle in handles {
        let (job, result) = handle.await?;
        progress.inc(1);
        match result {
            Ok(analyzed) => {
                progress.set_message(analyzed.candidate.clone());
                outcome.analyzed.push(analyzed);
            }
            Err(err) => {
                tracing::warn!(candidate = %job.candidate.display(), %err, "skipping trace");
                outcome.skipped.push(err.to_string());
            }
        }
    }
    progress.finish_and_clear();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{fixtures, generate, mutate};
    use crate::config::OracleConfig;
    use oracle_core::SimSeed;
    use oracle_diff::{ComparisonReport, DeviationType};

    struct Layout {
        _dir: tempfile::TempDir,
        refs: PathBuf,
        defects: PathBuf,
        reports: PathBuf,
    }

    fn layout() -> Layout {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.json");
        let scenarios = dir.path().join("scenarios.json");
        std::fs::write(&model, fixtures::MODEL).unwrap();
        std::fs::write(&scenarios, fixtures::SCENARIOS).unwrap();

        let refs = dir.path().join("refs");
        let defects = dir.path().join("defects");
        let config = OracleConfig::default();
        let seed = SimSeed::from_literal(4);
        generate::run(&model, &scenarios, &refs, &config, &seed).unwrap();
        mutate::run(&refs, &defects, &config, &seed).unwrap();

        let reports = dir.path().join("reports");
        Layout {
            _dir: dir,
            refs,
            defects,
            reports,
        }
    }

    #[test]
    fn test_plan_orders_references_first() {
        let layout = layout();
        let (jobs, orphans) = plan(&layout.refs, &layout.defects).unwrap();
        assert!(orphans.is_empty());
        assert_eq!(jobs.len(), 5);
        assert_eq!(jobs[0].reference, jobs[0].candidate);
        assert_eq!(jobs[1].reference, jobs[1].candidate);
        for job in &jobs[2..] {
            assert_eq!(file_name(&job.reference), "Door_NS_Else_path0.json");
        }
    }

    #[tokio::test]
    async fn test_batch_reports() {
        let layout = layout();
        let outcome = run(&layout.refs, &layout.defects, &layout.reports, false)
            .await
            .unwrap();

        assert_eq!(outcome.analyzed.len(), 5);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.deviating(), 3);

        let clean = ComparisonReport::read_from(
            &layout.reports.join("report_for_Door_NS_Else_path0.json"),
        )
        .unwrap();
        assert!(clean.is_clean());

        let missing = ComparisonReport::read_from(
            &layout
                .reports
                .join("report_for_Door_NS_Else_path0_BUG_MissingLog.json"),
        )
        .unwrap();
        assert_eq!(missing.summary.count(DeviationType::MissingLog), 1);
        assert_eq!(missing.summary.total_deviations, 1);
    }

    #[tokio::test]
    async fn test_orphans_and_unreadable_files_are_skipped() {
        let layout = layout();
        std::fs::write(layout.defects.join("gone_path0_BUG_ExtraLog.json"), "[]").unwrap();
        std::fs::write(layout.refs.join("broken_path0.json"), "{").unwrap();

        let outcome = run(&layout.refs, &layout.defects, &layout.reports, false)
            .await
            .unwrap();
        assert_eq!(outcome.analyzed.len(), 5);
        assert_eq!(outcome.skipped.len(), 2);
        assert!(outcome.skipped.iter().any(|s| s.contains("gone_path0_BUG_ExtraLog.json")));
        assert!(outcome.skipped.iter().any(|s| s.contains("broken_path0.json")));
    }
}
