//! `oracle validate`: structural checks on trace files.

use oracle_log::{TraceValidator, ValidationReport};
use std::path::PathBuf;

/// Validate every file; unreadable files produce a failing report
#[must_use]
pub fn run(files: &[PathBuf]) -> Vec<ValidationReport> {
    let validator = TraceValidator::new();
    files
        .iter()
        .map(|file| {
            let report = validator.validate_file(file);
            for error in &report.errors {
                tracing::debug!(file = %report.file, %error, "validation error");
            }
            report
        })
        .collect()
}
