//! `oracle mutate`: reference traces to defect traces.

use crate::commands::{file_name, file_stem, json_files};
use crate::config::OracleConfig;
use color_eyre::Result;
use oracle_core::SimSeed;
use oracle_log::{defect_file_name, is_defect_file, read_trace, write_trace};
use oracle_mutate::MutationEngine;
use std::path::{Path, PathBuf};

/// Files produced and files passed over
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutateOutcome {
    pub written: Vec<PathBuf>,
    /// Unreadable references, with the reason
    pub skipped: Vec<String>,
}

/// Derive every applicable defect variant of each reference in `traces`
///
/// # Errors
///
/// Returns error if a directory cannot be listed or a defect file cannot be
/// written; unreadable references are skipped
pub fn run(traces: &Path, out: &Path, config: &OracleConfig, seed: &SimSeed) -> Result<MutateOutcome> {
    let mut outcome = MutateOutcome::default();

    for path in json_files(traces)? {
        let name = file_name(&path);
        if is_defect_file(&name) {
            continue;
        }
        let reference = match read_trace(&path) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable reference");
                outcome.skipped.push(err.to_string());
                continue;
            }
        };

        let engine = MutationEngine::new(seed.derive(&name))
            .with_writer_config(config.writer.clone());
        let stem = file_stem(&path);
        let variants = engine.mutate(&reference);
        for variant in &variants {
            let file = out.join(defect_file_name(&stem, variant.kind.as_str()));
            write_trace(&file, &variant.records)?;
            outcome.written.push(file);
        }
        tracing::info!(reference = %name, variants = variants.len(), "mutated reference");
    }
    Ok(outcome)
}
