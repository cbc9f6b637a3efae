//! `oracle generate`: model + scenarios to reference traces.

use crate::config::OracleConfig;
use color_eyre::Result;
use oracle_core::SimSeed;
use oracle_log::{TraceWriter, reference_file_name, sanitize_for_filename, write_trace};
use oracle_model::{ControlFlowModel, ModelValidator, Scenario};
use oracle_trace::PathTracer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What one scenario produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub scenario: String,
    /// Paths returned by the tracer, empty ones included
    pub paths: usize,
    /// Files written for the non-empty paths
    pub files: Vec<PathBuf>,
    /// Earlier scenario whose file names this one reuses
    pub collides_with: Option<String>,
}

/// Trace every scenario in `scenarios_path` over the model and write one
/// reference file per non-empty path into `out`
///
/// # Errors
///
/// Returns error if the model or scenario file is unusable or a trace file
/// cannot be written
pub fn run(
    model_path: &Path,
    scenarios_path: &Path,
    out: &Path,
    config: &OracleConfig,
    seed: &SimSeed,
) -> Result<Vec<ScenarioOutcome>> {
    let model = ControlFlowModel::load(model_path)?;
    let scenarios = Scenario::load_list(scenarios_path)?;
    tracing::info!(
        functions = model.function_count(),
        scenarios = scenarios.len(),
        "loaded model and scenarios"
    );

    let validator = ModelValidator::new();
    let tracer = PathTracer::new(&model).with_config(config.tracer.clone());
    let epoch = config.epoch();
    let mut outcomes = Vec::with_capacity(scenarios.len());
    let mut stems: HashMap<String, String> = HashMap::new();

    for scenario in &scenarios {
        let stem = sanitize_for_filename(scenario.name());
        let collides_with = stems.get(&stem).cloned();
        if let Some(earlier) = &collides_with {
            tracing::warn!(
                scenario = scenario.name(),
                earlier = %earlier,
                stem = %stem,
                "scenario names map to the same files, earlier traces are overwritten"
            );
        }
        stems.insert(stem, scenario.name().to_string());

        for problem in validator.check_scenario(&model, scenario) {
            tracing::warn!(scenario = scenario.name(), %problem, "scenario configuration problem");
        }

        let paths = tracer.trace_scenario(scenario);
        let mut files = Vec::new();
        for (i, path) in paths.iter().enumerate() {
            if path.is_empty() {
                tracing::info!(scenario = scenario.name(), path = i, "empty path, nothing written");
                continue;
            }
            let path_seed = seed.derive(&format!("{}#{}", scenario.name(), i));
            let mut writer = TraceWriter::with_fresh_session(config.writer.clone(), &path_seed, epoch);
            let records = writer.write_scenario(scenario.name(), &path.raw_records());

            let file = out.join(reference_file_name(scenario.name(), i));
            write_trace(&file, &records)?;
            tracing::debug!(file = %file.display(), records = records.len(), "wrote reference trace");
            files.push(file);
        }

        tracing::info!(
            scenario = scenario.name(),
            paths = paths.len(),
            files = files.len(),
            "scenario traced"
        );
        outcomes.push(ScenarioOutcome {
            scenario: scenario.name().to_string(),
            paths: paths.len(),
            files,
            collides_with,
        });
    }
    Ok(outcomes)
}
