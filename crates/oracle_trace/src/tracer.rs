//! Path tracer: depth-first exploration of a control-flow model under a
//! scenario configuration.
//!
//! A conditional configured as `both` forks the exploration. The then side
//! is explored in place, captured as a finished path and rewound; the else
//! side then continues on the same state. The captured path stops at the
//! conditional: nothing after it is applied. Once the whole exploration is
//! done, the continuing state becomes a path only if no fork fired.

use crate::state::{ExecutionPath, ExecutionState};
use oracle_model::{
    BranchChoice, ControlFlowModel, ExecutionElement, FunctionModel, Scenario, ScenarioConfig,
};
use serde::{Deserialize, Serialize};

/// Tracer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Deepest combined call and block nesting explored
    pub max_depth: usize,
    /// Ceiling applied to configured loop counts
    pub max_loop_iterations: u32,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_loop_iterations: 10_000,
        }
    }
}

impl TracerConfig {
    /// Set the nesting ceiling
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the loop-count ceiling
    #[must_use]
    pub fn with_max_loop_iterations(mut self, max: u32) -> Self {
        self.max_loop_iterations = max;
        self
    }
}

/// Explores execution paths of one model
pub struct PathTracer<'m> {
    model: &'m ControlFlowModel,
    config: TracerConfig,
}

/// Everything one exploration reads but never changes
struct Walk<'m, 'c> {
    model: &'m ControlFlowModel,
    scenario: &'c ScenarioConfig,
    limits: &'c TracerConfig,
}

impl<'m> PathTracer<'m> {
    /// Create a tracer with default limits
    #[must_use]
    pub fn new(model: &'m ControlFlowModel) -> Self {
        Self {
            model,
            config: TracerConfig::default(),
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: TracerConfig) -> Self {
        self.config = config;
        self
    }

    /// Limits in effect
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Completed paths starting at `entry`
    #[must_use]
    pub fn trace(&self, entry: &str, scenario: &ScenarioConfig) -> Vec<ExecutionPath<'m>> {
        self.trace_entries(&[entry], scenario)
    }

    /// Completed paths for a scenario; its entry points are explored in
    /// order on one state
    #[must_use]
    pub fn trace_scenario(&self, scenario: &Scenario) -> Vec<ExecutionPath<'m>> {
        let entries: Vec<&str> = scenario.entry_points.iter().map(String::as_str).collect();
        self.trace_entries(&entries, &scenario.config)
    }

    fn trace_entries(&self, entries: &[&str], scenario: &ScenarioConfig) -> Vec<ExecutionPath<'m>> {
        let walk = Walk {
            model: self.model,
            scenario,
            limits: &self.config,
        };
        let mut state = ExecutionState::new();
        let mut paths = Vec::new();

        for entry in entries {
            match self.model.functions.get_key_value(*entry) {
                Some((name, _)) => paths.extend(walk.explore(name, &mut state, 0)),
                None => tracing::warn!(
                    scenario = %scenario.name,
                    entry = %entry,
                    "entry point not in model"
                ),
            }
        }

        // The continuing state only counts when nothing forked.
        if paths.is_empty() {
            paths.push(state.into_path());
        }

        tracing::info!(
            scenario = %scenario.name,
            entries = entries.len(),
            paths = paths.len(),
            "traced scenario"
        );
        paths
    }
}

impl<'m> Walk<'m, '_> {
    fn explore(
        &self,
        function: &'m str,
        state: &mut ExecutionState<'m>,
        depth: usize,
    ) -> Vec<ExecutionPath<'m>> {
        let Some(model_fn) = self.model.function(function) else {
            return Vec::new();
        };
        if !state.enter(function) {
            tracing::trace!(function, "recursive call skipped");
            return Vec::new();
        }

        let paths = self.process(model_fn, &model_fn.elements, state, depth);
        state.leave(function);
        paths
    }

    fn process(
        &self,
        function: &'m FunctionModel,
        elements: &'m [ExecutionElement],
        state: &mut ExecutionState<'m>,
        depth: usize,
    ) -> Vec<ExecutionPath<'m>> {
        let mut paths = Vec::new();

        for element in elements {
            match element {
                ExecutionElement::Log(log) => {
                    if log.level.is_fatal() && !self.scenario.allow_fatal {
                        tracing::debug!(function = %function.name, ct_id = %log.ct_id, "fatal log suppressed");
                    } else {
                        state.push_log(log);
                    }
                }
                ExecutionElement::Call { callee } => {
                    if !self.within_depth(function, callee, depth) {
                        continue;
                    }
                    paths.extend(self.explore(callee, state, depth + 1));
                }
                ExecutionElement::Conditional {
                    id,
                    then_branch,
                    else_branch,
                } => {
                    if !self.within_depth(function, id, depth) {
                        continue;
                    }
                    match self.scenario.branch_choice(&function.name, id) {
                        BranchChoice::Then => {
                            paths.extend(self.process(function, then_branch, state, depth + 1));
                        }
                        BranchChoice::Else => {
                            paths.extend(self.process(function, else_branch, state, depth + 1));
                        }
                        BranchChoice::Both => {
                            tracing::debug!(function = %function.name, id = %id, "fork");
                            let mark = state.checkpoint();
                            paths.extend(self.process(function, then_branch, state, depth + 1));
                            paths.push(state.snapshot());
                            state.restore(mark);
                            paths.extend(self.process(function, else_branch, state, depth + 1));
                        }
                    }
                }
                ExecutionElement::Loop { id, body } => {
                    if !self.within_depth(function, id, depth) {
                        continue;
                    }
                    for _ in 0..self.iterations(function, id) {
                        paths.extend(self.process(function, body, state, depth + 1));
                    }
                }
                ExecutionElement::Switch { id, .. } => {
                    tracing::trace!(function = %function.name, id = %id, "switch not expanded");
                }
            }
        }

        paths
    }

    /// Whether a call or block nested at `depth + 1` may be expanded
    fn within_depth(&self, function: &FunctionModel, construct: &str, depth: usize) -> bool {
        if depth >= self.limits.max_depth {
            tracing::warn!(function = %function.name, construct, depth, "maximum depth reached, not expanded");
            return false;
        }
        true
    }

    fn iterations(&self, function: &FunctionModel, id: &str) -> u32 {
        let configured = self.scenario.iterations(&function.name, id);
        if configured > self.limits.max_loop_iterations {
            tracing::warn!(
                function = %function.name,
                id,
                configured,
                max = self.limits.max_loop_iterations,
                "loop count clamped"
            );
            return self.limits.max_loop_iterations;
        }
        configured
    }
}
