//! Scenario configuration: the branch, loop and fatal-log choices that make
//! path exploration deterministic.

use crate::error::ModelError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Loop iteration count used when a scenario says nothing
pub const DEFAULT_LOOP_ITERATIONS: u32 = 1;

/// Which side of a conditional to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchChoice {
    /// Follow the then side only
    Then,
    /// Follow the else side only
    Else,
    /// Fork: the then side becomes a finished path, the else side continues
    #[default]
    Both,
}

/// Branch, loop and fatal-log policy for one scenario
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name, also the file name stem
    pub name: String,
    /// Keep FATAL logs instead of suppressing them
    #[serde(default)]
    pub allow_fatal: bool,
    /// function -> conditional id -> choice
    #[serde(default)]
    pub if_choices: IndexMap<String, IndexMap<String, BranchChoice>>,
    /// function -> loop id -> iteration count; negative counts run zero times
    #[serde(default)]
    pub loop_iterations: IndexMap<String, IndexMap<String, i64>>,
}

impl ScenarioConfig {
    /// Create a config with every choice at its default
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Allow or suppress FATAL logs
    #[must_use]
    pub fn with_allow_fatal(mut self, allow: bool) -> Self {
        self.allow_fatal = allow;
        self
    }

    /// Pin a conditional to one side
    #[must_use]
    pub fn with_if_choice(mut self, function: &str, id: &str, choice: BranchChoice) -> Self {
        self.if_choices
            .entry(function.to_string())
            .or_default()
            .insert(id.to_string(), choice);
        self
    }

    /// Set a loop's iteration count
    #[must_use]
    pub fn with_loop_iterations(mut self, function: &str, id: &str, count: i64) -> Self {
        self.loop_iterations
            .entry(function.to_string())
            .or_default()
            .insert(id.to_string(), count);
        self
    }

    /// Choice for conditional `id` in `function` (defaults to both)
    #[must_use]
    pub fn branch_choice(&self, function: &str, id: &str) -> BranchChoice {
        self.if_choices
            .get(function)
            .and_then(|ids| ids.get(id))
            .copied()
            .unwrap_or_default()
    }

    /// Iterations for loop `id` in `function` (defaults to one, never negative)
    #[must_use]
    pub fn iterations(&self, function: &str, id: &str) -> u32 {
        match self.loop_iterations.get(function).and_then(|ids| ids.get(id)) {
            Some(&count) => u32::try_from(count.max(0)).unwrap_or(u32::MAX),
            None => DEFAULT_LOOP_ITERATIONS,
        }
    }
}

/// A named scenario: entry points explored in order plus its configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Branch and loop choices
    #[serde(flatten)]
    pub config: ScenarioConfig,
    /// Functions explored in order on one state
    pub entry_points: Vec<String>,
}

impl Scenario {
    /// Single-entry scenario
    #[must_use]
    pub fn new(entry: &str, config: ScenarioConfig) -> Self {
        Self {
            config,
            entry_points: vec![entry.to_string()],
        }
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Parse a scenario file (a JSON array of scenarios)
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a list of scenarios
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::MalformedScenario(e.to_string()))
    }

    /// Load a scenario file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load_list(path: &Path) -> Result<Vec<Self>, ModelError> {
        let json = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::list_from_json(&json)
    }
}
