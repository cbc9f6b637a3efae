//! Control-flow model: every analyzed function and its structured body.
//!
//! The model is produced by an external static analyzer and is immutable
//! once loaded; tracers share it read-only.

use crate::element::{ExecutionElement, LogElement};
use crate::error::ModelError;
use crate::validate::ModelValidator;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One analyzed function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionModel {
    /// Fully-qualified name; filled from the model key on load
    #[serde(skip)]
    pub name: String,
    /// Top-level elements in source order
    #[serde(rename = "execution_elements_structured")]
    pub elements: Vec<ExecutionElement>,
}

impl FunctionModel {
    /// Create a new function model
    #[must_use]
    pub fn new(name: &str, elements: Vec<ExecutionElement>) -> Self {
        Self {
            name: name.to_string(),
            elements,
        }
    }

    /// Every log element in the body, in pre-order
    #[must_use]
    pub fn log_elements(&self) -> Vec<&LogElement> {
        let mut logs = Vec::new();
        collect_logs(&self.elements, &mut logs);
        logs
    }
}

fn collect_logs<'m>(elements: &'m [ExecutionElement], out: &mut Vec<&'m LogElement>) {
    for element in elements {
        if let ExecutionElement::Log(log) = element {
            out.push(log);
        }
        for child in element.children() {
            collect_logs(child, out);
        }
    }
}

/// All analyzed functions, keyed by fully-qualified name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlFlowModel {
    /// Functions in analysis order
    pub functions: IndexMap<String, FunctionModel>,
}

impl ControlFlowModel {
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function, replacing any previous one with the same name
    #[must_use]
    pub fn with_function(mut self, function: FunctionModel) -> Self {
        self.functions.insert(function.name.clone(), function);
        self
    }

    /// Parse and validate a model document
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Malformed`] for unknown element kinds or missing
    /// fields and [`ModelError::Invalid`] when validation fails.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let mut model: Self = serde_json::from_str(json)?;
        for (name, function) in &mut model.functions {
            function.name.clone_from(name);
        }
        ModelValidator::new()
            .validate(&model)
            .map_err(ModelError::Invalid)?;
        tracing::debug!(functions = model.functions.len(), "loaded control-flow model");
        Ok(model)
    }

    /// Load and validate a model file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the model is invalid
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Get a function by name
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionModel> {
        self.functions.get(name)
    }

    /// Whether the model knows `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of functions
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Callees named by `name` that the model does not contain
    #[must_use]
    pub fn unresolved_calls(&self, name: &str) -> Vec<&str> {
        let mut unresolved = Vec::new();
        if let Some(function) = self.function(name) {
            collect_unresolved(self, &function.elements, &mut unresolved);
        }
        unresolved
    }
}

fn collect_unresolved<'m>(
    model: &ControlFlowModel,
    elements: &'m [ExecutionElement],
    out: &mut Vec<&'m str>,
) {
    for element in elements {
        if let ExecutionElement::Call { callee } = element {
            if !model.contains(callee) {
                out.push(callee);
            }
        }
        for child in element.children() {
            collect_unresolved(model, child, out);
        }
    }
}
