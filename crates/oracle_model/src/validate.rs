//! Structural validation of control-flow models and scenarios.

use crate::element::{ElementKind, ExecutionElement};
use crate::error::ModelError;
use crate::model::{ControlFlowModel, FunctionModel};
use crate::scenario::Scenario;
use std::collections::HashSet;

/// Validator for model structure
pub struct ModelValidator {
    /// Reject functions with an empty body
    pub require_body: bool,
}

impl ModelValidator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self {
            require_body: false,
        }
    }

    /// Validate a model, collecting every problem
    ///
    /// # Errors
    ///
    /// Returns all validation errors if the model is invalid
    pub fn validate(&self, model: &ControlFlowModel) -> Result<(), Vec<ModelError>> {
        let mut errors = Vec::new();

        for (name, function) in &model.functions {
            if name.trim().is_empty() {
                errors.push(ModelError::EmptyFunctionName);
                continue;
            }
            if self.require_body && function.elements.is_empty() {
                errors.push(ModelError::Malformed(format!("function {} has no body", name)));
            }
            self.check_function(name, function, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_function(&self, name: &str, function: &FunctionModel, errors: &mut Vec<ModelError>) {
        let mut seen: HashSet<(ElementKind, &str)> = HashSet::new();
        check_elements(name, &function.elements, &mut seen, errors);
    }

    /// Check that a scenario only names functions and constructs that exist.
    /// These are reported, not fatal: an unused choice never changes a path.
    #[must_use]
    pub fn check_scenario(&self, model: &ControlFlowModel, scenario: &Scenario) -> Vec<ModelError> {
        let mut problems = Vec::new();
        let config = &scenario.config;

        for entry in &scenario.entry_points {
            if !model.contains(entry) {
                problems.push(ModelError::UnknownFunction {
                    scenario: config.name.clone(),
                    function: entry.clone(),
                });
            }
        }

        let targets = config
            .if_choices
            .iter()
            .flat_map(|(f, ids)| ids.keys().map(move |id| (f, id, ElementKind::Conditional)))
            .chain(
                config
                    .loop_iterations
                    .iter()
                    .flat_map(|(f, ids)| ids.keys().map(move |id| (f, id, ElementKind::Loop))),
            );

        for (function, id, kind) in targets {
            let Some(model_fn) = model.function(function) else {
                problems.push(ModelError::UnknownFunction {
                    scenario: config.name.clone(),
                    function: function.clone(),
                });
                continue;
            };
            if !has_construct(&model_fn.elements, kind, id) {
                problems.push(ModelError::UnknownConstruct {
                    scenario: config.name.clone(),
                    function: function.clone(),
                    kind,
                    id: id.clone(),
                });
            }
        }

        problems
    }
}

impl Default for ModelValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_elements<'m>(
    function: &str,
    elements: &'m [ExecutionElement],
    seen: &mut HashSet<(ElementKind, &'m str)>,
    errors: &mut Vec<ModelError>,
) {
    for element in elements {
        if let ExecutionElement::Call { callee } = element {
            if callee.trim().is_empty() {
                errors.push(ModelError::EmptyCallee {
                    function: function.to_string(),
                });
            }
        }

        if let Some(id) = element.stable_id() {
            let kind = element.kind();
            if id.trim().is_empty() {
                errors.push(ModelError::EmptyId {
                    function: function.to_string(),
                    kind,
                });
            } else if !seen.insert((kind, id)) {
                errors.push(ModelError::DuplicateId {
                    function: function.to_string(),
                    kind,
                    id: id.to_string(),
                });
            }
        }

        for child in element.children() {
            check_elements(function, child, seen, errors);
        }
    }
}

fn has_construct(elements: &[ExecutionElement], kind: ElementKind, id: &str) -> bool {
    elements.iter().any(|element| {
        (element.kind() == kind && element.stable_id() == Some(id))
            || element
                .children()
                .into_iter()
                .any(|child| has_construct(child, kind, id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{BranchChoice, ScenarioConfig};
    use oracle_core::LogLevel;

    fn model_with(elements: Vec<ExecutionElement>) -> ControlFlowModel {
        ControlFlowModel::new().with_function(FunctionModel::new("main", elements))
    }

    #[test]
    fn test_valid_model() {
        let model = model_with(vec![
            ExecutionElement::log(LogLevel::Info, "SYS", "BOOT", "boot"),
            ExecutionElement::conditional("if_0", vec![], vec![]),
            ExecutionElement::repeat("loop_0", vec![]),
        ]);
        assert!(ModelValidator::new().validate(&model).is_ok());
    }

    #[test]
    fn test_same_id_different_kinds_is_allowed() {
        let model = model_with(vec![
            ExecutionElement::conditional("0", vec![], vec![]),
            ExecutionElement::repeat("0", vec![]),
        ]);
        assert!(ModelValidator::new().validate(&model).is_ok());
    }

    #[test]
    fn test_nested_duplicate_detected() {
        let model = model_with(vec![ExecutionElement::conditional(
            "if_0",
            vec![ExecutionElement::conditional("if_0", vec![], vec![])],
            vec![],
        )]);
        let errors = ModelValidator::new().validate(&model).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ModelError::DuplicateId { .. }));
    }

    #[test]
    fn test_collects_all_errors() {
        let model = model_with(vec![
            ExecutionElement::call(""),
            ExecutionElement::repeat(" ", vec![]),
        ])
        .with_function(FunctionModel::new("", vec![]));
        let errors = ModelValidator::new().validate(&model).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_require_body() {
        let model = model_with(vec![]);
        let validator = ModelValidator {
            require_body: true,
        };
        assert!(validator.validate(&model).is_err());
        assert!(ModelValidator::new().validate(&model).is_ok());
    }

    #[test]
    fn test_check_scenario_reports_unknown_targets() {
        let model = model_with(vec![ExecutionElement::conditional("if_0", vec![], vec![])]);
        let config = ScenarioConfig::new("s")
            .with_if_choice("main", "if_0", BranchChoice::Then)
            .with_if_choice("main", "if_9", BranchChoice::Then)
            .with_loop_iterations("ghost", "loop_0", 2);
        let scenario = Scenario {
            config,
            entry_points: vec!["main".to_string(), "nowhere".to_string()],
        };
        let problems = ModelValidator::new().check_scenario(&model, &scenario);
        assert_eq!(problems.len(), 3);
    }
}
