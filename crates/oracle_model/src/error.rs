//! Model errors.

use crate::element::ElementKind;

/// Errors raised while loading or validating a control-flow model or a
/// scenario file. All of them are fatal for the requested generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Document is not a well-formed model
    #[error("Malformed model: {0}")]
    Malformed(String),

    /// Scenario document is not well-formed
    #[error("Malformed scenario file: {0}")]
    MalformedScenario(String),

    /// Model file could not be read
    #[error("Cannot read {path}: {reason}")]
    Io {
        /// File involved
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Function registered under an empty name
    #[error("Function with empty name")]
    EmptyFunctionName,

    /// Call without a callee
    #[error("Empty callee in {function}")]
    EmptyCallee {
        /// Calling function
        function: String,
    },

    /// Conditional, loop or switch without a stable id
    #[error("Empty {kind} id in {function}")]
    EmptyId {
        /// Enclosing function
        function: String,
        /// Construct kind
        kind: ElementKind,
    },

    /// Stable id reused by two constructs of the same kind
    #[error("Duplicate {kind} id '{id}' in {function}")]
    DuplicateId {
        /// Enclosing function
        function: String,
        /// Construct kind
        kind: ElementKind,
        /// Reused id
        id: String,
    },

    /// Scenario names a function the model does not contain
    #[error("Scenario '{scenario}' refers to unknown function {function}")]
    UnknownFunction {
        /// Scenario name
        scenario: String,
        /// Function it names
        function: String,
    },

    /// Scenario names a construct id the function does not contain
    #[error("Scenario '{scenario}' refers to unknown {kind} '{id}' in {function}")]
    UnknownConstruct {
        /// Scenario name
        scenario: String,
        /// Function it names
        function: String,
        /// Construct kind
        kind: ElementKind,
        /// Id it names
        id: String,
    },

    /// Aggregated validation failures
    #[error("Invalid model ({} problem(s)): {}", .0.len(), join_errors(.0))]
    Invalid(Vec<ModelError>),
}

fn join_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_id_display() {
        let err = ModelError::DuplicateId {
            function: "main".to_string(),
            kind: ElementKind::Loop,
            id: "loop_0".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate loop id 'loop_0' in main");
    }

    #[test]
    fn test_invalid_lists_every_problem() {
        let err = ModelError::Invalid(vec![
            ModelError::EmptyFunctionName,
            ModelError::EmptyCallee {
                function: "f".to_string(),
            },
        ]);
        let s = err.to_string();
        assert!(s.contains("2 problem(s)"));
        assert!(s.contains("Empty callee in f"));
    }
}
