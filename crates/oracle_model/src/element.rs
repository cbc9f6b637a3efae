//! Execution elements: the structured body of a function.
//!
//! Serialized with the analyzer's wire names, tagged by `"type"`.

use oracle_core::{ArgValue, LogLevel, RawRecord};
use serde::{Deserialize, Serialize};

/// A log emission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogElement {
    /// Severity
    pub level: LogLevel,
    /// Application id
    #[serde(rename = "apId")]
    pub ap_id: String,
    /// Context id
    #[serde(rename = "ctId")]
    pub ct_id: String,
    /// printf-style message
    pub message_template: String,
    /// Arguments for the message specifiers
    #[serde(default)]
    pub values: Vec<ArgValue>,
}

impl LogElement {
    /// Log without arguments
    pub fn new(
        level: LogLevel,
        ap_id: impl Into<String>,
        ct_id: impl Into<String>,
        message_template: impl Into<String>,
    ) -> Self {
        Self {
            level,
            ap_id: ap_id.into(),
            ct_id: ct_id.into(),
            message_template: message_template.into(),
            values: Vec::new(),
        }
    }

    /// Attach argument values
    #[must_use]
    pub fn with_values(mut self, values: Vec<ArgValue>) -> Self {
        self.values = values;
        self
    }

    /// Raw form handed to the record formatter
    #[must_use]
    pub fn to_raw(&self) -> RawRecord {
        RawRecord::new(
            self.level.as_str(),
            self.ap_id.clone(),
            self.ct_id.clone(),
            self.message_template.clone(),
        )
        .with_values(self.values.clone())
    }
}

/// One node of a function body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionElement {
    /// Emit a log record
    #[serde(rename = "LOG")]
    Log(LogElement),

    /// Call another function by fully-qualified name
    #[serde(rename = "CALL")]
    Call {
        /// Fully-qualified name of the called function
        callee: String,
    },

    /// Two-way branch keyed by a stable per-function id
    #[serde(rename = "IF_STMT")]
    Conditional {
        /// Stable id within the function
        #[serde(rename = "id_in_function")]
        id: String,
        /// Elements run when the condition holds
        #[serde(rename = "then_branch_elements", default)]
        then_branch: Vec<ExecutionElement>,
        /// Elements run otherwise
        #[serde(rename = "else_branch_elements", default)]
        else_branch: Vec<ExecutionElement>,
    },

    /// Any loop construct; the flavour is not kept
    #[serde(
        rename = "FOR_LOOP",
        alias = "WHILE_LOOP",
        alias = "DO_WHILE_LOOP",
        alias = "FOR_RANGE_LOOP"
    )]
    Loop {
        /// Stable id within the function
        #[serde(rename = "id_in_function")]
        id: String,
        /// Elements of one iteration
        #[serde(rename = "body_elements", default)]
        body: Vec<ExecutionElement>,
    },

    /// Switch statement. Accepted and validated, not expanded by the tracer.
    #[serde(rename = "SWITCH_STMT")]
    Switch {
        /// Stable id within the function
        #[serde(rename = "id_in_function")]
        id: String,
        /// Elements of one iteration
        #[serde(rename = "body_elements", default)]
        body: Vec<ExecutionElement>,
    },
}

/// Element kind, for diagnostics and id namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Log emission
    Log,
    /// Function call
    Call,
    /// `if`/`else`
    Conditional,
    /// Any loop form
    Loop,
    /// `switch`
    Switch,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Log => "log",
            Self::Call => "call",
            Self::Conditional => "conditional",
            Self::Loop => "loop",
            Self::Switch => "switch",
        };
        f.write_str(name)
    }
}

impl ExecutionElement {
    /// Log emission
    #[must_use]
    pub fn log(level: LogLevel, ap_id: &str, ct_id: &str, template: &str) -> Self {
        Self::Log(LogElement::new(level, ap_id, ct_id, template))
    }

    /// Call to `callee`
    #[must_use]
    pub fn call(callee: &str) -> Self {
        Self::Call {
            callee: callee.to_string(),
        }
    }

    /// `if` with both branches
    #[must_use]
    pub fn conditional(
        id: &str,
        then_branch: Vec<ExecutionElement>,
        else_branch: Vec<ExecutionElement>,
    ) -> Self {
        Self::Conditional {
            id: id.to_string(),
            then_branch,
            else_branch,
        }
    }

    /// Loop around `body`
    #[must_use]
    pub fn repeat(id: &str, body: Vec<ExecutionElement>) -> Self {
        Self::Loop {
            id: id.to_string(),
            body,
        }
    }

    /// Kind of this element
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Log(_) => ElementKind::Log,
            Self::Call { .. } => ElementKind::Call,
            Self::Conditional { .. } => ElementKind::Conditional,
            Self::Loop { .. } => ElementKind::Loop,
            Self::Switch { .. } => ElementKind::Switch,
        }
    }

    /// Stable id of a conditional, loop or switch
    #[must_use]
    pub fn stable_id(&self) -> Option<&str> {
        match self {
            Self::Conditional { id, .. } | Self::Loop { id, .. } | Self::Switch { id, .. } => {
                Some(id)
            }
            Self::Log(_) | Self::Call { .. } => None,
        }
    }

    /// Directly nested element lists
    #[must_use]
    pub fn children(&self) -> Vec<&[ExecutionElement]> {
        match self {
            Self::Conditional {
                then_branch,
                else_branch,
                ..
            } => vec![then_branch.as_slice(), else_branch.as_slice()],
            Self::Loop { body, .. } | Self::Switch { body, .. } => vec![body.as_slice()],
            Self::Log(_) | Self::Call { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_element() {
        let el: ExecutionElement = serde_json::from_str(
            r#"{"type":"LOG","level":"WARN","apId":"ECM","ctId":"TEMP",
                "message_template":"temp=%d","values":["t"],"line":42}"#,
        )
        .unwrap();
        match el {
            ExecutionElement::Log(log) => {
                assert_eq!(log.level, LogLevel::Warn);
                assert_eq!(log.values, vec![ArgValue::Text("t".to_string())]);
            }
            other => panic!("unexpected element {other:?}"),
        }
    }

    #[test]
    fn test_parse_nested_conditional() {
        let el: ExecutionElement = serde_json::from_str(
            r#"{"type":"IF_STMT","id_in_function":"if_0",
                "then_branch_elements":[{"type":"CALL","callee":"init"}]}"#,
        )
        .unwrap();
        assert_eq!(el.kind(), ElementKind::Conditional);
        assert_eq!(el.stable_id(), Some("if_0"));
        let children = el.children();
        assert_eq!(children[0].len(), 1);
        assert!(children[1].is_empty());
    }

    #[test]
    fn test_loop_flavours_share_a_variant() {
        for tag in ["FOR_LOOP", "WHILE_LOOP", "DO_WHILE_LOOP", "FOR_RANGE_LOOP"] {
            let json = format!(r#"{{"type":"{tag}","id_in_function":"loop_0"}}"#);
            let el: ExecutionElement = serde_json::from_str(&json).unwrap();
            assert_eq!(el.kind(), ElementKind::Loop);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<ExecutionElement, _> =
            serde_json::from_str(r#"{"type":"GOTO","label":"out"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let result: Result<ExecutionElement, _> =
            serde_json::from_str(r#"{"type":"IF_STMT","then_branch_elements":[]}"#);
        assert!(result.is_err());
        let result: Result<ExecutionElement, _> = serde_json::from_str(r#"{"type":"CALL"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_to_raw() {
        let log = LogElement::new(LogLevel::Info, "VCTRL", "INIT", "speed=%d")
            .with_values(vec![ArgValue::Int(5)]);
        let raw = log.to_raw();
        assert_eq!(raw.level, "INFO");
        assert_eq!(raw.values, vec![ArgValue::Int(5)]);
    }
}
