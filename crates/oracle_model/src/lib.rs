//! TRACE.ORACLE Control-Flow Model
//!
//! The read-only description of a program's functions, calls, branches,
//! loops and log statements as emitted by an external static analyzer,
//! plus the scenario configuration that steers path exploration over it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod element;
pub mod error;
pub mod model;
pub mod scenario;
pub mod validate;

pub use element::{ElementKind, ExecutionElement, LogElement};
pub use error::ModelError;
pub use model::{ControlFlowModel, FunctionModel};
pub use scenario::{BranchChoice, DEFAULT_LOOP_ITERATIONS, Scenario, ScenarioConfig};
pub use validate::ModelValidator;
