//! TRACE.ORACLE Path Tracer
//!
//! Walks a control-flow model under a scenario configuration and returns
//! the ordered log sequences of every completed execution path.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod state;
pub mod tracer;

pub use state::{Checkpoint, ExecutionPath, ExecutionState};
pub use tracer::{PathTracer, TracerConfig};
