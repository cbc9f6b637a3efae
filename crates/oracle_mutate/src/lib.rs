//! TRACE.ORACLE Mutation Engine
//!
//! Derives known-bad traces from known-good ones: a missing record, an
//! injected record, a swapped pair, or a corrupted payload.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mutation;

pub use mutation::{
    CORRUPTED_TEMPLATE, INJECTED_CT_ID, INJECTED_MESSAGE, MutatedTrace, MutationConfig,
    MutationEngine, MutationKind, RERENDER_OFFSET_SECS, apply, injected_record,
};
