//! TRACE.ORACLE Core Types
//!
//! Pure types shared by every stage of the toolchain: log records before and
//! after rendering, errors, time rendering, and the seeded randomness source.
//! No I/O lives here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod record;
pub mod seed;
pub mod time;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use record::{
    ArgValue, INJECT_AP_ID, LogLevel, RECORD_TYPE_LOG, RawRecord, SCENARIO_AP_ID, TraceRecord,
    is_identifier,
};
pub use seed::{SeedSource, SimSeed};
pub use time::{Timestamp, now_rfc3339, parse_time, render_time};
