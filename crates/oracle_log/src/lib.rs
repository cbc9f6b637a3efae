//! TRACE.ORACLE Record Formatting and Trace Files
//!
//! Turns raw log statements into DLT-shaped trace records: printf-style
//! payload rendering with synthetic fallbacks, sequential indices and a
//! monotonic per-session clock. Also owns the on-disk trace format, the
//! naming of generated files and structural validation of trace files.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod format;
pub mod naming;
pub mod validate;
pub mod writer;

pub use encoding::{JsonDocument, TraceFileError, read_trace, write_trace};
pub use format::{
    ERROR_MARKER_PREFIX, FALLBACK_CHAR, FALLBACK_STRING, FALLBACK_UNKNOWN, FormatSpec, SpecKind,
    render_payload, specifiers,
};
pub use naming::{
    defect_file_name, is_defect_file, reference_file_name, reference_for, report_file_name,
    sanitize_for_filename,
};
pub use validate::{TRACE_FIELDS, TraceValidator, ValidationReport};
pub use writer::{DEFAULT_ECU_ID, RecordFormatter, TraceSession, TraceWriter, WriterConfig};
