//! Mutation engine: manufactures defect traces from a reference trace.
//!
//! Every variant starts from an untouched copy of the reference, applies one
//! structural corruption at a randomly chosen position and is then
//! re-rendered as a fresh trace (new indices, new clock) in the reference's
//! session.

use oracle_core::{
    ArgValue, CoreError, CoreResult, INJECT_AP_ID, LogLevel, RawRecord, SimSeed, TraceRecord,
};
use oracle_log::{TraceSession, TraceWriter, WriterConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Context id of the injected record
pub const INJECTED_CT_ID: &str = "UNEXPECTED";

/// Payload of the injected record
pub const INJECTED_MESSAGE: &str = "An unexpected event occurred.";

/// Template written over a corrupted record
pub const CORRUPTED_TEMPLATE: &str = "Corrupted data detected: val=%.2f, status=0x%X";

/// Seconds between the re-rendered clock origin and the reference's first record
pub const RERENDER_OFFSET_SECS: f64 = 1.0;

/// Kind of defect to manufacture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MutationKind {
    /// One record strictly inside the trace is removed
    MissingLog,
    /// One synthetic WARN record is inserted after the first record
    ExtraLog,
    /// Two adjacent records are swapped
    OutOfOrder,
    /// One record's template and values are overwritten
    DataCorruption,
}

impl MutationKind {
    /// Every kind, in output order
    pub const ALL: [MutationKind; 4] = [
        Self::MissingLog,
        Self::ExtraLog,
        Self::OutOfOrder,
        Self::DataCorruption,
    ];

    /// Name used in defect file names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingLog => "MissingLog",
            Self::ExtraLog => "ExtraLog",
            Self::OutOfOrder => "OutOfOrder",
            Self::DataCorruption => "DataCorruption",
        }
    }

    /// Shortest trace this kind applies to
    #[must_use]
    pub const fn min_len(self) -> usize {
        match self {
            Self::OutOfOrder => 5,
            Self::MissingLog | Self::ExtraLog | Self::DataCorruption => 3,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::ParseError {
                message: format!("unknown mutation kind '{s}'"),
            })
    }
}

/// Which mutations to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Kinds to produce, in order
    pub kinds: Vec<MutationKind>,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            kinds: MutationKind::ALL.to_vec(),
        }
    }
}

impl MutationConfig {
    /// Restrict to `kinds`
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<MutationKind>) -> Self {
        self.kinds = kinds;
        self
    }
}

/// One defect variant of a reference trace
#[derive(Debug, Clone, PartialEq)]
pub struct MutatedTrace {
    /// Mutation applied
    pub kind: MutationKind,
    /// Position in the reference where the corruption was applied
    pub position: usize,
    /// Re-rendered defect trace
    pub records: Vec<TraceRecord>,
}

/// Manufactures defect variants
pub struct MutationEngine {
    config: MutationConfig,
    writer_config: WriterConfig,
    seed: SimSeed,
}

impl MutationEngine {
    /// Create an engine drawing positions and fallbacks from `seed`
    #[must_use]
    pub fn new(seed: SimSeed) -> Self {
        Self {
            config: MutationConfig::default(),
            writer_config: WriterConfig::default(),
            seed,
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: MutationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the writer used to re-render variants
    #[must_use]
    pub fn with_writer_config(mut self, writer_config: WriterConfig) -> Self {
        self.writer_config = writer_config;
        self
    }

    /// Produce every applicable variant of `reference`.
    ///
    /// SCENARIO markers bracketing the trace stay in place and are never
    /// mutated; positions and length checks count application records only.
    /// Traces with fewer than three application records yield nothing.
    #[must_use]
    pub fn mutate(&self, reference: &[TraceRecord]) -> Vec<MutatedTrace> {
        let Some(first) = reference.first() else {
            return Vec::new();
        };
        let framed = Framed::split(reference);
        if framed.body.len() < 3 {
            tracing::info!(records = framed.body.len(), "trace too short to mutate");
            return Vec::new();
        }

        let session = TraceSession::new(first.session_id, first.timestamp - RERENDER_OFFSET_SECS);
        let writer_config = self.writer_config.clone().with_ecu_id(&first.ecu_id);

        let mut variants = Vec::new();
        for kind in MutationKind::ALL {
            if !self.config.kinds.contains(&kind) {
                continue;
            }
            let seed = self.seed.derive(kind.as_str());
            let mut body = framed.body.clone();
            let Some(at) = apply(kind, &mut body, &mut seed.rng()) else {
                tracing::debug!(%kind, records = framed.body.len(), "mutation not applicable");
                continue;
            };
            let position = framed.lead.len() + at;
            tracing::debug!(%kind, position, "mutation applied");

            let mut writer = TraceWriter::new(writer_config.clone(), &seed, session);
            variants.push(MutatedTrace {
                kind,
                position,
                records: writer.write_all(&framed.rejoin(body)),
            });
        }
        variants
    }
}

/// A reference reduced to raw form, with its SCENARIO brackets set aside
struct Framed {
    lead: Vec<RawRecord>,
    body: Vec<RawRecord>,
    trail: Vec<RawRecord>,
}

impl Framed {
    fn split(reference: &[TraceRecord]) -> Self {
        let start = reference
            .iter()
            .position(|r| !r.is_scenario_marker())
            .unwrap_or(reference.len());
        let end = reference
            .iter()
            .rposition(|r| !r.is_scenario_marker())
            .map_or(start, |last| last + 1);
        let raw = |records: &[TraceRecord]| -> Vec<RawRecord> {
            records.iter().map(RawRecord::from_rendered).collect()
        };
        Self {
            lead: raw(&reference[..start]),
            body: raw(&reference[start..end]),
            trail: raw(&reference[end..]),
        }
    }

    fn rejoin(&self, body: Vec<RawRecord>) -> Vec<RawRecord> {
        let mut raws = Vec::with_capacity(self.lead.len() + body.len() + self.trail.len());
        raws.extend(self.lead.iter().cloned());
        raws.extend(body);
        raws.extend(self.trail.iter().cloned());
        raws
    }
}

/// Apply `kind` to `raws` in place; the chosen position, or `None` when the
/// trace is too short for it
pub fn apply(kind: MutationKind, raws: &mut Vec<RawRecord>, rng: &mut ChaCha8Rng) -> Option<usize> {
    let len = raws.len();
    if len < kind.min_len() {
        return None;
    }
    let position = match kind {
        MutationKind::MissingLog => {
            let at = rng.gen_range(1..=len - 2);
            raws.remove(at);
            at
        }
        MutationKind::ExtraLog => {
            let at = rng.gen_range(1..=len - 1);
            raws.insert(at, injected_record());
            at
        }
        MutationKind::OutOfOrder => {
            let at = rng.gen_range(1..=len - 3);
            raws.swap(at, at + 1);
            at
        }
        MutationKind::DataCorruption => {
            let at = rng.gen_range(0..len);
            raws[at].message_template = CORRUPTED_TEMPLATE.to_string();
            raws[at].values = vec![ArgValue::Float(-9999.99), ArgValue::Int(4_294_967_295)];
            at
        }
    };
    Some(position)
}

/// The record inserted by [`MutationKind::ExtraLog`]
#[must_use]
pub fn injected_record() -> RawRecord {
    RawRecord::new(
        LogLevel::Warn.as_str(),
        INJECT_AP_ID,
        INJECTED_CT_ID,
        INJECTED_MESSAGE,
    )
}
