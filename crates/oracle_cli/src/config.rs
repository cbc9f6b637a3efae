//! Optional configuration file for the `oracle` binary.

use oracle_core::{SimSeed, Timestamp};
use oracle_log::{JsonDocument, TraceFileError, WriterConfig};
use oracle_trace::TracerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default working directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directories {
    /// Reference traces
    pub references: PathBuf,
    /// Defect traces
    pub defects: PathBuf,
    /// Comparison reports
    pub reports: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            references: PathBuf::from("traces/references"),
            defects: PathBuf::from("traces/defects"),
            reports: PathBuf::from("reports"),
        }
    }
}

/// Everything a run can be configured with
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Seed for every random draw; fresh entropy when unset
    pub seed: Option<u64>,
    /// Clock origin for new trace sessions, in epoch seconds; wall clock when unset
    pub epoch_secs: Option<f64>,
    pub writer: WriterConfig,
    pub tracer: TracerConfig,
    pub directories: Directories,
}

impl OracleConfig {
    /// Load `path`, or the defaults when no file is given
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self, TraceFileError> {
        match path {
            Some(path) => {
                let config = Self::read_from(path)?;
                tracing::debug!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Root seed; a command-line value wins over the file
    #[must_use]
    pub fn root_seed(&self, flag: Option<u64>) -> SimSeed {
        match flag.or(self.seed) {
            Some(seed) => SimSeed::from_literal(seed),
            None => {
                let seed = SimSeed::random();
                tracing::info!(seed = seed.seed, "no seed configured, drew one");
                seed
            }
        }
    }

    /// Clock origin for new sessions
    #[must_use]
    pub fn epoch(&self) -> f64 {
        self.epoch_secs
            .unwrap_or_else(|| Timestamp::now().as_secs_f64())
    }
}
