//! Trace writer: turns raw records into indexed, timestamped trace records.
//!
//! A writer owns one session. Its session id and ECU id are constant across
//! every record it renders; its clock only moves forward, by a random delta
//! before each record.

use crate::format::render_payload;
use oracle_core::{
    LogLevel, RECORD_TYPE_LOG, RawRecord, SCENARIO_AP_ID, SimSeed, TraceRecord, render_time,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// ECU id stamped on generated records unless configured otherwise
pub const DEFAULT_ECU_ID: &str = "SIM_ECU_01";

/// Writer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// ECU id stamped on every record
    pub ecu_id: String,
    /// Smallest clock advance between records, in seconds
    pub min_delta_secs: f64,
    /// Largest clock advance between records, in seconds
    pub max_delta_secs: f64,
    /// Bracket each written scenario with SCENARIO START/END records
    pub emit_scenario_markers: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            ecu_id: DEFAULT_ECU_ID.to_string(),
            min_delta_secs: 0.001,
            max_delta_secs: 0.015,
            emit_scenario_markers: false,
        }
    }
}

impl WriterConfig {
    /// Set the ECU id
    #[must_use]
    pub fn with_ecu_id(mut self, ecu_id: &str) -> Self {
        self.ecu_id = ecu_id.to_string();
        self
    }

    /// Set the clock advance range
    #[must_use]
    pub fn with_delta_range(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.min_delta_secs = min_secs;
        self.max_delta_secs = max_secs;
        self
    }

    /// Enable or disable scenario markers
    #[must_use]
    pub fn with_scenario_markers(mut self, enabled: bool) -> Self {
        self.emit_scenario_markers = enabled;
        self
    }

    /// Usable delta range: ordered, finite and non-negative
    fn delta_range(&self) -> (f64, f64) {
        let defaults = Self::default();
        let sane = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
        let lo = sane(self.min_delta_secs, defaults.min_delta_secs);
        let hi = sane(self.max_delta_secs, defaults.max_delta_secs);
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }
}

/// Session identity and clock origin shared by every record of one trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSession {
    /// Session id stamped on every record
    pub session_id: u64,
    /// Clock value before the first record; the first record is later
    pub start_timestamp: f64,
}

impl TraceSession {
    /// Session starting at `start_timestamp`
    #[must_use]
    pub fn new(session_id: u64, start_timestamp: f64) -> Self {
        Self {
            session_id,
            start_timestamp,
        }
    }

    /// Fresh session relative to `now`: id `now + [1000, 9999]`, clock
    /// starting `[100, 1000]` seconds in the past.
    pub fn starting_at<R: Rng + ?Sized>(now: f64, rng: &mut R) -> Self {
        let base = if now.is_finite() && now > 0.0 {
            now as u64
        } else {
            0
        };
        let session_id = base + rng.gen_range(1000..=9999);
        let start_timestamp = now - rng.gen_range(100.0..=1000.0);
        Self::new(session_id, start_timestamp)
    }
}

/// Renders raw records into trace records
pub struct RecordFormatter {
    ecu_id: String,
    rng: ChaCha8Rng,
}

impl RecordFormatter {
    /// Formatter whose fallback values come from `seed`
    #[must_use]
    pub fn new(ecu_id: &str, seed: &SimSeed) -> Self {
        Self {
            ecu_id: ecu_id.to_string(),
            rng: seed.derive("payload").into_rng(),
        }
    }

    /// Render one record
    pub fn render(
        &mut self,
        raw: &RawRecord,
        index: u64,
        timestamp: f64,
        session_id: u64,
    ) -> TraceRecord {
        TraceRecord {
            index,
            timestamp,
            time: render_time(timestamp),
            ecu_id: self.ecu_id.clone(),
            ap_id: raw.ap_id.clone(),
            ct_id: raw.ct_id.clone(),
            session_id,
            record_type: RECORD_TYPE_LOG.to_string(),
            log_level: raw.level.clone(),
            payload: render_payload(&raw.message_template, &raw.values, &mut self.rng),
        }
    }
}

/// Writes one trace: sequential indices from 1, a monotonic clock, one session
pub struct TraceWriter {
    config: WriterConfig,
    formatter: RecordFormatter,
    clock: ChaCha8Rng,
    session: TraceSession,
    current: f64,
    next_index: u64,
}

impl TraceWriter {
    /// Writer for an explicit session
    #[must_use]
    pub fn new(config: WriterConfig, seed: &SimSeed, session: TraceSession) -> Self {
        let formatter = RecordFormatter::new(&config.ecu_id, seed);
        Self {
            config,
            formatter,
            clock: seed.derive("clock").into_rng(),
            session,
            current: session.start_timestamp,
            next_index: 1,
        }
    }

    /// Writer for a session drawn relative to `now`
    #[must_use]
    pub fn with_fresh_session(config: WriterConfig, seed: &SimSeed, now: f64) -> Self {
        let mut rng = seed.derive("session").into_rng();
        let session = TraceSession::starting_at(now, &mut rng);
        Self::new(config, seed, session)
    }

    /// Session of this trace
    #[must_use]
    pub fn session(&self) -> TraceSession {
        self.session
    }

    /// Writer settings
    #[must_use]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Advance the clock and render the next record
    pub fn write(&mut self, raw: &RawRecord) -> TraceRecord {
        let (lo, hi) = self.config.delta_range();
        self.current += self.clock.gen_range(lo..=hi);
        let index = self.next_index;
        self.next_index += 1;
        self.formatter
            .render(raw, index, self.current, self.session.session_id)
    }

    /// Render a whole sequence in order
    pub fn write_all(&mut self, raws: &[RawRecord]) -> Vec<TraceRecord> {
        raws.iter().map(|raw| self.write(raw)).collect()
    }

    /// Render a scenario path, bracketed by SCENARIO markers when enabled
    pub fn write_scenario(&mut self, scenario: &str, raws: &[RawRecord]) -> Vec<TraceRecord> {
        if !self.config.emit_scenario_markers {
            return self.write_all(raws);
        }
        let mut records = Vec::with_capacity(raws.len() + 2);
        records.push(self.write(&scenario_marker(scenario, "START", "started")));
        records.extend(self.write_all(raws));
        records.push(self.write(&scenario_marker(scenario, "END", "finished")));
        records
    }
}

fn scenario_marker(scenario: &str, ct_id: &str, verb: &str) -> RawRecord {
    // The name is embedded in the template, so escape it.
    let template = format!("Scenario {} {}", scenario.replace('%', "%%"), verb);
    RawRecord::new(LogLevel::Info.as_str(), SCENARIO_AP_ID, ct_id, template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::ArgValue;

    fn raws(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| RawRecord::new("INFO", "ECM", "CTRL", format!("step {i}")))
            .collect()
    }

    fn writer(config: WriterConfig) -> TraceWriter {
        TraceWriter::new(
            config,
            &SimSeed::from_literal(11),
            TraceSession::new(1_700_001_234, 1_700_000_000.0),
        )
    }

    #[test]
    fn test_indices_and_session() {
        let records = writer(WriterConfig::default()).write_all(&raws(5));
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.index, i as u64 + 1);
            assert_eq!(record.session_id, 1_700_001_234);
            assert_eq!(record.ecu_id, DEFAULT_ECU_ID);
            assert_eq!(record.record_type, "LOG");
            assert_eq!(record.payload, format!("step {i}"));
        }
    }

    #[test]
    fn test_clock_advances_within_range() {
        let records = writer(WriterConfig::default()).write_all(&raws(50));
        let mut previous = 1_700_000_000.0;
        for record in &records {
            let delta = record.timestamp - previous;
            assert!(delta >= 0.001 - 1e-9 && delta <= 0.015 + 1e-9, "delta {delta}");
            assert_eq!(record.time, render_time(record.timestamp));
            previous = record.timestamp;
        }
    }

    #[test]
    fn test_reversed_delta_range_is_ordered() {
        let config = WriterConfig::default().with_delta_range(0.5, 0.25);
        let records = writer(config).write_all(&raws(10));
        let first = records[0].timestamp - 1_700_000_000.0;
        assert!((0.25 - 1e-9..=0.5 + 1e-9).contains(&first));
    }

    #[test]
    fn test_same_seed_same_trace() {
        let template = RawRecord::new("WARN", "ABS", "SENS", "wheel %d at %f")
            .with_values(vec![ArgValue::from("wheel"), ArgValue::from("speed")]);
        let a = writer(WriterConfig::default()).write_all(&[template.clone(), template.clone()]);
        let b = writer(WriterConfig::default()).write_all(&[template.clone(), template]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_scenario_markers() {
        let config = WriterConfig::default().with_scenario_markers(true);
        let records = writer(config).write_scenario("100%_Load", &raws(2));
        assert_eq!(records.len(), 4);
        assert!(records[0].is_scenario_marker());
        assert_eq!(records[0].ct_id, "START");
        assert_eq!(records[0].payload, "Scenario 100%_Load started");
        assert_eq!(records[3].ct_id, "END");
        assert_eq!(records[3].index, 4);
    }

    #[test]
    fn test_markers_off_by_default() {
        let records = writer(WriterConfig::default()).write_scenario("plain", &raws(2));
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.is_scenario_marker()));
    }

    #[test]
    fn test_fresh_session_ranges() {
        let now = 1_700_000_000.0;
        for seed in 0..20 {
            let writer =
                TraceWriter::with_fresh_session(WriterConfig::default(), &SimSeed::from_literal(seed), now);
            let session = writer.session();
            assert!((1_700_001_000..=1_700_009_999).contains(&session.session_id));
            let age = now - session.start_timestamp;
            assert!((100.0..=1000.0).contains(&age));
        }
    }

    #[test]
    fn test_custom_ecu() {
        let records = writer(WriterConfig::default().with_ecu_id("ECU_X")).write_all(&raws(1));
        assert_eq!(records[0].ecu_id, "ECU_X");
    }
}
