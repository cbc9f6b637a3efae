//! Every mutation kind is detected against its reference

use oracle_core::{RawRecord, SimSeed, TraceRecord};
use oracle_diff::{DeviationType, TraceComparator};
use oracle_log::{TraceSession, TraceWriter, WriterConfig};
use oracle_mutate::{MutationEngine, MutationKind};

fn reference() -> Vec<TraceRecord> {
    let raws: Vec<RawRecord> = ["boot", "sensor ok", "door locked", "engine on", "ready", "idle"]
        .iter()
        .map(|p| RawRecord::new("INFO", "ECM", "MAIN", *p))
        .collect();
    TraceWriter::new(
        WriterConfig::default(),
        &SimSeed::from_literal(3),
        TraceSession::new(1_700_001_000, 1_700_000_000.0),
    )
    .write_all(&raws)
}

fn deviation_kinds(kind: MutationKind) -> Vec<DeviationType> {
    let reference = reference();
    let variant = MutationEngine::new(SimSeed::from_literal(99))
        .mutate(&reference)
        .into_iter()
        .find(|v| v.kind == kind)
        .unwrap();
    TraceComparator::new()
        .compare(&reference, &variant.records)
        .into_iter()
        .map(|d| d.kind)
        .collect()
}

#[test]
fn test_reference_against_itself_is_clean() {
    let reference = reference();
    let report = TraceComparator::new().report("ref_path0.json", &reference, &reference);
    assert!(report.is_clean());
}

#[test]
fn test_missing_log_detected() {
    assert_eq!(deviation_kinds(MutationKind::MissingLog), vec![DeviationType::MissingLog]);
}

#[test]
fn test_extra_log_detected() {
    assert_eq!(deviation_kinds(MutationKind::ExtraLog), vec![DeviationType::ExtraLog]);
}

#[test]
fn test_out_of_order_detected() {
    assert_eq!(
        deviation_kinds(MutationKind::OutOfOrder),
        vec![DeviationType::MissingLog, DeviationType::ExtraLog]
    );
}

#[test]
fn test_corruption_detected() {
    assert_eq!(deviation_kinds(MutationKind::DataCorruption), vec![DeviationType::LogMismatch]);
}

#[test]
fn test_rerendered_reference_is_clean() {
    // re-rendering shifts timestamps and indices but not content
    let reference = reference();
    let raws: Vec<RawRecord> = reference.iter().map(RawRecord::from_rendered).collect();
    let rerendered = TraceWriter::new(
        WriterConfig::default(),
        &SimSeed::from_literal(5),
        TraceSession::new(42, 10.0),
    )
    .write_all(&raws);
    assert!(TraceComparator::new().compare(&reference, &rerendered).is_empty());
}

fn bracketed(payloads: &[&str]) -> Vec<TraceRecord> {
    let raws: Vec<RawRecord> = payloads
        .iter()
        .map(|p| RawRecord::new("INFO", "ECM", "MAIN", *p))
        .collect();
    TraceWriter::new(
        WriterConfig::default().with_scenario_markers(true),
        &SimSeed::from_literal(3),
        TraceSession::new(1_700_001_000, 1_700_000_000.0),
    )
    .write_scenario("door", &raws)
}

#[test]
fn test_bracketed_defects_never_compare_clean() {
    let short = bracketed(&["boot", "sensor ok", "ready"]);
    let long = bracketed(&["boot", "sensor ok", "door locked", "engine on", "ready", "idle"]);
    for reference in [&short, &long] {
        for seed in 0..200 {
            let variants = MutationEngine::new(SimSeed::from_literal(seed)).mutate(reference);
            assert!(!variants.is_empty());
            for variant in variants {
                let deviations = TraceComparator::new().compare(reference, &variant.records);
                assert!(
                    !deviations.is_empty(),
                    "{} variant with seed {seed} compared clean",
                    variant.kind
                );
            }
        }
    }
}
