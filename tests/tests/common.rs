#![allow(dead_code)]

use std::str::FromStr;

use crudbench::{Phase, Report, WorkloadConfig};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").ok().and_then(|level| Level::from_str(&level).ok()).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).with_test_writer().init();
}

pub fn config(initial: u64, batch: u64, update: u64, delete: u64, new: u64) -> WorkloadConfig {
    WorkloadConfig::builder().initial_count(initial).batch_size(batch).update_count(update).delete_count(delete).new_count(new).build().unwrap()
}

pub fn rows(report: &Report, phase: Phase) -> u64 { report.phase(phase).unwrap_or_else(|| panic!("{phase} missing from report")).rows_affected }

/// 10 seeded in chunks of 3, 4 renamed, nothing deleted (fewer rows than the
/// delete offset), 5 created in two chunks.
pub fn small_scenario() -> WorkloadConfig { config(10, 3, 4, 2, 5) }

pub fn assert_small_scenario(report: &Report) {
    assert!(report.is_complete(), "{}", report.render());
    assert_eq!(report.phases.iter().map(|result| result.phase).collect::<Vec<_>>(), Phase::ALL.to_vec());
    assert_eq!(rows(report, Phase::Reset), 0);
    assert_eq!(rows(report, Phase::Seed), 10);
    let chunks: Vec<u64> = report.phase(Phase::Seed).unwrap().batches.iter().map(|batch| batch.rows).collect();
    assert_eq!(chunks, vec![3, 3, 3, 1]);
    assert_eq!(rows(report, Phase::ReadCount), 10);
    assert_eq!(rows(report, Phase::Update), 4);
    assert_eq!(rows(report, Phase::Delete), 0);
    assert_eq!(rows(report, Phase::Create), 5);
    assert_eq!(report.phase(Phase::Create).unwrap().batches.len(), 2);
    assert_eq!(rows(report, Phase::FinalReadCount), 15);
    assert_eq!(report.total, report.phases.iter().map(|result| result.duration).sum::<std::time::Duration>());
}
