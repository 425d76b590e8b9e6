mod common;

use anyhow::Result;
use async_trait::async_trait;
use common::*;
use crudbench::{
    BenchError, Comparison, ExecutionStrategy, MemoryStore, Phase, Record, RecordId, Runner, StoreError,
};

#[tokio::test]
async fn test_small_scenario_in_memory() -> Result<()> {
    let report = Runner::new(small_scenario(), MemoryStore::new()).run().await?;
    assert_small_scenario(&report);
    assert_eq!(report.strategy, "memory");
    Ok(())
}

#[tokio::test]
async fn test_json_report_carries_every_phase() -> Result<()> {
    let report = Runner::new(small_scenario(), MemoryStore::new()).run().await?;
    let json = report.to_json()?;
    for phase in Phase::ALL {
        assert!(json.contains(phase.as_str()), "{phase} missing from {json}");
    }
    Ok(())
}

#[tokio::test]
async fn test_comparison_has_a_column_per_run() -> Result<()> {
    let mut comparison = Comparison::default();
    comparison.push(Runner::new(small_scenario(), MemoryStore::new()).run().await?);
    comparison.push(Runner::new(config(20, 5, 2, 1, 3), MemoryStore::new()).run().await?);

    let rendered = comparison.render();
    assert_eq!(rendered.matches("memory").count(), 2);
    assert!(rendered.contains("Total"));
    Ok(())
}

/// Passes everything through to a memory store except updates, which always fail.
struct BrokenUpdates(MemoryStore);

#[async_trait]
impl ExecutionStrategy for BrokenUpdates {
    fn name(&self) -> &str { "broken-updates" }

    async fn ensure_schema(&self) -> Result<(), StoreError> { self.0.ensure_schema().await }

    async fn reset(&self) -> Result<(), StoreError> { self.0.reset().await }

    async fn bulk_insert(&self, records: &[Record]) -> Result<u64, StoreError> { self.0.bulk_insert(records).await }

    async fn count(&self) -> Result<u64, StoreError> { self.0.count().await }

    async fn select_ids(&self, limit: u64, offset: u64) -> Result<Vec<RecordId>, StoreError> { self.0.select_ids(limit, offset).await }

    async fn bulk_update_names(&self, _ids: &[RecordId], _new_name: &str) -> Result<u64, StoreError> {
        Err(StoreError::storage("connection reset by peer"))
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<u64, StoreError> { self.0.bulk_delete(ids).await }
}

#[tokio::test]
async fn test_failed_phase_ends_partial_report() {
    let store = MemoryStore::new();
    let failure = Runner::new(small_scenario(), BrokenUpdates(store.clone())).run().await.unwrap_err();

    assert!(matches!(failure.error, BenchError::Phase { phase: Phase::Update, .. }));
    let phases: Vec<Phase> = failure.report.phases.iter().map(|result| result.phase).collect();
    assert_eq!(phases, vec![Phase::Reset, Phase::Seed, Phase::ReadCount, Phase::Update]);
    assert!(failure.report.phase(Phase::Update).unwrap().is_failed());
    assert!(!failure.report.is_complete());
    assert!(failure.report.render().contains("FAILED"));
    // nothing after the failed phase ran
    assert_eq!(store.count().await.unwrap(), 10);
}
