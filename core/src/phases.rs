//! Phase implementations. Each one performs its store work and reports rows
//! affected; timing marks are placed by the [`Runner`](crate::Runner).

use std::num::NonZeroU64;
use std::ops::Range;
use std::time::Instant;

use tracing::{debug, info};

use crate::batch::Batches;
use crate::error::StoreError;
use crate::generator::RecordGenerator;
use crate::instrumentation::{BatchTiming, TimingCollector};
use crate::record::Record;
use crate::strategy::ExecutionStrategy;

/// Replacement name written by the Update phase.
pub const UPDATED_NAME: &str = "Updated_User_Bulk";

/// Rows skipped before selecting Delete targets. Fixed regardless of table size:
/// on tables with fewer rows than this the Delete phase removes nothing.
pub const DELETE_OFFSET: u64 = 1000;

/// Empties the table and restarts the identifier sequence.
pub async fn reset<S: ExecutionStrategy + ?Sized>(strategy: &S) -> Result<u64, StoreError> {
    strategy.reset().await?;
    Ok(0)
}

/// Generates `range` in chunks of `batch_size` and inserts one chunk per round trip.
pub async fn insert_batches<S: ExecutionStrategy + ?Sized>(
    strategy: &S,
    generator: &RecordGenerator,
    range: Range<u64>,
    batch_size: NonZeroU64,
    collector: &mut TimingCollector,
) -> Result<u64, StoreError> {
    let batches = Batches::new(range, batch_size);
    let of = batches.len() as u64;
    let mut inserted = 0;

    for (index, chunk) in batches.enumerate() {
        let started = Instant::now();
        let records: Vec<Record> = generator.generate_range(chunk.clone()).collect();
        let rows = strategy.bulk_insert(&records).await?;
        let duration = started.elapsed();

        let number = index as u64 + 1;
        info!("{}: batch {}/{} rows {}-{} inserted in {:?}", strategy.name(), number, of, chunk.start + 1, chunk.end, duration);
        collector.record_batch(BatchTiming { number, of, range: chunk, rows, duration });
        inserted += rows;
    }

    Ok(inserted)
}

pub async fn read_count<S: ExecutionStrategy + ?Sized>(strategy: &S) -> Result<u64, StoreError> {
    let count = strategy.count().await?;
    info!("{}: found {} rows", strategy.name(), count);
    Ok(count)
}

/// Renames the first `update_count` rows.
pub async fn update<S: ExecutionStrategy + ?Sized>(strategy: &S, update_count: u64) -> Result<u64, StoreError> {
    let ids = strategy.select_ids(update_count, 0).await?;
    debug!("{}: selected {} of {} requested rows for update", strategy.name(), ids.len(), update_count);
    if ids.is_empty() {
        return Ok(0);
    }
    strategy.bulk_update_names(&ids, UPDATED_NAME).await
}

/// Removes `delete_count` rows starting after [`DELETE_OFFSET`].
pub async fn delete<S: ExecutionStrategy + ?Sized>(strategy: &S, delete_count: u64) -> Result<u64, StoreError> {
    let ids = strategy.select_ids(delete_count, DELETE_OFFSET).await?;
    debug!("{}: selected {} of {} requested rows for deletion", strategy.name(), ids.len(), delete_count);
    if ids.is_empty() {
        return Ok(0);
    }
    strategy.bulk_delete(&ids).await
}
