use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{Record, RecordId};

/// A concrete way of issuing CRUD operations against the entity table.
///
/// Every implementation must behave identically from the outside (same inputs,
/// same outputs, same failure policy) so that timing differences between them
/// reflect only the call pattern underneath.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    /// Short human-readable identifier (e.g. "raw", "batched", "orm").
    fn name(&self) -> &str;

    /// Creates the entity table if it does not exist yet. Not part of any timed phase.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Empties the table and restarts its identifier sequence at 1. Idempotent.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Inserts every record in as few round trips as the strategy allows.
    /// A failure on any record fails the whole chunk; nothing is committed.
    async fn bulk_insert(&self, records: &[Record]) -> Result<u64, StoreError>;

    /// Current row count.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Up to `limit` identifiers in ascending order, after skipping `offset` rows.
    /// Returning fewer than `limit` is not an error.
    async fn select_ids(&self, limit: u64, offset: u64) -> Result<Vec<RecordId>, StoreError>;

    /// Sets the name of every listed row to `new_name`. Repeated identifiers
    /// count once.
    async fn bulk_update_names(&self, ids: &[RecordId], new_name: &str) -> Result<u64, StoreError>;

    /// Removes every listed row. Repeated identifiers count once.
    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<u64, StoreError>;
}

#[async_trait]
impl<T: ExecutionStrategy + ?Sized> ExecutionStrategy for Box<T> {
    fn name(&self) -> &str { (**self).name() }

    async fn ensure_schema(&self) -> Result<(), StoreError> { (**self).ensure_schema().await }

    async fn reset(&self) -> Result<(), StoreError> { (**self).reset().await }

    async fn bulk_insert(&self, records: &[Record]) -> Result<u64, StoreError> { (**self).bulk_insert(records).await }

    async fn count(&self) -> Result<u64, StoreError> { (**self).count().await }

    async fn select_ids(&self, limit: u64, offset: u64) -> Result<Vec<RecordId>, StoreError> { (**self).select_ids(limit, offset).await }

    async fn bulk_update_names(&self, ids: &[RecordId], new_name: &str) -> Result<u64, StoreError> {
        (**self).bulk_update_names(ids, new_name).await
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<u64, StoreError> { (**self).bulk_delete(ids).await }
}
