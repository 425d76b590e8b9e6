//! In-memory execution strategy.
//!
//! Mirrors the outward behavior of the SQL-backed strategies (unique emails,
//! identity restart on reset, all-or-nothing chunks) without a store. Used for
//! dry runs of the orchestration and in tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::error::StoreError;
use crate::record::{Record, RecordId};
use crate::strategy::ExecutionStrategy;

#[derive(Error, Debug)]
#[error("duplicate key value violates unique constraint on email: {0}")]
pub struct DuplicateEmail(pub String);

#[derive(Error, Debug)]
#[error("memory store lock poisoned")]
struct Poisoned;

/// A row as the memory store keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, StoredRow>,
    emails: HashSet<String>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self { Self { rows: BTreeMap::new(), emails: HashSet::new(), next_id: 1 } }
}

/// Cloning shares the underlying table, so a test can keep a handle for
/// inspection while the runner owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn table(&self) -> Result<MutexGuard<'_, Table>, StoreError> { self.table.lock().map_err(|_| StoreError::storage(Poisoned)) }

    /// Snapshot of every row, keyed by identifier.
    pub fn rows(&self) -> Result<BTreeMap<RecordId, StoredRow>, StoreError> {
        Ok(self.table()?.rows.iter().map(|(id, row)| (RecordId(*id), row.clone())).collect())
    }

    /// The identifier the next insert would receive.
    pub fn next_id(&self) -> Result<RecordId, StoreError> { Ok(RecordId(self.table()?.next_id)) }
}

#[async_trait]
impl ExecutionStrategy for MemoryStore {
    fn name(&self) -> &str { "memory" }

    async fn ensure_schema(&self) -> Result<(), StoreError> { Ok(()) }

    async fn reset(&self) -> Result<(), StoreError> {
        let mut table = self.table()?;
        *table = Table::default();
        Ok(())
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<u64, StoreError> {
        let mut table = self.table()?;

        // validate the whole chunk before touching the table
        let mut incoming = HashSet::with_capacity(records.len());
        for record in records {
            if table.emails.contains(&record.email) || !incoming.insert(record.email.as_str()) {
                return Err(StoreError::constraint(DuplicateEmail(record.email.clone())));
            }
        }

        for record in records {
            let id = table.next_id;
            table.next_id += 1;
            table.emails.insert(record.email.clone());
            table.rows.insert(id, StoredRow { name: record.name.clone(), email: record.email.clone(), created_at: record.created_at });
        }
        debug!("MemoryStore.bulk_insert: {} rows", records.len());
        Ok(records.len() as u64)
    }

    async fn count(&self) -> Result<u64, StoreError> { Ok(self.table()?.rows.len() as u64) }

    async fn select_ids(&self, limit: u64, offset: u64) -> Result<Vec<RecordId>, StoreError> {
        let table = self.table()?;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(table.rows.keys().skip(skip).take(take).map(|id| RecordId(*id)).collect())
    }

    async fn bulk_update_names(&self, ids: &[RecordId], new_name: &str) -> Result<u64, StoreError> {
        let mut table = self.table()?;
        let mut updated = 0;
        for id in ids.iter().collect::<HashSet<_>>() {
            if let Some(row) = table.rows.get_mut(&id.0) {
                row.name = new_name.to_owned();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<u64, StoreError> {
        let mut table = self.table()?;
        let mut deleted = 0;
        for id in ids {
            if let Some(row) = table.rows.remove(&id.0) {
                table.emails.remove(&row.email);
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
