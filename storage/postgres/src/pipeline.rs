use std::collections::BTreeSet;

use async_trait::async_trait;
use crudbench_core::{ConnectionError, ExecutionStrategy, Record, RecordId, StoreError, USERS_TABLE_DDL};
use futures_util::future::try_join_all;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use crate::{connection_error, store_error, to_i64, to_u64, COUNT_USERS, SELECT_IDS, TRUNCATE_USERS};

const INSERT_USER: &str = r#"INSERT INTO "users"("name", "email", "created_at") VALUES ($1, $2, $3)"#;
const UPDATE_NAME: &str = r#"UPDATE "users" SET "name" = $1 WHERE "id" = $2"#;
const DELETE_USER: &str = r#"DELETE FROM "users" WHERE "id" = $1"#;

/// Sends one single-row statement per record, but queues the whole chunk on
/// one connection before waiting for any response. Each chunk runs inside a
/// transaction, so a failing row rolls back its siblings.
pub struct PostgresPipeline {
    client: Mutex<Client>,
    connection: JoinHandle<()>,
}

impl PostgresPipeline {
    pub async fn connect(connection_string: &str) -> Result<Self, ConnectionError> {
        let (client, connection) =
            tokio_postgres::connect(connection_string, NoTls).await.map_err(|err| connection_error(connection_string, err))?;

        let target = crate::describe_target(connection_string);
        let task_target = target.clone();
        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgresPipeline({}): connection error: {}", task_target, e);
            }
        });

        info!("PostgresPipeline: connected to {}", target);
        Ok(Self { client: Mutex::new(client), connection })
    }

    /// Prepares `statement` once and runs it for every parameter row on the
    /// same transaction, with every execution in flight at once.
    async fn pipelined<'a, P>(&self, statement: &str, rows: impl IntoIterator<Item = P>) -> Result<u64, StoreError>
    where P: IntoIterator<Item = &'a (dyn ToSql + Sync)> + Send, P::IntoIter: ExactSizeIterator + Send {
        let mut client = self.client.lock().await;
        let transaction = client.transaction().await.map_err(store_error)?;
        let prepared = transaction.prepare(statement).await.map_err(store_error)?;

        let executions = rows.into_iter().map(|params| transaction.execute_raw(&prepared, params));
        let affected: u64 = match try_join_all(executions).await {
            Ok(counts) => counts.into_iter().sum(),
            Err(err) => {
                debug!("PostgresPipeline.pipelined: rolling back {}: {}", statement, err);
                // dropping the transaction rolls it back
                return Err(store_error(err));
            }
        };

        transaction.commit().await.map_err(store_error)?;
        Ok(affected)
    }
}

// One statement per id, so a repeated id would otherwise be counted twice.
fn distinct(ids: &[RecordId]) -> BTreeSet<i64> { ids.iter().map(RecordId::get).collect() }

impl Drop for PostgresPipeline {
    fn drop(&mut self) { self.connection.abort(); }
}

#[async_trait]
impl ExecutionStrategy for PostgresPipeline {
    fn name(&self) -> &str { "batched" }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.client.lock().await;
        client.batch_execute(USERS_TABLE_DDL).await.map_err(store_error)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let client = self.client.lock().await;
        client.batch_execute(TRUNCATE_USERS).await.map_err(store_error)
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        debug!("PostgresPipeline.bulk_insert: {} rows", records.len());
        let rows = records.iter().map(|r| [&r.name as &(dyn ToSql + Sync), &r.email, &r.created_at]);
        self.pipelined(INSERT_USER, rows).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let client = self.client.lock().await;
        let row = client.query_one(COUNT_USERS, &[]).await.map_err(store_error)?;
        let count: i64 = row.try_get(0).map_err(store_error)?;
        Ok(to_u64(count))
    }

    async fn select_ids(&self, limit: u64, offset: u64) -> Result<Vec<RecordId>, StoreError> {
        let client = self.client.lock().await;
        let rows = client.query(SELECT_IDS, &[&to_i64(limit), &to_i64(offset)]).await.map_err(store_error)?;
        rows.iter().map(|row| row.try_get::<_, i64>(0).map(RecordId).map_err(store_error)).collect()
    }

    async fn bulk_update_names(&self, ids: &[RecordId], new_name: &str) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let new_name = new_name.to_owned();
        let ids = distinct(ids);
        let rows = ids.iter().map(|id| [&new_name as &(dyn ToSql + Sync), id]);
        self.pipelined(UPDATE_NAME, rows).await
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids = distinct(ids);
        let rows = ids.iter().map(|id| [id as &(dyn ToSql + Sync)]);
        self.pipelined(DELETE_USER, rows).await
    }
}
