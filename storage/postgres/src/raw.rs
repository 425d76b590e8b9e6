use async_trait::async_trait;
use bb8::PooledConnection;
use bb8_postgres::{tokio_postgres::NoTls, PostgresConnectionManager};
use crudbench_core::{ConnectionError, ExecutionStrategy, Record, RecordId, StoreError, USERS_TABLE, USERS_TABLE_DDL};
use std::time::Duration;
use tracing::{debug, info};

use crate::sql_builder::{self, SqlBuilder};
use crate::{connection_error, store_error, to_i64, to_u64, COUNT_USERS, SELECT_IDS, TRUNCATE_USERS};

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues one statement per operation: a multi-row `INSERT` per chunk, and a
/// single `WHERE "id" IN (...)` for updates and deletes.
pub struct PostgresRaw {
    pool: bb8::Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresRaw {
    pub fn new(pool: bb8::Pool<PostgresConnectionManager<NoTls>>) -> Self { Self { pool } }

    /// Builds a single-connection pool and checks the store answers.
    pub async fn connect(connection_string: &str) -> Result<Self, ConnectionError> {
        let manager =
            PostgresConnectionManager::new_from_stringlike(connection_string, NoTls).map_err(|err| connection_error(connection_string, err))?;
        let pool = bb8::Pool::builder()
            .max_size(1)
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| connection_error(connection_string, err))?;

        {
            let client = pool.get().await.map_err(|err| connection_error(connection_string, err))?;
            client.simple_query("SELECT 1").await.map_err(|err| connection_error(connection_string, err))?;
        }

        info!("PostgresRaw: connected to {}", crate::describe_target(connection_string));
        Ok(Self { pool })
    }

    async fn client(&self) -> Result<PooledConnection<'_, PostgresConnectionManager<NoTls>>, StoreError> {
        self.pool.get().await.map_err(StoreError::storage)
    }

    async fn execute(&self, builder: SqlBuilder) -> Result<u64, StoreError> {
        let (sql, args) = builder.build()?;
        let client = self.client().await?;
        debug!("PostgresRaw.execute: {} ({} args)", truncate(&sql), args.len());
        client.execute_raw(&sql, args).await.map_err(store_error)
    }
}

fn truncate(sql: &str) -> &str {
    match sql.char_indices().nth(160) {
        Some((index, _)) => &sql[..index],
        None => sql,
    }
}

#[async_trait]
impl ExecutionStrategy for PostgresRaw {
    fn name(&self) -> &str { "raw" }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        debug!("PostgresRaw.ensure_schema: {}", USERS_TABLE_DDL);
        client.batch_execute(USERS_TABLE_DDL).await.map_err(store_error)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client.batch_execute(TRUNCATE_USERS).await.map_err(store_error)
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.execute(sql_builder::insert_records(USERS_TABLE, records)?).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let client = self.client().await?;
        let row = client.query_one(COUNT_USERS, &[]).await.map_err(store_error)?;
        let count: i64 = row.try_get(0).map_err(store_error)?;
        Ok(to_u64(count))
    }

    async fn select_ids(&self, limit: u64, offset: u64) -> Result<Vec<RecordId>, StoreError> {
        let client = self.client().await?;
        let rows = client.query(SELECT_IDS, &[&to_i64(limit), &to_i64(offset)]).await.map_err(store_error)?;
        rows.iter().map(|row| row.try_get::<_, i64>(0).map(RecordId).map_err(store_error)).collect()
    }

    async fn bulk_update_names(&self, ids: &[RecordId], new_name: &str) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.execute(sql_builder::update_names(USERS_TABLE, ids, new_name)?).await
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.execute(sql_builder::delete_ids(USERS_TABLE, ids)?).await
    }
}
