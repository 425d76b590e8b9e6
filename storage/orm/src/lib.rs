//! sea-orm execution strategy for crudbench.
//!
//! Goes through the ORM's entity layer for every operation: a multi-row
//! `insert_many` per chunk, and `update_many`/`delete_many` filtered on the
//! selected identifiers.

use std::time::Duration;

use async_trait::async_trait;
use crudbench_core::{ConnectionError, ExecutionStrategy, Record, RecordId, StoreError, USERS_TABLE_DDL};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr,
};
use tracing::{debug, info};
use url::Url;

pub mod user;

/// Postgres caps a statement at this many bind parameters.
pub const MAX_BIND_PARAMETERS: usize = u16::MAX as usize;
const PARAMETERS_PER_ROW: usize = 3;

const TRUNCATE_USERS: &str = r#"TRUNCATE TABLE "users" RESTART IDENTITY"#;

pub struct SeaOrmStrategy {
    db: DatabaseConnection,
}

impl SeaOrmStrategy {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Opens a single-connection pool. Takes URL-form connection strings only.
    pub async fn connect(url: &str) -> Result<Self, ConnectionError> {
        let mut options = ConnectOptions::new(url.to_owned());
        options.max_connections(1).min_connections(1).connect_timeout(Duration::from_secs(10)).sqlx_logging(false);

        let db = Database::connect(options).await.map_err(|err| ConnectionError::new(describe_target(url), err))?;
        db.ping().await.map_err(|err| ConnectionError::new(describe_target(url), err))?;

        info!("SeaOrmStrategy: connected to {}", describe_target(url));
        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection { &self.db }
}

/// Maps an ORM error onto the harness' store taxonomy.
pub fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) | Some(SqlErr::ForeignKeyConstraintViolation(_)) => StoreError::constraint(err),
        _ => StoreError::storage(err),
    }
}

/// The connection URL with its password removed.
pub fn describe_target(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return "database (unparseable connection string)".to_owned();
    };
    match parsed.set_password(None) {
        Ok(()) => parsed.to_string(),
        Err(()) => "database (unparseable connection string)".to_owned(),
    }
}

fn check_parameters(required: usize) -> Result<(), StoreError> {
    if required > MAX_BIND_PARAMETERS {
        return Err(StoreError::TooManyParameters { required, max: MAX_BIND_PARAMETERS });
    }
    Ok(())
}

fn to_active_model(record: &Record) -> user::ActiveModel {
    user::ActiveModel { id: NotSet, name: Set(record.name.clone()), email: Set(record.email.clone()), created_at: Set(record.created_at) }
}

#[async_trait]
impl ExecutionStrategy for SeaOrmStrategy {
    fn name(&self) -> &str { "orm" }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.db.execute_unprepared(USERS_TABLE_DDL).await.map_err(store_error)?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.db.execute_unprepared(TRUNCATE_USERS).await.map_err(store_error)?;
        Ok(())
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        check_parameters(records.len() * PARAMETERS_PER_ROW)?;

        debug!("SeaOrmStrategy.bulk_insert: {} rows", records.len());
        user::Entity::insert_many(records.iter().map(to_active_model)).exec_without_returning(&self.db).await.map_err(store_error)
    }

    async fn count(&self) -> Result<u64, StoreError> { user::Entity::find().count(&self.db).await.map_err(store_error) }

    async fn select_ids(&self, limit: u64, offset: u64) -> Result<Vec<RecordId>, StoreError> {
        let ids: Vec<i64> = user::Entity::find()
            .select_only()
            .column(user::Column::Id)
            .order_by_asc(user::Column::Id)
            .limit(limit)
            .offset(offset)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(store_error)?;
        Ok(ids.into_iter().map(RecordId).collect())
    }

    async fn bulk_update_names(&self, ids: &[RecordId], new_name: &str) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        // the new name takes one slot
        check_parameters(ids.len() + 1)?;
        let result = user::Entity::update_many()
            .col_expr(user::Column::Name, Expr::value(new_name.to_owned()))
            .filter(user::Column::Id.is_in(ids.iter().map(RecordId::get)))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected)
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        check_parameters(ids.len())?;
        let result =
            user::Entity::delete_many().filter(user::Column::Id.is_in(ids.iter().map(RecordId::get))).exec(&self.db).await.map_err(store_error)?;
        Ok(result.rows_affected)
    }
}
