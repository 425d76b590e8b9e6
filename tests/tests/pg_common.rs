#![cfg(feature = "postgres")]
#![allow(dead_code)]

use anyhow::Result;
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};

/// A fresh Postgres with the users table created, plus a URL for it that every
/// strategy (tokio-postgres and sea-orm alike) accepts.
pub async fn create_postgres_container() -> Result<(ContainerAsync<postgres::Postgres>, String)> {
    let container: ContainerAsync<postgres::Postgres> = postgres::Postgres::default()
        .with_db_name("crudbench")
        .with_user("postgres")
        .with_password("postgres")
        .with_init_sql(crudbench::USERS_TABLE_DDL.to_string().into_bytes())
        // if you want to inspect the container
        // .with_container_name("crudbench_pg")
        // .with_reuse(testcontainers::ReuseDirective::Always)
        .start()
        .await?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;

    Ok((container, format!("postgres://postgres:postgres@{host}:{port}/crudbench")))
}

/// `(id, name)` for every row, in id order.
pub async fn names(url: &str) -> Result<Vec<(i64, String)>> {
    let (client, connection) = tokio_postgres::connect(url, tokio_postgres::NoTls).await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    let rows = client.query(r#"SELECT "id", "name" FROM "users" ORDER BY "id""#, &[]).await?;
    Ok(rows.iter().map(|row| (row.get(0), row.get(1))).collect())
}

pub async fn drop_users(url: &str) -> Result<()> {
    let (client, connection) = tokio_postgres::connect(url, tokio_postgres::NoTls).await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    client.batch_execute(r#"DROP TABLE "users""#).await?;
    Ok(())
}
