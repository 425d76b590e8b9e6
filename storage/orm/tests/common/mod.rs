//! Common utilities for sea-orm strategy tests

#![allow(dead_code)]

use anyhow::Result;
use chrono::{TimeZone, Utc};
use crudbench_core::{Record, RecordGenerator};
use std::str::FromStr;
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// Starts a throwaway Postgres and returns it with a URL for it.
pub async fn create_postgres_container() -> Result<(ContainerAsync<postgres::Postgres>, String)> {
    let container: ContainerAsync<postgres::Postgres> =
        postgres::Postgres::default().with_db_name("crudbench").with_user("postgres").with_password("postgres").start().await?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;

    Ok((container, format!("postgres://postgres:postgres@{host}:{port}/crudbench")))
}

pub fn seeded(start: u64, count: u64) -> Vec<Record> {
    RecordGenerator::seeded(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()).generate(start, count).collect()
}
