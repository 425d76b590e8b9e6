#![cfg(feature = "postgres")]

mod common;
mod pg_common;

use anyhow::Result;
use common::*;
use crudbench::orm::SeaOrmStrategy;
use crudbench::postgres::{PostgresPipeline, PostgresRaw};
use crudbench::{BenchError, Comparison, ExecutionStrategy, Phase, Runner, StoreError};
use pg_common::*;

async fn strategies(url: &str) -> Result<Vec<Box<dyn ExecutionStrategy>>> {
    Ok(vec![
        Box::new(PostgresRaw::connect(url).await?),
        Box::new(PostgresPipeline::connect(url).await?),
        Box::new(SeaOrmStrategy::connect(url).await?),
    ])
}

#[tokio::test]
async fn test_small_scenario_every_strategy() -> Result<()> {
    let (_container, url) = create_postgres_container().await?;

    let mut comparison = Comparison::default();
    for strategy in strategies(&url).await? {
        let report = Runner::new(small_scenario(), strategy).run().await?;
        assert_small_scenario(&report);

        let rows = names(&url).await?;
        assert_eq!(rows.len(), 15);
        let renamed: Vec<i64> = rows.iter().filter(|(_, name)| name == "Updated_User_Bulk").map(|(id, _)| *id).collect();
        assert_eq!(renamed, vec![1, 2, 3, 4], "{}", report.strategy);
        assert_eq!(rows[4], (5, "User_000005".to_owned()));
        assert_eq!(rows[14], (15, "New_User_000015".to_owned()));

        comparison.push(report);
    }

    let strategies: Vec<&str> = comparison.reports.iter().map(|report| report.strategy.as_str()).collect();
    assert_eq!(strategies, vec!["raw", "batched", "orm"]);
    Ok(())
}

#[tokio::test]
async fn test_delete_skips_first_thousand_every_strategy() -> Result<()> {
    let (_container, url) = create_postgres_container().await?;

    for strategy in strategies(&url).await? {
        let report = Runner::new(config(1_050, 500, 10, 20, 0), strategy).run().await?;
        assert_eq!(rows(&report, Phase::Delete), 20, "{}", report.strategy);
        assert_eq!(rows(&report, Phase::FinalReadCount), 1_030);

        let ids: Vec<i64> = names(&url).await?.into_iter().map(|(id, _)| id).collect();
        let expected: Vec<i64> = (1..=1_000).chain(1_021..=1_050).collect();
        assert_eq!(ids, expected, "{}", report.strategy);
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_table_fails_at_reset() -> Result<()> {
    let (_container, url) = create_postgres_container().await?;
    drop_users(&url).await?;

    for strategy in strategies(&url).await? {
        let name = strategy.name().to_owned();
        let failure = Runner::new(small_scenario(), strategy).run().await.unwrap_err();

        assert!(matches!(failure.error, BenchError::Phase { phase: Phase::Reset, source: StoreError::Storage(_) }), "{name}: {}", failure.error);
        assert_eq!(failure.report.phases.len(), 1);
        assert!(failure.report.phase(Phase::Reset).unwrap().is_failed());
    }
    Ok(())
}

#[tokio::test]
async fn test_ensure_schema_recreates_table() -> Result<()> {
    let (_container, url) = create_postgres_container().await?;
    drop_users(&url).await?;

    let strategy = PostgresPipeline::connect(&url).await?;
    strategy.ensure_schema().await?;
    let report = Runner::new(small_scenario(), strategy).run().await?;
    assert_small_scenario(&report);
    Ok(())
}
