use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use crudbench::cli::CliArgs;
use crudbench::{BenchError, Comparison, ExecutionStrategy, Report, Runner};
use tracing::{error, info, Level};

fn emit(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // initialize tracing
    let level = std::env::var("LOG_LEVEL").ok().and_then(|level| Level::from_str(&level).ok()).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let args = CliArgs::parse();
    let config = args.workload().map_err(BenchError::from)?;
    info!("workload: {:?}", config);

    let mut comparison = Comparison::default();
    for choice in args.strategy.expand() {
        let strategy = choice.connect(&args.database_url).await.map_err(BenchError::from)?;
        if args.create_schema {
            strategy.ensure_schema().await.with_context(|| format!("creating the users table for {}", strategy.name()))?;
        }

        let runner = Runner::new(config, strategy);
        match runner.run().await {
            Ok(report) => {
                emit(&report, args.json)?;
                comparison.push(report);
            }
            Err(failure) => {
                error!("{} run aborted: {}", runner.strategy().name(), failure.error);
                emit(&failure.report, args.json)?;
                return Err(failure.into());
            }
        }
    }

    if comparison.reports.len() > 1 && !args.json {
        comparison.print_summary();
    }

    Ok(())
}
