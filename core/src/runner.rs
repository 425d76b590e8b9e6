//! Phase orchestration for a single benchmark run.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::WorkloadConfig;
use crate::error::{BenchError, RunFailure};
use crate::generator::RecordGenerator;
use crate::instrumentation::{Report, TimingCollector};
use crate::phase::Phase;
use crate::phases;
use crate::strategy::ExecutionStrategy;

/// Drives the fixed phase sequence against one strategy.
///
/// The strategy (and with it the store connection) is owned exclusively by the
/// runner for the duration of the run.
pub struct Runner<S> {
    config: WorkloadConfig,
    strategy: S,
    created_at: DateTime<Utc>,
}

impl<S: ExecutionStrategy> Runner<S> {
    pub fn new(config: WorkloadConfig, strategy: S) -> Self { Self { config, strategy, created_at: Utc::now() } }

    /// Pins the `created_at` stamped on every generated record.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn config(&self) -> &WorkloadConfig { &self.config }

    pub fn strategy(&self) -> &S { &self.strategy }

    pub fn into_strategy(self) -> S { self.strategy }

    /// Runs every phase in order. The first store error stops the run; the
    /// phases completed so far, plus the failed one, are returned with it.
    pub async fn run(&self) -> Result<Report, RunFailure> {
        let config = &self.config;
        let seeded = RecordGenerator::seeded(self.created_at);
        let created = RecordGenerator::created(self.created_at);
        let mut collector = TimingCollector::new();

        info!("{}: starting run {:?}", self.strategy.name(), config);

        for phase in Phase::ALL {
            info!("{}: === {} ===", self.strategy.name(), phase);
            collector.mark(phase);

            let outcome = match phase {
                Phase::Reset => phases::reset(&self.strategy).await,
                Phase::Seed => {
                    phases::insert_batches(&self.strategy, &seeded, 0..config.initial_count, config.batch_size, &mut collector).await
                }
                Phase::ReadCount | Phase::FinalReadCount => phases::read_count(&self.strategy).await,
                Phase::Update => phases::update(&self.strategy, config.update_count).await,
                Phase::Delete => phases::delete(&self.strategy, config.delete_count).await,
                Phase::Create => {
                    let range = config.initial_count..config.initial_count.saturating_add(config.new_count);
                    phases::insert_batches(&self.strategy, &created, range, config.batch_size, &mut collector).await
                }
            };

            match outcome {
                Ok(rows) => {
                    let duration = collector.stop(phase, rows);
                    info!("{}: {} affected {} rows in {:?}", self.strategy.name(), phase, rows, duration);
                }
                Err(source) => {
                    let duration = collector.fail(phase, &source);
                    error!("{}: {} failed after {:?}: {}", self.strategy.name(), phase, duration, source);
                    return Err(RunFailure {
                        report: collector.report(self.strategy.name(), *config),
                        error: BenchError::Phase { phase, source },
                    });
                }
            }
        }

        Ok(collector.report(self.strategy.name(), *config))
    }
}
