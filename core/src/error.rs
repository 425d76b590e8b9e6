use thiserror::Error;

use crate::instrumentation::Report;
use crate::phase::Phase;

/// Invalid workload configuration. Detected before any phase runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,
    #[error("unknown preset {0:?} (expected small, medium, large or xlarge)")]
    UnknownPreset(String),
}

/// The store could not be reached. Fatal before any phase runs.
#[derive(Error, Debug)]
#[error("failed to connect to {target}: {source}")]
pub struct ConnectionError {
    pub target: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl ConnectionError {
    pub fn new(target: impl Into<String>, err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self { target: target.into(), source: err.into() }
    }
}

/// A store operation failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    Constraint(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("statement needs {required} bind parameters, the store accepts at most {max}")]
    TooManyParameters { required: usize, max: usize },
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl StoreError {
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self { StoreError::Storage(err.into()) }

    pub fn constraint(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self { StoreError::Constraint(err.into()) }
}

/// Everything that can stop a benchmark run.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("{phase} phase failed: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: StoreError,
    },
}

impl BenchError {
    /// The phase the run stopped in, if it got that far.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            BenchError::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// A run that stopped early. Carries the phases completed so far, plus the
/// failed one, so they can still be reported.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct RunFailure {
    pub report: Report,
    #[source]
    pub error: BenchError,
}
