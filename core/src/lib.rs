//! # crudbench-core
//!
//! Phased benchmark orchestration for CRUD workloads against a relational store.
//!
//! A run drives a fixed sequence of phases (reset, seed, read, update, delete,
//! create, final read) through an interchangeable [`ExecutionStrategy`], timing
//! each phase with a [`TimingCollector`] and rendering a comparable [`Report`].
//!
//! Storage-specific strategies live in their own crates; this crate carries the
//! orchestration, the synthetic data generator, and an in-memory strategy used
//! for dry runs and tests.

pub mod batch;
pub mod config;
pub mod error;
pub mod generator;
pub mod instrumentation;
pub mod memory;
pub mod phase;
pub mod phases;
pub mod record;
pub mod runner;
pub mod strategy;

pub use batch::Batches;
pub use config::{Preset, WorkloadConfig, WorkloadConfigBuilder};
pub use error::{BenchError, ConfigError, ConnectionError, RunFailure, StoreError};
pub use generator::{RecordGenerator, RecordKind};
pub use instrumentation::{BatchTiming, Comparison, PhaseResult, Report, TimingCollector};
pub use memory::MemoryStore;
pub use phase::Phase;
pub use record::{Record, RecordId};
pub use runner::Runner;
pub use strategy::ExecutionStrategy;

/// Name of the single entity table every strategy operates on.
pub const USERS_TABLE: &str = "users";

/// DDL for the entity table. The only schema management the harness performs.
pub const USERS_TABLE_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "users"(
    "id" BIGSERIAL PRIMARY KEY,
    "name" TEXT NOT NULL,
    "email" TEXT NOT NULL UNIQUE,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;
